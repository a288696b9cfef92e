//! Try-on session state: the two input slots, the last result or error, and
//! the in-flight flag that keeps a session to one request at a time.

use crate::{
    error::{Result, TryOnError},
    gemini::TryOnClient,
    models::{EncodedImage, GenerationOutcome},
};

pub const MISSING_IMAGES_MESSAGE: &str = "Please upload both images.";

/// What the result panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView<'a> {
    Loading,
    Error(&'a str),
    Image {
        data_url: &'a str,
        text: Option<&'a str>,
    },
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct TryOnSession {
    person_image: Option<EncodedImage>,
    clothing_image: Option<EncodedImage>,
    generated_image: Option<String>,
    generated_text: Option<String>,
    is_loading: bool,
    error: Option<String>,
}

impl TryOnSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person_image(&self) -> Option<&EncodedImage> {
        self.person_image.as_ref()
    }

    pub fn clothing_image(&self) -> Option<&EncodedImage> {
        self.clothing_image.as_ref()
    }

    /// Data URL of the last generated image.
    pub fn generated_image(&self) -> Option<&str> {
        self.generated_image.as_deref()
    }

    pub fn generated_text(&self) -> Option<&str> {
        self.generated_text.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_person_image(&mut self, image: Option<EncodedImage>) {
        self.person_image = image;
        self.clear_output();
    }

    pub fn set_clothing_image(&mut self, image: Option<EncodedImage>) {
        self.clothing_image = image;
        self.clear_output();
    }

    pub fn can_generate(&self) -> bool {
        self.person_image.is_some() && self.clothing_image.is_some() && !self.is_loading
    }

    /// Enters the loading state and returns the images to send.
    pub fn begin_generation(&mut self) -> Result<(EncodedImage, EncodedImage)> {
        if self.is_loading {
            return Err(TryOnError::Busy);
        }

        let (person, clothing) = match (&self.person_image, &self.clothing_image) {
            (Some(person), Some(clothing)) => (person.clone(), clothing.clone()),
            _ => {
                self.error = Some(MISSING_IMAGES_MESSAGE.to_string());
                return Err(TryOnError::Validation(MISSING_IMAGES_MESSAGE.to_string()));
            }
        };

        self.clear_output();
        self.is_loading = true;
        Ok((person, clothing))
    }

    pub fn complete_generation(&mut self, outcome: GenerationOutcome) {
        self.is_loading = false;
        match outcome {
            GenerationOutcome::Success(result) => {
                self.generated_image = Some(result.encoded_image().to_data_url());
                self.generated_text = result.text;
                self.error = None;
            }
            GenerationOutcome::Failure { message, .. } => {
                self.generated_image = None;
                self.generated_text = None;
                self.error = Some(message);
            }
        }
    }

    /// Runs one try-on. Validation failures are recorded on the session
    /// without contacting the service.
    pub async fn generate(&mut self, client: &TryOnClient) -> Result<()> {
        let (person, clothing) = self.begin_generation()?;
        let outcome = client.run(&person, &clothing).await;
        self.complete_generation(outcome);
        Ok(())
    }

    pub fn view(&self) -> ResultView<'_> {
        if self.is_loading {
            return ResultView::Loading;
        }
        if let Some(error) = &self.error {
            return ResultView::Error(error);
        }
        if let Some(data_url) = &self.generated_image {
            return ResultView::Image {
                data_url,
                text: self.generated_text.as_deref(),
            };
        }
        ResultView::Idle
    }

    fn clear_output(&mut self) {
        self.generated_image = None;
        self.generated_text = None;
        self.error = None;
    }
}
