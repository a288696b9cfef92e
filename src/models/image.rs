use crate::error::{ErrorKind, Result, TryOnError};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

pub const RESULT_MEDIA_TYPE: &str = "image/png";

/// An image as base64 text plus its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub data: String, // Base64 encoded
    pub media_type: String,
}

impl EncodedImage {
    pub fn new(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), media_type)
    }

    /// Parses a `data:<media type>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| TryOnError::InvalidImage("not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| TryOnError::InvalidImage("data URL has no payload".into()))?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| TryOnError::InvalidImage("data URL is not base64 encoded".into()))?;

        if media_type.is_empty() {
            return Err(TryOnError::InvalidImage("data URL has no media type".into()));
        }

        Ok(Self::new(payload, media_type))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| TryOnError::InvalidImage(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryOnResult {
    pub image: String, // Base64 encoded PNG
    pub text: Option<String>,
}

impl TryOnResult {
    pub fn encoded_image(&self) -> EncodedImage {
        EncodedImage::new(self.image.clone(), RESULT_MEDIA_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    Success(TryOnResult),
    Failure { kind: ErrorKind, message: String },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }
}

impl From<TryOnError> for GenerationOutcome {
    fn from(err: TryOnError) -> Self {
        GenerationOutcome::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<Result<TryOnResult>> for GenerationOutcome {
    fn from(result: Result<TryOnResult>) -> Self {
        match result {
            Ok(result) => GenerationOutcome::Success(result),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_parsing() {
        let image = EncodedImage::from_data_url("data:image/webp;base64,UklGRg==").unwrap();
        assert_eq!(image.media_type, "image/webp");
        assert_eq!(image.data, "UklGRg==");
        assert_eq!(image.to_data_url(), "data:image/webp;base64,UklGRg==");
    }

    #[test]
    fn test_bad_data_urls_rejected() {
        for url in [
            "image/png;base64,AAAA",
            "data:image/png;base64",
            "data:image/png,AAAA",
            "data:;base64,AAAA",
        ] {
            assert!(
                matches!(EncodedImage::from_data_url(url), Err(TryOnError::InvalidImage(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_reports_invalid_base64() {
        let image = EncodedImage::new("not base64!!", "image/png");
        assert!(matches!(image.decode(), Err(TryOnError::InvalidImage(_))));

        let image = EncodedImage::from_bytes(b"\x89PNG", "image/png");
        assert_eq!(image.decode().unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_outcome_from_error_keeps_message() {
        let outcome: GenerationOutcome = TryOnError::SafetyBlocked.into();
        match outcome {
            GenerationOutcome::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::SafetyBlocked);
                assert!(message.contains("blocked for safety"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
