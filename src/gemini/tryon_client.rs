use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    gemini::backend::{GenerationBackend, HttpBackend},
    logger,
    models::{
        Content, EncodedImage, FinishReason, GenerateContentRequest, GenerateContentResponse,
        GenerationConfig, GenerationOutcome, Modality, Part, TryOnResult,
    },
};
use std::sync::Arc;

pub const TRY_ON_INSTRUCTION: &str = "Take the clothing from the second image and realistically place it on the person from the first image. The final image should be a high-quality, photorealistic depiction of the person wearing the garment. Only return the final edited image, do not return the original person image.";

#[derive(Clone)]
pub struct TryOnClient {
    backend: Arc<dyn GenerationBackend>,
    model: String,
}

impl TryOnClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::with_backend(Arc::new(backend), config.model.clone()))
    }

    pub fn with_backend(backend: Arc<dyn GenerationBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Dresses the person in `person` with the garment in `clothing`.
    ///
    /// Issues exactly one request. Failures are logged here and returned
    /// unchanged.
    pub async fn generate(
        &self,
        person: &EncodedImage,
        clothing: &EncodedImage,
    ) -> Result<TryOnResult> {
        let request = build_request(person, clothing);
        log::info!("👗 Requesting try-on from model: {}", self.model);

        let _timer = logger::timer("try-on generation");
        let result = self
            .backend
            .generate_content(&request)
            .await
            .and_then(interpret_response);

        match &result {
            Ok(result) => log::info!(
                "✅ Try-on image received ({} base64 chars, text: {})",
                result.image.len(),
                if result.text.is_some() { "yes" } else { "no" }
            ),
            Err(e) => log::error!("Error generating image with Gemini API: {}", e),
        }

        result
    }

    pub async fn run(&self, person: &EncodedImage, clothing: &EncodedImage) -> GenerationOutcome {
        self.generate(person, clothing).await.into()
    }
}

pub fn build_request(person: &EncodedImage, clothing: &EncodedImage) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: vec![
                Part::image(person),
                Part::image(clothing),
                Part::text(TRY_ON_INSTRUCTION),
            ],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec![Modality::Image, Modality::Text],
        },
    }
}

/// Reads the first candidate. Later image or text parts replace earlier ones.
pub fn interpret_response(response: GenerateContentResponse) -> Result<TryOnResult> {
    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let block_reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason);
            return Err(match block_reason.as_deref() {
                Some("SAFETY") => TryOnError::SafetyBlocked,
                Some(reason) => TryOnError::AbnormalCompletion(reason.to_string()),
                None => TryOnError::EmptyResponse,
            });
        }
    };

    match candidate.finish_reason {
        None | Some(FinishReason::Stop) => {}
        Some(FinishReason::Safety) => return Err(TryOnError::SafetyBlocked),
        Some(FinishReason::Other(reason)) => return Err(TryOnError::AbnormalCompletion(reason)),
    }

    let mut image = None;
    let mut text = None;
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(inline) = part.inline_data {
            image = Some(inline.data);
        } else if let Some(part_text) = part.text.filter(|t| !t.is_empty()) {
            text = Some(part_text);
        }
    }

    let image = image
        .filter(|data: &String| !data.is_empty())
        .ok_or(TryOnError::NoImage)?;
    Ok(TryOnResult { image, text })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Replays a canned response and records every request it sees.
    pub(crate) struct ScriptedBackend {
        response: Mutex<Option<Result<Value>>>,
        pub(crate) requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl ScriptedBackend {
        pub(crate) fn replying(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Ok(payload))),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(err: TryOnError) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Err(err))),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate_content(
            &self,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let scripted = self
                .response
                .lock()
                .unwrap()
                .take()
                .expect("backend called more than once");
            Ok(serde_json::from_value(scripted?)?)
        }
    }

    pub(crate) fn client_for(backend: Arc<ScriptedBackend>) -> TryOnClient {
        TryOnClient::with_backend(backend, "test-model")
    }

    pub(crate) fn person() -> EncodedImage {
        EncodedImage::new("UEVSU09O", "image/jpeg")
    }

    pub(crate) fn clothing() -> EncodedImage {
        EncodedImage::new("U0hJUlQ=", "image/webp")
    }

    pub(crate) fn image_reply(data: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": data}}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_single_image_part_succeeds() {
        let backend = ScriptedBackend::replying(image_reply("UkVTVUxU"));
        let client = client_for(backend.clone());

        let result = client.generate(&person(), &clothing()).await.unwrap();
        assert_eq!(result.image, "UkVTVUxU");
        assert_eq!(result.text, None);
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_request_layout() {
        let backend = ScriptedBackend::replying(image_reply("UkVTVUxU"));
        let client = client_for(backend.clone());
        client.generate(&person(), &clothing()).await.unwrap();

        let requests = backend.requests.lock().unwrap();
        let body = serde_json::to_value(&requests[0]).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "UEVSU09O"}},
                        {"inlineData": {"mimeType": "image/webp", "data": "U0hJUlQ="}},
                        {"text": TRY_ON_INSTRUCTION}
                    ]
                }],
                "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
            })
        );
    }

    #[tokio::test]
    async fn test_safety_finish_reason() {
        let backend = ScriptedBackend::replying(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }));
        let outcome = client_for(backend).run(&person(), &clothing()).await;

        match outcome {
            GenerationOutcome::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::SafetyBlocked);
                assert!(message.contains("blocked for safety"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_finish_reason_reports_reason() {
        let backend = ScriptedBackend::replying(json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AAAA"}}]},
                "finishReason": "MAX_TOKENS"
            }]
        }));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();

        assert!(matches!(err, TryOnError::AbnormalCompletion(ref r) if r == "MAX_TOKENS"));
        assert_eq!(
            err.to_string(),
            "Image generation stopped unexpectedly. Reason: MAX_TOKENS"
        );
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let backend = ScriptedBackend::replying(json!({"candidates": []}));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::EmptyResponse));

        let backend = ScriptedBackend::replying(json!({}));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_blocked_prompt_without_candidates() {
        let backend =
            ScriptedBackend::replying(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::SafetyBlocked));

        let backend =
            ScriptedBackend::replying(json!({"promptFeedback": {"blockReason": "OTHER"}}));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::AbnormalCompletion(ref r) if r == "OTHER"));
    }

    #[tokio::test]
    async fn test_text_without_image_fails() {
        let backend = ScriptedBackend::replying(json!({
            "candidates": [{
                "content": {"parts": [{"text": "I cannot edit this photo."}]},
                "finishReason": "STOP"
            }]
        }));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();

        assert!(matches!(err, TryOnError::NoImage));
        assert!(err.to_string().starts_with("API did not return an image"));
    }

    #[tokio::test]
    async fn test_empty_inline_data_is_not_an_image() {
        let backend = ScriptedBackend::replying(image_reply(""));
        let outcome = client_for(backend).run(&person(), &clothing()).await;

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            GenerationOutcome::Failure { kind: ErrorKind::NoImage, .. }
        ));
    }

    #[tokio::test]
    async fn test_last_image_and_text_win() {
        let backend = ScriptedBackend::replying(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "first"},
                    {"inlineData": {"mimeType": "image/png", "data": "Rk9P"}},
                    {"text": ""},
                    {"inlineData": {"mimeType": "image/png", "data": "QkFS"}},
                    {"text": "second"}
                ]}
            }]
        }));
        let result = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap();

        assert_eq!(result.image, "QkFS");
        assert_eq!(result.text.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_only_first_candidate_is_read() {
        let backend = ScriptedBackend::replying(json!({
            "candidates": [
                {"content": {"parts": [{"text": "nothing here"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "QkFS"}}]}}
            ]
        }));
        let err = client_for(backend)
            .generate(&person(), &clothing())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NoImage));
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_outcome() {
        let backend = ScriptedBackend::failing(TryOnError::Service {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        });
        let outcome = client_for(backend).run(&person(), &clothing()).await;

        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            GenerationOutcome::Failure {
                kind: ErrorKind::Service,
                message: "Generation service error (429): Resource has been exhausted".to_string(),
            }
        );
    }

    #[test]
    fn test_new_requires_credential() {
        assert!(matches!(
            TryOnClient::new(&GeminiConfig::new()),
            Err(TryOnError::MissingCredential)
        ));
        let client = TryOnClient::new(&GeminiConfig::new().with_api_key("k")).unwrap();
        assert_eq!(client.model(), crate::config::DEFAULT_MODEL);
    }
}
