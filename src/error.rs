use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("API_KEY environment variable not set")]
    MissingCredential,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Validation(String),

    #[error("A try-on is already in progress")]
    Busy,

    #[error("The request was blocked for safety reasons. Please try different images.")]
    SafetyBlocked,

    #[error("Image generation stopped unexpectedly. Reason: {0}")]
    AbnormalCompletion(String),

    #[error("The service returned no candidates. Please try again.")]
    EmptyResponse,

    #[error("API did not return an image. The model may have been unable to process the request.")]
    NoImage,

    #[error("Failed to reach the generation service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported image type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`TryOnError`], kept alongside the message in a
/// failed [`GenerationOutcome`](crate::models::GenerationOutcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    Config,
    Validation,
    Busy,
    SafetyBlocked,
    AbnormalCompletion,
    EmptyResponse,
    NoImage,
    Transport,
    Service,
    Serialization,
    UnsupportedMediaType,
    InvalidImage,
    Io,
}

impl TryOnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TryOnError::MissingCredential => ErrorKind::MissingCredential,
            TryOnError::ConfigError(_) => ErrorKind::Config,
            TryOnError::Validation(_) => ErrorKind::Validation,
            TryOnError::Busy => ErrorKind::Busy,
            TryOnError::SafetyBlocked => ErrorKind::SafetyBlocked,
            TryOnError::AbnormalCompletion(_) => ErrorKind::AbnormalCompletion,
            TryOnError::EmptyResponse => ErrorKind::EmptyResponse,
            TryOnError::NoImage => ErrorKind::NoImage,
            TryOnError::Transport(_) => ErrorKind::Transport,
            TryOnError::Service { .. } => ErrorKind::Service,
            TryOnError::SerializationError(_) => ErrorKind::Serialization,
            TryOnError::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            TryOnError::InvalidImage(_) => ErrorKind::InvalidImage,
            TryOnError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
