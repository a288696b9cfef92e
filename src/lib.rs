//! Virtual clothing try-on on top of Gemini's multimodal image model.
//!
//! ```no_run
//! use rtryon::{upload, GeminiConfig, TryOnClient, TryOnSession};
//!
//! # async fn run() -> rtryon::Result<()> {
//! let client = TryOnClient::new(&GeminiConfig::from_env()?)?;
//! let (person, clothing) = upload::load_pair("me.jpg", "shirt.png").await?;
//!
//! let mut session = TryOnSession::new();
//! session.set_person_image(Some(person));
//! session.set_clothing_image(Some(clothing));
//! session.generate(&client).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod session;
pub mod upload;

pub use config::{Config, GeminiConfig};
pub use error::{ErrorKind, Result, TryOnError};
pub use gemini::{GenerationBackend, HttpBackend, TryOnClient};
pub use models::{EncodedImage, GenerationOutcome, TryOnResult};
pub use session::{ResultView, TryOnSession};
