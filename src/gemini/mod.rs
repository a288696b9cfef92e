pub mod backend;
pub mod tryon_client;

pub use backend::{GenerationBackend, HttpBackend};
pub use tryon_client::{build_request, interpret_response, TryOnClient, TRY_ON_INSTRUCTION};
