//! Generative-content providers the gateway can front.

mod gemini;

use async_trait::async_trait;

use crate::error::Result;

pub use gemini::{DEFAULT_GEMINI_ENDPOINT, GeminiClient};

/// A model that turns one prompt into one block of text.
///
/// Implementations classify their failures as
/// [`Error::PermissionDenied`](crate::Error::PermissionDenied),
/// [`Error::QuotaExceeded`](crate::Error::QuotaExceeded) or
/// [`Error::Upstream`](crate::Error::Upstream) so the gateway can map them
/// onto OpenAI-style status codes.
#[async_trait]
pub trait GenerativeUpstream: Send + Sync {
    fn model(&self) -> &str;

    async fn generate_content(&self, prompt: &str) -> Result<String>;
}
