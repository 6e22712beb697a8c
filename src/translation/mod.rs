mod engine;
pub mod language;
mod openai;
mod pipeline;
pub mod placeholder;
pub mod prompt;
mod request;
mod retry;
mod tokens;

pub use engine::{LanguagePair, RateLimitParams, TranslationBackend};
pub use language::{SUPPORTED_LANGUAGES, validate_language, validate_source_language};
pub use openai::OpenAiEngine;
pub use pipeline::{PipelineStats, TranslationPipeline};
pub use placeholder::Marker;
pub use request::TranslationRequest;
pub use retry::{RetryPolicy, with_backoff};
pub use tokens::{TokenCounter, Usage};
