use async_trait::async_trait;
use serde_json::{Map, Value};
use std::borrow::Cow;

use super::placeholder::{self, Marker};
use crate::cache::CacheParams;
use crate::error::{Error, Result};

/// Per-call throttling hints. Carried through to backends untouched.
pub type RateLimitParams = Map<String, Value>;

/// Source and target language of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub lang_in: String,
    pub lang_out: String,
}

impl LanguagePair {
    pub fn new(lang_in: impl Into<String>, lang_out: impl Into<String>) -> Self {
        Self {
            lang_in: lang_in.into(),
            lang_out: lang_out.into(),
        }
    }
}

/// A concrete translation backend.
///
/// Backends implement one or both entry points: `do_translate` for plain
/// phrase translation, `do_generative_translate` for models that follow a
/// natural-language instruction. The defaults report the call as unsupported.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Short engine identifier; part of every cache key.
    fn name(&self) -> &str;

    /// Maps a user-facing language code to the backend's spelling.
    fn map_language<'a>(&self, code: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(code)
    }

    /// Every configuration value that changes this backend's output.
    fn cache_impact_parameters(&self, _languages: &LanguagePair) -> CacheParams {
        CacheParams::new()
    }

    async fn do_translate(
        &self,
        _text: &str,
        _languages: &LanguagePair,
        _rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        Err(Error::Unsupported {
            engine: self.name().to_string(),
            operation: "translation",
        })
    }

    async fn do_generative_translate(
        &self,
        _text: &str,
        _languages: &LanguagePair,
        _rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        Err(Error::Unsupported {
            engine: self.name().to_string(),
            operation: "generative translation",
        })
    }

    fn left_marker(&self, id: u32) -> Marker {
        placeholder::left_marker(id)
    }

    fn right_marker(&self, id: u32) -> Marker {
        placeholder::right_marker(id)
    }

    fn formula_marker(&self, id: u32) -> Marker {
        placeholder::formula_marker(id)
    }
}
