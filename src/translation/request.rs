use super::engine::{LanguagePair, RateLimitParams};
use crate::cache::{CacheKey, CacheParams};

/// One translation call as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub languages: &'a LanguagePair,
    pub engine: &'a str,
    /// Cache-impact parameters, including the language pair.
    pub params: &'a CacheParams,
    pub bypass_cache: bool,
    pub rate_limit_params: Option<&'a RateLimitParams>,
}

impl TranslationRequest<'_> {
    /// Compute cache key for this request
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::derive(self.engine, self.params, self.text)
    }
}
