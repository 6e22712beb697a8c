use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use super::engine::{LanguagePair, RateLimitParams, TranslationBackend};
use super::request::TranslationRequest;
use crate::cache::{CacheKey, CacheParams, TranslationCache};
use crate::error::{Error, Result};
use crate::ratelimit::RateLimiter;

/// Call statistics of one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    pub calls: u64,
    pub cache_hits: u64,
}

#[derive(Debug, Clone, Copy)]
enum EntryPoint {
    Translate,
    Generative,
}

/// Cache lookup, rate-limit wait, backend call and cache store, in that order.
///
/// The rate limiter is the process-wide one for the remote provider; the
/// same `Arc` should be handed to every pipeline that talks to it.
pub struct TranslationPipeline {
    backend: Arc<dyn TranslationBackend>,
    cache: Arc<dyn TranslationCache>,
    limiter: Arc<RateLimiter>,
    languages: LanguagePair,
    params: CacheParams,
    ignore_cache: bool,
    calls: AtomicU64,
    cache_hits: AtomicU64,
}

impl TranslationPipeline {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        cache: Arc<dyn TranslationCache>,
        limiter: Arc<RateLimiter>,
        lang_in: &str,
        lang_out: &str,
    ) -> Self {
        let languages = LanguagePair::new(
            backend.map_language(lang_in).into_owned(),
            backend.map_language(lang_out).into_owned(),
        );

        let mut params = backend.cache_impact_parameters(&languages);
        params.insert("lang_in".into(), json!(languages.lang_in));
        params.insert("lang_out".into(), json!(languages.lang_out));

        Self {
            backend,
            cache,
            limiter,
            languages,
            params,
            ignore_cache: false,
            calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Disables cache reads and writes for every call on this pipeline.
    #[must_use]
    pub fn with_ignore_cache(mut self, ignore_cache: bool) -> Self {
        self.ignore_cache = ignore_cache;
        self
    }

    /// Registers an extra value that changes translation output.
    pub fn add_cache_impact_parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(key.into(), value.into());
    }

    pub const fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    pub fn backend(&self) -> &dyn TranslationBackend {
        self.backend.as_ref()
    }

    /// Plain translation of `text`.
    pub async fn translate(
        &self,
        text: &str,
        bypass_cache: bool,
        rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        self.run(EntryPoint::Translate, text, bypass_cache, rate_limit_params)
            .await
    }

    /// Instruction-following translation: `text` is handed to the model as is.
    pub async fn generative_translate(
        &self,
        text: &str,
        bypass_cache: bool,
        rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        self.run(EntryPoint::Generative, text, bypass_cache, rate_limit_params)
            .await
    }

    async fn run(
        &self,
        entry: EntryPoint,
        text: &str,
        bypass_cache: bool,
        rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let request = TranslationRequest {
            text,
            languages: &self.languages,
            engine: self.backend.name(),
            params: &self.params,
            bypass_cache: bypass_cache || self.ignore_cache,
            rate_limit_params,
        };
        let key = (!request.bypass_cache).then(|| request.cache_key());

        if let Some(key) = &key {
            match self.cache_get(key).await {
                Ok(Some(cached)) => {
                    self.cache_hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => debug!(cache_key = %key, error = %e, "cache lookup failed, treating as miss"),
            }
        }

        self.limiter.wait().await;

        let translation = match entry {
            EntryPoint::Translate => {
                self.backend
                    .do_translate(request.text, request.languages, request.rate_limit_params)
                    .await?
            }
            EntryPoint::Generative => {
                self.backend
                    .do_generative_translate(
                        request.text,
                        request.languages,
                        request.rate_limit_params,
                    )
                    .await?
            }
        };

        if let Some(key) = &key
            && let Err(e) = self.cache_set(key, &translation).await
        {
            warn!(cache_key = %key, error = %e, "failed to store translation in cache");
        }

        Ok(translation)
    }

    /// Cache stores may block on disk, so they run on the blocking pool.
    async fn cache_get(&self, key: &CacheKey) -> Result<Option<String>> {
        let cache = Arc::clone(&self.cache);
        let key = key.clone();
        tokio::task::spawn_blocking(move || cache.get(&key))
            .await
            .map_err(|e| Error::cache(format!("cache lookup task failed: {e}")))?
    }

    async fn cache_set(&self, key: &CacheKey, translated: &str) -> Result<()> {
        let cache = Arc::clone(&self.cache);
        let key = key.clone();
        let translated = translated.to_string();
        tokio::task::spawn_blocking(move || cache.set(&key, &translated))
            .await
            .map_err(|e| Error::cache(format!("cache store task failed: {e}")))?
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            calls: self.calls.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }

    /// Logs the call counters; call once when the pipeline is done.
    pub fn report(&self) -> PipelineStats {
        let stats = self.stats();
        info!(
            engine = self.backend.name(),
            calls = stats.calls,
            cache_hits = stats.cache_hits,
            "translation pipeline finished"
        );
        stats
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Upper-cases text and counts backend calls.
    struct CountingBackend {
        model: String,
        translate_calls: AtomicUsize,
        generative_calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new(model: &str) -> Arc<Self> {
            Arc::new(Self {
                model: model.to_string(),
                translate_calls: AtomicUsize::new(0),
                generative_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn map_language<'a>(&self, code: &'a str) -> std::borrow::Cow<'a, str> {
            code.to_lowercase().into()
        }

        fn cache_impact_parameters(&self, _languages: &LanguagePair) -> CacheParams {
            let mut params = CacheParams::new();
            params.insert("model".into(), json!(self.model));
            params
        }

        async fn do_translate(
            &self,
            text: &str,
            _languages: &LanguagePair,
            _rate_limit_params: Option<&RateLimitParams>,
        ) -> Result<String> {
            self.translate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.to_uppercase())
        }

        async fn do_generative_translate(
            &self,
            text: &str,
            _languages: &LanguagePair,
            _rate_limit_params: Option<&RateLimitParams>,
        ) -> Result<String> {
            self.generative_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("generated: {text}"))
        }
    }

    /// Only supports plain translation.
    struct PhraseOnlyBackend;

    #[async_trait]
    impl TranslationBackend for PhraseOnlyBackend {
        fn name(&self) -> &str {
            "phrase"
        }

        async fn do_translate(
            &self,
            text: &str,
            _languages: &LanguagePair,
            _rate_limit_params: Option<&RateLimitParams>,
        ) -> Result<String> {
            Ok(text.to_string())
        }
    }

    /// Cache whose every operation fails.
    struct BrokenCache;

    impl TranslationCache for BrokenCache {
        fn get(&self, _key: &CacheKey) -> Result<Option<String>> {
            Err(Error::cache("disk on fire"))
        }

        fn set(&self, _key: &CacheKey, _translated: &str) -> Result<()> {
            Err(Error::cache("disk on fire"))
        }
    }

    /// Cache that records whether it was touched.
    #[derive(Default)]
    struct SpyCache {
        inner: MemoryCache,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl TranslationCache for SpyCache {
        fn get(&self, key: &CacheKey) -> Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn set(&self, key: &CacheKey, translated: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, translated)
        }
    }

    /// Cache whose lookups hold the calling thread, like a locked database.
    #[derive(Default)]
    struct SlowCache {
        inner: MemoryCache,
    }

    impl TranslationCache for SlowCache {
        fn get(&self, key: &CacheKey) -> Result<Option<String>> {
            std::thread::sleep(std::time::Duration::from_millis(300));
            self.inner.get(key)
        }

        fn set(&self, key: &CacheKey, translated: &str) -> Result<()> {
            self.inner.set(key, translated)
        }
    }

    fn limiter() -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new(1000.0).unwrap())
    }

    fn pipeline(
        backend: Arc<dyn TranslationBackend>,
        cache: Arc<dyn TranslationCache>,
    ) -> TranslationPipeline {
        TranslationPipeline::new(backend, cache, limiter(), "en", "fr")
    }

    #[tokio::test]
    async fn test_second_identical_call_hits_cache() {
        let backend = CountingBackend::new("m1");
        let pipeline = pipeline(backend.clone(), Arc::new(MemoryCache::new()));

        let first = pipeline.translate("hello", false, None).await.unwrap();
        let second = pipeline.translate("hello", false, None).await.unwrap();

        assert_eq!(first, "HELLO");
        assert_eq!(second, first);
        assert_eq!(backend.translate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            pipeline.stats(),
            PipelineStats {
                calls: 2,
                cache_hits: 1
            }
        );
    }

    #[tokio::test]
    async fn test_bypass_never_touches_cache() {
        let backend = CountingBackend::new("m1");
        let cache = Arc::new(SpyCache::default());
        let pipeline = pipeline(backend.clone(), cache.clone());

        pipeline.translate("hello", true, None).await.unwrap();
        pipeline.translate("hello", true, None).await.unwrap();

        assert_eq!(cache.reads.load(Ordering::SeqCst), 0);
        assert_eq!(cache.writes.load(Ordering::SeqCst), 0);
        assert_eq!(backend.translate_calls.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.stats().calls, 2);
    }

    #[tokio::test]
    async fn test_instance_ignore_cache_bypasses_cache() {
        let backend = CountingBackend::new("m1");
        let cache = Arc::new(SpyCache::default());
        let pipeline = pipeline(backend.clone(), cache.clone()).with_ignore_cache(true);

        pipeline.translate("hello", false, None).await.unwrap();

        assert_eq!(cache.reads.load(Ordering::SeqCst), 0);
        assert_eq!(cache.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_changed_model_misses_shared_cache() {
        let cache: Arc<dyn TranslationCache> = Arc::new(MemoryCache::new());
        let first_backend = CountingBackend::new("m1");
        let second_backend = CountingBackend::new("m2");

        pipeline(first_backend.clone(), cache.clone())
            .translate("hello", false, None)
            .await
            .unwrap();
        pipeline(second_backend.clone(), cache.clone())
            .translate("hello", false, None)
            .await
            .unwrap();

        assert_eq!(first_backend.translate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_backend.translate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extra_cache_impact_parameter_changes_key() {
        let cache: Arc<dyn TranslationCache> = Arc::new(MemoryCache::new());
        let backend = CountingBackend::new("m1");

        pipeline(backend.clone(), cache.clone())
            .translate("hello", false, None)
            .await
            .unwrap();

        let mut tuned = pipeline(backend.clone(), cache.clone());
        tuned.add_cache_impact_parameter("glossary", "v2");
        tuned.translate("hello", false, None).await.unwrap();

        assert_eq!(backend.translate_calls.load(Ordering::SeqCst), 2);
        assert_eq!(tuned.stats().cache_hits, 0);
    }

    #[tokio::test]
    async fn test_broken_cache_degrades_to_miss() {
        let backend = CountingBackend::new("m1");
        let pipeline = pipeline(backend.clone(), Arc::new(BrokenCache));

        let result = pipeline.translate("hello", false, None).await.unwrap();

        assert_eq!(result, "HELLO");
        assert_eq!(pipeline.stats().cache_hits, 0);
    }

    #[tokio::test]
    async fn test_generative_dispatches_to_generative_entry_point() {
        let backend = CountingBackend::new("m1");
        let pipeline = pipeline(backend.clone(), Arc::new(MemoryCache::new()));

        let out = pipeline
            .generative_translate("Translate: hi", false, None)
            .await
            .unwrap();

        assert_eq!(out, "generated: Translate: hi");
        assert_eq!(backend.generative_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.translate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_entry_point_surfaces_error() {
        let pipeline = pipeline(Arc::new(PhraseOnlyBackend), Arc::new(MemoryCache::new()));

        let err = pipeline
            .generative_translate("hello", false, None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unsupported { .. }));
        assert_eq!(pipeline.translate("hello", false, None).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_languages_are_mapped_by_backend() {
        let pipeline = TranslationPipeline::new(
            CountingBackend::new("m1"),
            Arc::new(MemoryCache::new()),
            limiter(),
            "EN",
            "FR",
        );
        assert_eq!(pipeline.languages(), &LanguagePair::new("en", "fr"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hits_skip_rate_limiter() {
        let backend = CountingBackend::new("m1");
        let slow = Arc::new(RateLimiter::new(0.1).unwrap());
        let pipeline = TranslationPipeline::new(
            backend,
            Arc::new(MemoryCache::new()),
            slow,
            "en",
            "fr",
        );

        pipeline.translate("hello", false, None).await.unwrap();
        let start = tokio::time::Instant::now();
        for _ in 0..5 {
            pipeline.translate("hello", false, None).await.unwrap();
        }
        assert_eq!(start.elapsed(), std::time::Duration::ZERO);
        assert_eq!(pipeline.report().cache_hits, 5);
    }

    #[tokio::test]
    async fn test_slow_cache_does_not_stall_the_runtime() {
        let backend = CountingBackend::new("m1");
        let pipeline = pipeline(backend, Arc::new(SlowCache::default()));

        let (translated_at, ticked_at) = tokio::join!(
            async {
                pipeline.translate("hello", false, None).await.unwrap();
                std::time::Instant::now()
            },
            async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                std::time::Instant::now()
            }
        );

        assert!(ticked_at < translated_at);
    }
}
