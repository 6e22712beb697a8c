use anyhow::{Context, Result, bail};
use futures_util::{StreamExt, stream};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{MemoryCache, SqliteCache, TranslationCache};
use crate::config::{ConfigManager, ProviderKind, ResolveOptions, ResolvedConfig, resolve_config};
use crate::gateway::{GatewayConfig, GatewayHandle, spawn_gateway};
use crate::input::{read_input, split_fragments};
use crate::ratelimit::RateLimiter;
use crate::translation::{OpenAiEngine, TranslationPipeline};
use crate::ui::FragmentProgress;
use crate::upstream::GeminiClient;

pub struct TranslateOptions {
    pub file: Option<PathBuf>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub no_cache: bool,
    pub generative: bool,
    pub jobs: usize,
    pub quiet: bool,
}

/// An engine ready to use, plus the gateway it talks to when the provider
/// needs one. Keep the gateway handle alive as long as the engine.
pub struct ConnectedEngine {
    pub engine: OpenAiEngine,
    pub gateway: Option<GatewayHandle>,
}

/// Builds the engine for `config`, starting an in-process gateway for
/// gemini providers.
pub async fn connect_engine(config: &ResolvedConfig) -> Result<ConnectedEngine> {
    let (endpoint, api_key, gateway) = match config.kind {
        ProviderKind::OpenAi => (config.endpoint.clone(), config.api_key.clone(), None),
        ProviderKind::Gemini => {
            let api_key = config.api_key.clone().unwrap_or_default();
            let upstream = GeminiClient::new(api_key, config.model.clone())?
                .with_endpoint(config.endpoint.clone());
            let gateway_config = GatewayConfig {
                qps: config.gateway_qps,
                ..GatewayConfig::default()
            };
            let handle = spawn_gateway(&gateway_config, Arc::new(upstream))
                .await
                .context("Failed to start the local gateway")?;
            (handle.base_url(), None, Some(handle))
        }
    };

    let engine = OpenAiEngine::new(endpoint, api_key, config.model.clone())?
        .with_temperature(config.temperature);
    Ok(ConnectedEngine { engine, gateway })
}

fn open_cache() -> Arc<dyn TranslationCache> {
    match SqliteCache::open_default() {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "persistent cache unavailable, using an in-memory cache");
            Arc::new(MemoryCache::new())
        }
    }
}

pub async fn run_translate(options: TranslateOptions) -> Result<()> {
    let config_file = ConfigManager::new().load_or_default()?;
    let resolved = resolve_config(
        &ResolveOptions {
            from: options.from.clone(),
            to: options.to.clone(),
            provider: options.provider.clone(),
            model: options.model.clone(),
            ..ResolveOptions::default()
        },
        &config_file,
    )?;

    let source_text = read_input(options.file.as_deref())?;
    let fragments = split_fragments(&source_text);
    if fragments.is_empty() {
        bail!("Input is empty");
    }

    let ConnectedEngine { engine, gateway } = connect_engine(&resolved).await?;
    let engine = Arc::new(engine);
    let limiter = Arc::new(RateLimiter::new(resolved.qps)?);
    let pipeline = TranslationPipeline::new(
        engine.clone(),
        open_cache(),
        limiter,
        &resolved.source_language,
        &resolved.target_language,
    )
    .with_ignore_cache(options.no_cache);

    info!(
        provider = %resolved.provider_name,
        model = %resolved.model,
        fragments = fragments.len(),
        via_gateway = gateway.is_some(),
        "translating"
    );

    let progress = FragmentProgress::new(fragments.len(), options.quiet);
    let translated: Vec<Result<String>> = stream::iter(&fragments)
        .map(|fragment| {
            let pipeline = &pipeline;
            let progress = &progress;
            async move {
                let result = if options.generative {
                    pipeline.generative_translate(fragment.text, false, None).await
                } else {
                    pipeline.translate(fragment.text, false, None).await
                };
                progress.inc();
                result.with_context(|| format!("Failed to translate fragment {}", fragment.index + 1))
            }
        })
        .buffered(options.jobs)
        .collect()
        .await;
    drop(progress);

    let stats = pipeline.report();
    let usage = engine.token_usage();
    info!(
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        cache_hits = stats.cache_hits,
        "token usage"
    );

    let translated = translated.into_iter().collect::<Result<Vec<_>>>()?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", translated.join("\n\n"))?;
    stdout.flush()?;

    Ok(())
}
