use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigManager, ResolveOptions, resolve_gateway};
use crate::gateway::{COMPLETIONS_PATH, GatewayConfig, spawn_gateway};
use crate::upstream::GeminiClient;

pub struct ServeOptions {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub port: u16,
    pub qps: Option<f64>,
}

/// Serves the gateway in the foreground until Ctrl-C.
pub async fn run_serve(options: ServeOptions) -> Result<()> {
    let config_file = ConfigManager::new().load_or_default()?;
    let resolved = resolve_gateway(
        &ResolveOptions {
            provider: options.provider,
            model: options.model,
            gateway_qps: options.qps,
            ..ResolveOptions::default()
        },
        &config_file,
    )?;

    let upstream = GeminiClient::new(resolved.api_key, resolved.model.clone())?
        .with_endpoint(resolved.endpoint);
    let config = GatewayConfig {
        port: options.port,
        qps: resolved.qps,
        ..GatewayConfig::default()
    };
    let handle = spawn_gateway(&config, Arc::new(upstream)).await?;

    // Base URL on stdout, diagnostics on stderr.
    println!("{}", handle.base_url());
    info!(
        provider = %resolved.provider_name,
        model = %resolved.model,
        path = COMPLETIONS_PATH,
        "gateway ready, press Ctrl-C to stop"
    );

    tokio::select! {
        result = handle.join() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("shutting down");
        }
    }
    Ok(())
}
