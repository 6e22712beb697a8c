//! Local OpenAI-compatible front for a generative-content upstream.
//!
//! The gateway listens on loopback only. It applies its own rate limit
//! before every upstream call and never retries: a 429 goes back to the
//! caller, whose engine owns the backoff.

mod error;
mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::ratelimit::{DEFAULT_QPS, RateLimiter};
use crate::upstream::GenerativeUpstream;

pub use error::GatewayError;
pub use server::{COMPLETIONS_PATH, GatewayState, build_router};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    /// `0` asks the OS for a free port.
    pub port: u16,
    pub qps: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            qps: DEFAULT_QPS,
        }
    }
}

/// A running gateway.
///
/// Lives as long as the runtime. Dropping the handle detaches the server
/// task; there is no graceful shutdown.
#[derive(Debug)]
pub struct GatewayHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl GatewayHandle {
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Root URL to hand to an OpenAI-compatible client.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Waits for the server task, which only ends on a serve error.
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| Error::upstream(format!("gateway task failed: {e}")))
    }
}

/// Binds the listener and starts serving on a background task.
///
/// The socket is listening when this returns, so the base URL can be used
/// immediately.
pub async fn spawn_gateway(
    config: &GatewayConfig,
    upstream: Arc<dyn GenerativeUpstream>,
) -> Result<GatewayHandle> {
    let limiter = Arc::new(RateLimiter::new(config.qps)?);
    let router = build_router(Arc::new(GatewayState { upstream, limiter }));

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| Error::config(format!("failed to bind {}:{}: {e}", config.host, config.port)))?;
    let addr = listener
        .local_addr()
        .map_err(|e| Error::config(format!("failed to read bound address: {e}")))?;

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "gateway server stopped");
        }
    });

    info!(base_url = %format!("http://{addr}"), qps = config.qps, "gateway listening");
    Ok(GatewayHandle { addr, task })
}
