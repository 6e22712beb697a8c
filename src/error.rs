//! Error taxonomy shared by the pipeline, engines and gateway.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the translation core can surface.
///
/// Only [`Error::QuotaExceeded`] is retried (see [`Error::is_retryable`]);
/// cache failures never reach the pipeline's caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cache unavailable: {0}")]
    Cache(String),

    #[error("Permission denied by upstream: {0}")]
    PermissionDenied(String),

    #[error("Upstream quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("{operation} is not supported by the '{engine}' engine")]
    Unsupported {
        engine: String,
        operation: &'static str,
    },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Whether the failure is transient provider overload.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Maps a transport-level `reqwest` failure.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Cache(err.to_string())
    }
}
