use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::error::Error;
use crate::protocol::ErrorEnvelope;

/// A failed gateway request, rendered as an OpenAI-style error envelope.
#[derive(Debug)]
pub struct GatewayError(pub Error);

impl From<Error> for GatewayError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl GatewayError {
    /// Status, `type` and `code` reported to the client.
    pub fn classify(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match &self.0 {
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", None),
            Error::PermissionDenied(_) => (
                StatusCode::UNAUTHORIZED,
                "invalid_request_error",
                Some("invalid_api_key"),
            ),
            Error::QuotaExceeded(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "insufficient_quota",
                Some("quota_exceeded"),
            ),
            Error::Upstream(_) | Error::MalformedResponse(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "api_error", None)
            }
            Error::Config(_) | Error::Cache(_) | Error::Unsupported { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            Error::PermissionDenied(_) => {
                "Invalid upstream API key. Check the provider configuration.".to_string()
            }
            Error::QuotaExceeded(_) => {
                "Upstream quota exceeded. Retry later or raise the provider quota.".to_string()
            }
            Error::Upstream(_) | Error::MalformedResponse(_) => {
                format!("Translation failed: {}", self.0)
            }
            Error::BadRequest(msg) => msg.clone(),
            _ => format!("Request processing failed: {}", self.0),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, kind, code) = self.classify();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "gateway request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "gateway request rejected");
        }

        (status, Json(ErrorEnvelope::new(self.message(), kind, code))).into_response()
    }
}
