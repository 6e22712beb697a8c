use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::GenerativeUpstream;
use crate::error::{Error, Result};

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<OutgoingPart<'a>>,
}

#[derive(Debug, Serialize)]
struct OutgoingPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Debug, Deserialize)]
struct IncomingPart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    reason: Option<String>,
}

impl GoogleError {
    /// Gemini reports a rejected key as `INVALID_ARGUMENT` with this reason.
    fn is_invalid_key(&self) -> bool {
        self.details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
    }
}

/// Client for the Gemini `generateContent` REST call.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("Gemini API key is empty"));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            api_key,
            model: model.into(),
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeUpstream for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![OutgoingPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling generateContent");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::malformed(format!("invalid generateContent response: {e}")))?;

        parsed
            .text()
            .ok_or_else(|| Error::malformed("generateContent returned no text"))
    }
}

/// Classifies a failed call by Google's error reason and status string
/// first, HTTP status second.
fn classify_failure(status: StatusCode, body: &str) -> Error {
    let (message, google_status, invalid_key) =
        match serde_json::from_str::<GoogleErrorEnvelope>(body) {
            Ok(envelope) => {
                let invalid_key = envelope.error.is_invalid_key();
                (envelope.error.message, envelope.error.status, invalid_key)
            }
            Err(_) => (
                format!("status {status}: {}", body.chars().take(200).collect::<String>()),
                String::new(),
                false,
            ),
        };

    if invalid_key {
        return Error::PermissionDenied(message);
    }
    match google_status.as_str() {
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => return Error::PermissionDenied(message),
        "RESOURCE_EXHAUSTED" => return Error::QuotaExceeded(message),
        _ => {}
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied(message),
        StatusCode::TOO_MANY_REQUESTS => Error::QuotaExceeded(message),
        _ => Error::Upstream(message),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_google_status_wins_over_http_status() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        match classify_failure(StatusCode::BAD_REQUEST, body) {
            Error::PermissionDenied(message) => assert_eq!(message, "API key not valid"),
            other => panic!("unexpected {other:?}"),
        }

        let body = r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, body),
            Error::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_invalid_api_key_reason_is_permission_denied() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID","domain":"googleapis.com"}]}}"#;
        match classify_failure(StatusCode::BAD_REQUEST, body) {
            Error::PermissionDenied(message) => assert!(message.starts_with("API key not valid")),
            other => panic!("unexpected {other:?}"),
        }

        let body = r#"{"error":{"code":400,"message":"bad field","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.BadRequest"}]}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body),
            Error::Upstream(_)
        ));
    }

    #[test]
    fn test_http_status_fallback() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "nope"),
            Error::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            Error::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, ""),
            Error::Upstream(_)
        ));
        let body = r#"{"error":{"code":400,"message":"bad field","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body),
            Error::Upstream(_)
        ));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Bon"},{"text":"jour"}],"role":"model"}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Bonjour"));
    }

    #[test]
    fn test_response_without_text() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(blocked.text(), None);

        let empty: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_url_and_key_validation() {
        let client = GeminiClient::new("key", "gemini-1.5-flash")
            .unwrap()
            .with_endpoint("http://127.0.0.1:1234/");
        assert_eq!(
            client.url(),
            "http://127.0.0.1:1234/v1beta/models/gemini-1.5-flash:generateContent"
        );

        assert!(matches!(
            GeminiClient::new("  ", "gemini-1.5-flash"),
            Err(Error::Config(_))
        ));
    }
}
