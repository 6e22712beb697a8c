use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, warn};

use super::engine::{LanguagePair, RateLimitParams, TranslationBackend};
use super::language::{canonical_code, language_name};
use super::prompt::{build_messages, prompt_fingerprint};
use super::retry::{RetryPolicy, with_backoff};
use super::tokens::{TokenCounter, Usage};
use crate::cache::CacheParams;
use crate::error::{Error, Result};
use crate::protocol::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ErrorEnvelope};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Engine for any OpenAI-compatible chat-completions endpoint, including a
/// local [`gateway`](crate::gateway).
pub struct OpenAiEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    retry: RetryPolicy,
    tokens: TokenCounter,
}

impl OpenAiEngine {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            // Sampling can break placeholder markers apart.
            temperature: 0.0,
            retry: RetryPolicy::default(),
            tokens: TokenCounter::new(),
        })
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Prompt/completion/total tokens spent so far.
    pub fn token_usage(&self) -> Usage {
        self.tokens.snapshot()
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        )
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let body = ChatCompletionRequest {
            model: Some(self.model.clone()),
            messages,
            temperature: Some(self.temperature),
        };

        let response = with_backoff(&self.retry, || self.send(&body)).await?;

        let content = response
            .first_content()
            .ok_or_else(|| Error::malformed("response contained no message content"))?
            .trim()
            .to_string();

        self.update_token_count(response.usage, &body.messages, &content);
        Ok(content)
    }

    async fn send(&self, body: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = self.completions_url();
        let mut request = self.client.post(&url).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| Error::malformed(format!("invalid chat completion from {url}: {e}")))
    }

    fn update_token_count(&self, reported: Option<Usage>, prompt: &[ChatMessage], completion: &str) {
        let usage = reported.unwrap_or_else(|| {
            let prompt_text = prompt
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            Usage::estimate(&prompt_text, completion)
        });

        match self.tokens.record(usage) {
            Ok(()) => debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage recorded"
            ),
            Err(e) => warn!(error = %e, "failed to update token count"),
        }
    }
}

/// Maps a non-2xx chat-completions response onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| format!("status {status}: {}", body.chars().take(200).collect::<String>()),
        |envelope| envelope.error.message,
    );

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied(message),
        StatusCode::TOO_MANY_REQUESTS => Error::QuotaExceeded(message),
        _ => Error::Upstream(message),
    }
}

#[async_trait]
impl TranslationBackend for OpenAiEngine {
    fn name(&self) -> &str {
        "openai"
    }

    fn map_language<'a>(&self, code: &'a str) -> Cow<'a, str> {
        canonical_code(code).map_or(Cow::Borrowed(code), Cow::Borrowed)
    }

    fn cache_impact_parameters(&self, languages: &LanguagePair) -> CacheParams {
        let mut params = CacheParams::new();
        params.insert("model".into(), json!(self.model));
        params.insert("temperature".into(), json!(self.temperature));
        params.insert("prompt".into(), json!(prompt_fingerprint(&target_name(languages))));
        params
    }

    async fn do_translate(
        &self,
        text: &str,
        languages: &LanguagePair,
        _rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        self.complete(build_messages(&target_name(languages), text))
            .await
    }

    async fn do_generative_translate(
        &self,
        text: &str,
        _languages: &LanguagePair,
        _rate_limit_params: Option<&RateLimitParams>,
    ) -> Result<String> {
        self.complete(vec![ChatMessage::new("user", text)]).await
    }
}

fn target_name(languages: &LanguagePair) -> String {
    language_name(&languages.lang_out)
        .map_or_else(|| languages.lang_out.clone(), str::to_string)
}
