//! Router and the single chat-completions handler.

use axum::{Json, Router, extract::State, routing::post};
use bytes::Bytes;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::error::GatewayError;
use crate::error::Error;
use crate::protocol::{ChatCompletionRequest, ChatCompletionResponse};
use crate::ratelimit::RateLimiter;
use crate::translation::Usage;
use crate::upstream::GenerativeUpstream;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Shared state of one gateway instance.
pub struct GatewayState {
    pub upstream: Arc<dyn GenerativeUpstream>,
    /// Independent of any limiter the gateway's callers use.
    pub limiter: Arc<RateLimiter>,
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route(COMPLETIONS_PATH, post(chat_completions))
        .with_state(state)
}

async fn chat_completions(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Result<Json<ChatCompletionResponse>, GatewayError> {
    state.limiter.wait().await;

    let request: ChatCompletionRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::bad_request(format!("Invalid request body: {e}")))?;

    let prompt = request
        .last_user_content()
        .ok_or_else(|| Error::bad_request("No user message found"))?;

    let preview: String = prompt.chars().take(50).collect();
    info!(model = %state.upstream.model(), preview = %preview, "forwarding request upstream");

    let translated = state.upstream.generate_content(prompt).await?;

    let response = ChatCompletionResponse::completed(
        format!("chatcmpl-{}", Uuid::new_v4()),
        chrono::Utc::now().timestamp(),
        state.upstream.model(),
        translated.clone(),
        Usage::estimate(prompt, &translated),
    );
    Ok(Json(response))
}
