//! Raw pass-through proxy for OpenAI chat and embeddings.
//!
//! The browser client never holds the OpenAI key; these routes forward the
//! request body verbatim, attach the server-side key, and relay the upstream
//! status, content type, and body unchanged.

use std::time::Duration;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;
use domain_prompts::{OpenAiConfig, PromptError, PromptResult};
use serde_json::Value;
use tracing::warn;

/// Shared proxy state: one pooled client for both upstream routes.
#[derive(Clone)]
pub struct OpenAiProxy {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProxy {
    pub fn new(config: OpenAiConfig) -> PromptResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Forwards `body` to `{base_url}{path}` and relays the upstream reply
    /// byte-for-byte, error bodies included.
    async fn forward(&self, path: &str, body: Value) -> PromptResult<Response> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        if !status.is_success() {
            warn!(%status, "openai upstream returned an error");
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        relay_response(status, content_type.as_deref(), bytes)
    }
}

/// Builds the relayed response: upstream status and body untouched, the
/// upstream content type preserved when present.
fn relay_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: Bytes,
) -> PromptResult<Response> {
    let mut builder = Response::builder().status(status);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from(body))
        .map_err(|e| PromptError::Internal(format!("Failed to build response: {}", e)))
}

pub async fn chat_completions(
    State(proxy): State<OpenAiProxy>,
    Json(body): Json<Value>,
) -> PromptResult<Response> {
    proxy.forward("/chat/completions", body).await
}

pub async fn embeddings(
    State(proxy): State<OpenAiProxy>,
    Json(body): Json<Value>,
) -> PromptResult<Response> {
    proxy.forward("/embeddings", body).await
}
