use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding API error ({status}): {body}")]
    EmbeddingUpstream { status: u16, body: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Unusable model reply: {0}")]
    InvalidReply(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PromptResult<T> = Result<T, PromptError>;

impl From<qdrant_client::QdrantError> for PromptError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        PromptError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for PromptError {
    fn from(err: reqwest::Error) -> Self {
        PromptError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::Internal(format!("JSON error: {}", err))
    }
}

impl IntoResponse for PromptError {
    fn into_response(self) -> Response {
        let status = match &self {
            PromptError::NotFound(_) => StatusCode::NOT_FOUND,
            PromptError::InvalidReply(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = PromptError::NotFound("abc123".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_reply_maps_to_502() {
        let response = PromptError::InvalidReply("bad json".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_store_error_maps_to_500() {
        let response = PromptError::Store("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_embedding_upstream_carries_status_and_body() {
        let err = PromptError::EmbeddingUpstream {
            status: 429,
            body: "rate limited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }
}
