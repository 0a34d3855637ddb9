//! Health check endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{SecondsFormat, Utc};
use domain_prompts::{PromptError, PromptSearchService, QdrantPromptStore};
use serde_json::{Value, json};

/// Liveness plus a Qdrant round trip, so orchestration catches a lost
/// vector store and not just a running process.
pub async fn health(
    State(service): State<Arc<PromptSearchService<QdrantPromptStore>>>,
) -> Result<Json<Value>, PromptError> {
    let stats = service.collection_stats().await?;

    Ok(Json(json!({
        "status": "ok",
        "message": format!("Prompt collection reachable with {} points", stats.points_count),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })))
}
