use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::PromptResult;
use crate::models::{Browse, CollectionStats, ScoredPrompt, StoredPrompt, VectorSearch};

/// Gateway trait for the vector store holding the prompt collection.
///
/// Thin pass-through to the vendor API, parameterized by a fixed collection
/// name. Errors from the underlying store propagate without retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Similarity search, ordered by descending score.
    async fn search(&self, query: VectorSearch) -> PromptResult<Vec<ScoredPrompt>>;

    /// Filter-only pagination with no ordering guarantee beyond
    /// store-internal order.
    async fn scroll(&self, query: Browse) -> PromptResult<Vec<StoredPrompt>>;

    /// Fetch points by id. Unknown ids are skipped, so the result may be
    /// empty; that is not an error.
    async fn retrieve(&self, ids: Vec<String>, with_vector: bool)
    -> PromptResult<Vec<StoredPrompt>>;

    /// Merge fields into an existing payload. Never replaces the whole
    /// document and never touches the vector.
    async fn set_payload(&self, id: &str, payload: Map<String, Value>) -> PromptResult<()>;

    /// Delete points by id. Exists on the gateway but is not wired to any
    /// HTTP route.
    async fn delete(&self, ids: Vec<String>) -> PromptResult<u64>;

    /// Collection diagnostics for the health surface.
    async fn collection_info(&self) -> PromptResult<CollectionStats>;
}
