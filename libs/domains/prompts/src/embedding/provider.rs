use async_trait::async_trait;

use crate::error::PromptResult;

/// Trait for text-embedding providers.
///
/// The model is fixed per provider instance; every call is a fresh network
/// round-trip with no retries and no caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text.
    async fn embed(&self, text: &str) -> PromptResult<Vec<f32>>;
}
