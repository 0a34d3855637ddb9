//! Prompt Search Domain Library
//!
//! Domain implementation for the Promptea prompt library: semantic search
//! and filter-only browsing over a Qdrant collection, with query embeddings
//! generated through OpenAI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ PromptSearchService │  ← dispatch, similar-to, stats updates
//! └─────────┬───────────┘
//!           │
//! ┌─────────▼───────┐     ┌───────────────────┐
//! │   PromptStore   │     │ EmbeddingProvider │
//! │     (trait)     │     │      (trait)      │
//! └─────────┬───────┘     └─────────┬─────────┘
//!           │                       │
//! ┌─────────▼────────┐    ┌─────────▼────────┐
//! │ QdrantPromptStore│    │ OpenAiEmbeddings │
//! └──────────────────┘    └──────────────────┘
//! ```
//!
//! Both seams are trait objects so handler and service tests can substitute
//! fakes; the real clients are constructed once at startup and injected.

pub mod embedding;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod qdrant;
pub mod reply;
pub mod service;
pub mod store;

pub use embedding::{
    EmbeddingProvider, OpenAiConfig, OpenAiEmbeddings, EMBEDDING_DIMENSION, EMBEDDING_MODEL,
};
pub use error::{PromptError, PromptResult};
pub use filter::build_filter;
pub use handlers::PromptsApiDoc;
pub use models::{
    Browse, CollectionStats, FilterCondition, FilterParams, PromptHit, ScoredPrompt, SearchPage,
    SearchParams, StatsUpdate, StoredPrompt, VectorSearch,
};
pub use qdrant::{QdrantConfig, QdrantPromptStore};
pub use reply::parse_structured_reply;
pub use service::PromptSearchService;
pub use store::PromptStore;
