use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Optional metadata filters accepted by every listing endpoint.
///
/// All fields are optional; `featured` is tri-state (unset means "no
/// condition", `false` means "match unfeatured prompts only").
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FilterParams {
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub featured: Option<bool>,
    pub contributor: Option<String>,
}

/// One vendor-neutral filter condition on an indexed payload field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Exact keyword match.
    Keyword { key: &'static str, value: String },
    /// Exact boolean match.
    Flag { key: &'static str, value: bool },
    /// Matches when the multi-value field contains any of the keywords.
    AnyKeyword {
        key: &'static str,
        values: Vec<String>,
    },
}

/// Vector similarity query against the prompt collection.
#[derive(Debug, Clone)]
pub struct VectorSearch {
    pub vector: Vec<f32>,
    pub limit: u64,
    pub offset: u64,
    pub score_threshold: Option<f32>,
    /// `None` means no filter. Callers must never pass an empty condition
    /// list: some stores treat an empty AND as "match nothing".
    pub filter: Option<Vec<FilterCondition>>,
}

/// Filter-only browse query. No similarity ordering is implied.
#[derive(Debug, Clone)]
pub struct Browse {
    pub filter: Option<Vec<FilterCondition>>,
    pub limit: u64,
    pub offset: u64,
}

/// A stored point retrieved by id. The embedding vector is only populated
/// when explicitly requested; it is never exposed to API callers.
#[derive(Debug, Clone)]
pub struct StoredPrompt {
    pub id: String,
    pub payload: Map<String, Value>,
    pub vector: Option<Vec<f32>>,
}

/// Scored point from a similarity search, ordered by descending score.
/// Scores are opaque vendor floats and are never renormalized.
#[derive(Debug, Clone)]
pub struct ScoredPrompt {
    pub id: String,
    pub score: f32,
    pub payload: Map<String, Value>,
}

/// A prompt as returned to API callers: payload fields spread at the top
/// level next to the id, plus a similarity score for semantic results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromptHit {
    pub id: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl PromptHit {
    pub fn from_scored(point: ScoredPrompt) -> Self {
        Self {
            id: point.id,
            payload: point.payload,
            score: Some(point.score),
        }
    }

    pub fn from_stored(point: StoredPrompt) -> Self {
        Self {
            id: point.id,
            payload: point.payload,
            score: None,
        }
    }
}

/// Page of prompt results.
///
/// `total` is the returned page size, not a corpus count, and `has_more`
/// is the inherited full-page heuristic: true iff the page filled `limit`,
/// which misreports an exactly-full final page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub prompts: Vec<PromptHit>,
    pub total: usize,
    pub has_more: bool,
}

impl SearchPage {
    pub fn new(prompts: Vec<PromptHit>, limit: u64) -> Self {
        let total = prompts.len();
        Self {
            prompts,
            total,
            has_more: total as u64 == limit,
        }
    }
}

/// Service-level search parameters, assembled from the request body.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: Option<String>,
    pub filters: FilterParams,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub threshold: Option<f32>,
}

/// Partial payload applied by a stats update, echoed back for optimistic
/// display on the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<u64>,
    pub updated_at: String,
}

/// Collection diagnostics backing the health surface.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub points_count: u64,
    pub vector_size: u64,
    pub distance: String,
}
