use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::{PromptError, PromptResult};
use crate::filter::build_filter;
use crate::models::{
    Browse, CollectionStats, FilterParams, PromptHit, SearchPage, SearchParams, StatsUpdate,
    VectorSearch,
};
use crate::store::PromptStore;

const DEFAULT_LIMIT: u64 = 20;
const DEFAULT_THRESHOLD: f32 = 0.3;
const DEFAULT_SIMILAR_LIMIT: u64 = 5;
const DEFAULT_FEATURED_LIMIT: u64 = 6;

/// Prompt search orchestration: filter building, query embedding and the
/// vector-store calls behind every prompt endpoint.
///
/// Dispatches between semantic search (non-blank query) and filter-only
/// browsing, and owns the stats-update read-then-write cycle.
pub struct PromptSearchService<S: PromptStore> {
    store: S,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl<S: PromptStore> PromptSearchService<S> {
    pub fn new(store: S, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Semantic search when a non-blank query is present, filter-only
    /// browse otherwise. Blankness is decided after trimming.
    pub async fn search(&self, params: SearchParams) -> PromptResult<SearchPage> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let conditions = build_filter(&params.filters);
        // An empty condition list means no filter, never an empty AND.
        let filter = (!conditions.is_empty()).then_some(conditions);

        let query = params.query.as_deref().map(str::trim).unwrap_or("");

        let prompts: Vec<PromptHit> = if query.is_empty() {
            self.store
                .scroll(Browse {
                    filter,
                    limit,
                    offset,
                })
                .await?
                .into_iter()
                .map(PromptHit::from_stored)
                .collect()
        } else {
            let vector = self.embedder.embed(query).await?;
            let threshold = params.threshold.unwrap_or(DEFAULT_THRESHOLD);

            self.store
                .search(VectorSearch {
                    vector,
                    limit,
                    offset,
                    score_threshold: Some(threshold),
                    filter,
                })
                .await?
                .into_iter()
                .map(PromptHit::from_scored)
                .collect()
        };

        Ok(SearchPage::new(prompts, limit))
    }

    /// Prompts promoted on the landing page, in store order.
    pub async fn featured(&self, limit: Option<u64>) -> PromptResult<Vec<PromptHit>> {
        let conditions = build_filter(&FilterParams {
            featured: Some(true),
            ..Default::default()
        });

        let points = self
            .store
            .scroll(Browse {
                filter: Some(conditions),
                limit: limit.unwrap_or(DEFAULT_FEATURED_LIMIT),
                offset: 0,
            })
            .await?;

        Ok(points.into_iter().map(PromptHit::from_stored).collect())
    }

    /// Browse a single category. The literal value `"all"` disables the
    /// category filter (handled by the filter builder).
    pub async fn by_category(
        &self,
        category: String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> PromptResult<SearchPage> {
        self.search(SearchParams {
            query: None,
            filters: FilterParams {
                category: Some(category),
                ..Default::default()
            },
            limit,
            offset,
            threshold: None,
        })
        .await
    }

    /// Prompts similar to an existing one, found by searching with its own
    /// stored vector. An unknown id yields an empty list, not an error.
    pub async fn similar(&self, id: &str, limit: Option<u64>) -> PromptResult<Vec<PromptHit>> {
        let limit = limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);

        let found = self.store.retrieve(vec![id.to_string()], true).await?;
        let Some(source) = found.into_iter().next() else {
            return Ok(Vec::new());
        };

        let vector = source
            .vector
            .ok_or_else(|| PromptError::Internal(format!("Point {} has no vector", id)))?;

        // Over-fetch by one: the source point matches itself with the top
        // score and must be dropped. Saturate: limit is caller-supplied.
        let hits = self
            .store
            .search(VectorSearch {
                vector,
                limit: limit.saturating_add(1),
                offset: 0,
                score_threshold: Some(0.0),
                filter: None,
            })
            .await?;

        Ok(hits
            .into_iter()
            .filter(|hit| hit.id != id)
            .take(limit as usize)
            .map(PromptHit::from_scored)
            .collect())
    }

    /// Apply a client interaction to a prompt's counters.
    ///
    /// `"star"` bumps `stars`, `"use"` and `"copy"` bump `uses`; any other
    /// action only refreshes `updatedAt` (inherited "touch" behavior). The
    /// increment is read-then-write: two concurrent updates on the same id
    /// can lose one increment. Preserved as documented legacy behavior.
    pub async fn update_stats(&self, id: &str, action: &str) -> PromptResult<StatsUpdate> {
        let found = self.store.retrieve(vec![id.to_string()], false).await?;
        let Some(current) = found.into_iter().next() else {
            return Err(PromptError::NotFound(id.to_string()));
        };

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut update = StatsUpdate {
            stars: None,
            uses: None,
            updated_at: now.clone(),
        };

        match action {
            "star" => update.stars = Some(counter(&current.payload, "stars") + 1),
            "use" | "copy" => update.uses = Some(counter(&current.payload, "uses") + 1),
            other => debug!(action = other, "unrecognized stats action, touching updatedAt"),
        }

        let mut payload = Map::new();
        if let Some(stars) = update.stars {
            payload.insert("stars".to_string(), stars.into());
        }
        if let Some(uses) = update.uses {
            payload.insert("uses".to_string(), uses.into());
        }
        payload.insert("updatedAt".to_string(), Value::String(now));

        self.store.set_payload(id, payload).await?;

        Ok(update)
    }

    /// Collection diagnostics for the health surface.
    pub async fn collection_stats(&self) -> PromptResult<CollectionStats> {
        self.store.collection_info().await
    }
}

fn counter(payload: &Map<String, Value>, key: &str) -> u64 {
    payload.get(key).and_then(Value::as_u64).unwrap_or(0)
}
