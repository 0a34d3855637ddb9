//! REST handlers for the prompt library.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::error::PromptResult;
use crate::models::{FilterParams, PromptHit, SearchPage, SearchParams, StatsUpdate};
use crate::service::PromptSearchService;
use crate::store::PromptStore;

// ===== Request/Response DTOs =====

/// Body of the search endpoint. Filter fields sit next to the paging
/// fields, matching the flat body the frontend sends.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SearchBody {
    pub query: Option<String>,
    #[serde(flatten)]
    pub filters: FilterParams,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub threshold: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Body of the stats endpoint: which client interaction happened.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatsBody {
    pub action: String,
}

/// Applied stats delta, echoed for optimistic client updates.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub updates: StatsUpdate,
}

// ===== Handlers =====

/// Search the prompt library.
///
/// Semantic search when `query` is non-blank, filter-only browse otherwise.
#[utoipa::path(
    post,
    path = "/search",
    tag = "prompts",
    request_body = SearchBody,
    responses(
        (status = 200, description = "Page of matching prompts", body = SearchPage),
        (status = 500, description = "Upstream failure")
    )
)]
pub async fn search_prompts<S: PromptStore>(
    State(service): State<Arc<PromptSearchService<S>>>,
    Json(body): Json<SearchBody>,
) -> PromptResult<Json<SearchPage>> {
    let page = service
        .search(SearchParams {
            query: body.query,
            filters: body.filters,
            limit: body.limit,
            offset: body.offset,
            threshold: body.threshold,
        })
        .await?;

    Ok(Json(page))
}

/// List featured prompts.
#[utoipa::path(
    get,
    path = "/featured",
    tag = "prompts",
    params(("limit" = Option<u64>, Query, description = "Page size")),
    responses(
        (status = 200, description = "Featured prompts", body = Vec<PromptHit>),
        (status = 500, description = "Upstream failure")
    )
)]
pub async fn featured_prompts<S: PromptStore>(
    State(service): State<Arc<PromptSearchService<S>>>,
    Query(query): Query<LimitQuery>,
) -> PromptResult<Json<Vec<PromptHit>>> {
    let prompts = service.featured(query.limit).await?;
    Ok(Json(prompts))
}

/// List prompts similar to an existing one.
///
/// Unknown ids yield an empty list: "not found while reading" is benign.
#[utoipa::path(
    get,
    path = "/{id}/similar",
    tag = "prompts",
    params(
        ("id" = String, Path, description = "Source prompt id"),
        ("limit" = Option<u64>, Query, description = "Maximum results")
    ),
    responses(
        (status = 200, description = "Similar prompts with scores", body = Vec<PromptHit>),
        (status = 500, description = "Upstream failure")
    )
)]
pub async fn similar_prompts<S: PromptStore>(
    State(service): State<Arc<PromptSearchService<S>>>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> PromptResult<Json<Vec<PromptHit>>> {
    let prompts = service.similar(&id, query.limit).await?;
    Ok(Json(prompts))
}

/// Browse a category. The literal category `"all"` disables filtering.
#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = "prompts",
    params(
        ("category" = String, Path, description = "Category name or \"all\""),
        ("limit" = Option<u64>, Query, description = "Page size"),
        ("offset" = Option<u64>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Page of prompts", body = SearchPage),
        (status = 500, description = "Upstream failure")
    )
)]
pub async fn prompts_by_category<S: PromptStore>(
    State(service): State<Arc<PromptSearchService<S>>>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> PromptResult<Json<SearchPage>> {
    let page = service
        .by_category(category, query.limit, query.offset)
        .await?;
    Ok(Json(page))
}

/// Record a client interaction (star, use, copy) on a prompt.
///
/// Unknown ids are a 404 here: "not found while mutating" is an error.
#[utoipa::path(
    patch,
    path = "/{id}/stats",
    tag = "prompts",
    params(("id" = String, Path, description = "Prompt id")),
    request_body = StatsBody,
    responses(
        (status = 200, description = "Applied update", body = StatsResponse),
        (status = 404, description = "Unknown prompt id"),
        (status = 500, description = "Upstream failure")
    )
)]
pub async fn update_stats<S: PromptStore>(
    State(service): State<Arc<PromptSearchService<S>>>,
    Path(id): Path<String>,
    Json(body): Json<StatsBody>,
) -> PromptResult<Json<StatsResponse>> {
    let updates = service.update_stats(&id, &body.action).await?;

    Ok(Json(StatsResponse {
        success: true,
        updates,
    }))
}

/// OpenAPI documentation for the prompt endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        search_prompts,
        featured_prompts,
        similar_prompts,
        prompts_by_category,
        update_stats,
    ),
    components(schemas(SearchBody, SearchPage, PromptHit, StatsBody, StatsResponse, StatsUpdate)),
    tags((name = "prompts", description = "Prompt library search and stats"))
)]
pub struct PromptsApiDoc;

/// Router for the prompt endpoints, mounted by the app under `/prompts`.
pub fn router<S: PromptStore + 'static>(service: Arc<PromptSearchService<S>>) -> Router {
    Router::new()
        .route("/search", post(search_prompts))
        .route("/featured", get(featured_prompts))
        .route("/{id}/similar", get(similar_prompts))
        .route("/category/{category}", get(prompts_by_category))
        .route("/{id}/stats", patch(update_stats))
        .with_state(service)
}
