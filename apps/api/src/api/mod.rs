//! API routes module

pub mod health;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain_prompts::{PromptSearchService, PromptsApiDoc, QdrantPromptStore, handlers};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

use openai::OpenAiProxy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Assembles the full application router.
pub fn app(
    service: Arc<PromptSearchService<QdrantPromptStore>>,
    proxy: OpenAiProxy,
    allowed_origins: &[String],
) -> eyre::Result<Router> {
    let router = Router::new()
        .route("/health", get(health::health).with_state(service.clone()))
        .nest("/prompts", handlers::router(service))
        .route(
            "/chat/completions",
            post(openai::chat_completions).with_state(proxy.clone()),
        )
        .route("/embeddings", post(openai::embeddings).with_state(proxy))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(PromptsApiDoc::openapi()) }),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(allowed_origins)?)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    Ok(router)
}

/// CORS for the browser client: explicit origin list, the methods the API
/// actually serves, and the headers the client sends.
fn cors_layer(allowed_origins: &[String]) -> eyre::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| eyre::eyre!("invalid origin in ALLOWED_ORIGINS: {origin}"))
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    info!("CORS allowed origins: {}", allowed_origins.join(", "));

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600)))
}
