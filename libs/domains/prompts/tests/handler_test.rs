//! Handler tests for the prompts domain.
//!
//! These drive the real router against an in-memory fixture store, so they
//! cover request deserialization, the service dispatch logic, and response
//! shapes without a running Qdrant.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_prompts::{
    Browse, CollectionStats, EmbeddingProvider, FilterCondition, PromptError, PromptResult,
    PromptSearchService, PromptStore, ScoredPrompt, StoredPrompt, VectorSearch, handlers,
};
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use tower::ServiceExt; // for oneshot()

// ===== Fixtures =====

struct FixturePoint {
    id: String,
    vector: Vec<f32>,
    payload: Map<String, Value>,
}

/// In-memory [`PromptStore`] with real cosine scoring, so search results
/// order and threshold like the production store.
struct FixtureStore {
    points: Mutex<Vec<FixturePoint>>,
}

impl FixtureStore {
    fn new(points: Vec<(&str, Vec<f32>, Value)>) -> Self {
        let points = points
            .into_iter()
            .map(|(id, vector, payload)| FixturePoint {
                id: id.to_string(),
                vector,
                payload: as_object(payload),
            })
            .collect();
        Self {
            points: Mutex::new(points),
        }
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn condition_matches(payload: &Map<String, Value>, condition: &FilterCondition) -> bool {
    match condition {
        FilterCondition::Keyword { key, value } => {
            payload.get(*key).and_then(Value::as_str) == Some(value.as_str())
        }
        FilterCondition::Flag { key, value } => {
            payload.get(*key).and_then(Value::as_bool) == Some(*value)
        }
        FilterCondition::AnyKeyword { key, values } => payload
            .get(*key)
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .any(|tag| values.iter().any(|v| v == tag))
            })
            .unwrap_or(false),
    }
}

fn filter_matches(payload: &Map<String, Value>, filter: &Option<Vec<FilterCondition>>) -> bool {
    filter
        .as_ref()
        .map(|conditions| conditions.iter().all(|c| condition_matches(payload, c)))
        .unwrap_or(true)
}

#[async_trait]
impl PromptStore for FixtureStore {
    async fn search(&self, query: VectorSearch) -> PromptResult<Vec<ScoredPrompt>> {
        let points = self.points.lock().unwrap();
        let mut hits: Vec<ScoredPrompt> = points
            .iter()
            .filter(|p| filter_matches(&p.payload, &query.filter))
            .map(|p| ScoredPrompt {
                id: p.id.clone(),
                score: cosine(&query.vector, &p.vector),
                payload: p.payload.clone(),
            })
            .filter(|hit| query.score_threshold.is_none_or(|t| hit.score >= t))
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn scroll(&self, query: Browse) -> PromptResult<Vec<StoredPrompt>> {
        let points = self.points.lock().unwrap();
        Ok(points
            .iter()
            .filter(|p| filter_matches(&p.payload, &query.filter))
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|p| StoredPrompt {
                id: p.id.clone(),
                payload: p.payload.clone(),
                vector: None,
            })
            .collect())
    }

    async fn retrieve(
        &self,
        ids: Vec<String>,
        with_vector: bool,
    ) -> PromptResult<Vec<StoredPrompt>> {
        let points = self.points.lock().unwrap();
        Ok(points
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| StoredPrompt {
                id: p.id.clone(),
                payload: p.payload.clone(),
                vector: with_vector.then(|| p.vector.clone()),
            })
            .collect())
    }

    async fn set_payload(&self, id: &str, payload: Map<String, Value>) -> PromptResult<()> {
        let mut points = self.points.lock().unwrap();
        let point = points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PromptError::NotFound(id.to_string()))?;
        for (key, value) in payload {
            point.payload.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, ids: Vec<String>) -> PromptResult<u64> {
        let mut points = self.points.lock().unwrap();
        let before = points.len();
        points.retain(|p| !ids.contains(&p.id));
        Ok((before - points.len()) as u64)
    }

    async fn collection_info(&self) -> PromptResult<CollectionStats> {
        let points = self.points.lock().unwrap();
        Ok(CollectionStats {
            points_count: points.len() as u64,
            vector_size: 2,
            distance: "cosine".to_string(),
        })
    }
}

/// Deterministic embedder: known queries map to fixed vectors.
struct FixtureEmbedder {
    known: HashMap<&'static str, Vec<f32>>,
}

impl FixtureEmbedder {
    fn new() -> Self {
        let mut known = HashMap::new();
        known.insert("code review", vec![1.0, 0.0]);
        Self { known }
    }
}

#[async_trait]
impl EmbeddingProvider for FixtureEmbedder {
    async fn embed(&self, text: &str) -> PromptResult<Vec<f32>> {
        Ok(self.known.get(text).cloned().unwrap_or(vec![0.0, 1.0]))
    }
}

fn prompt(title: &str, category: &str, featured: bool, uses: u64) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "prompt": format!("You are a {}.", title),
        "category": category,
        "tags": ["fixture"],
        "difficulty": "beginner",
        "featured": featured,
        "stars": 3,
        "uses": uses,
        "updatedAt": "2024-01-01T00:00:00.000Z",
    })
}

fn fixture_app() -> axum::Router {
    // One close document and nine far ones, per the search fixture.
    let mut points = vec![(
        "abc123",
        vec![0.95, 0.05],
        prompt("Code Review Assistant", "coding", true, 10),
    )];
    let far: Vec<(String, Vec<f32>, Value)> = (0..9)
        .map(|i| {
            (
                format!("far-{}", i),
                vec![0.05, 0.95],
                prompt(&format!("Unrelated {}", i), "writing", i == 0, 0),
            )
        })
        .collect();
    let far_refs: Vec<(&str, Vec<f32>, Value)> = far
        .iter()
        .map(|(id, v, p)| (id.as_str(), v.clone(), p.clone()))
        .collect();
    points.extend(far_refs);

    let store = FixtureStore::new(points);
    let service = Arc::new(PromptSearchService::new(store, Arc::new(FixtureEmbedder::new())));
    handlers::router(service)
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn patch_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ===== Tests =====

#[tokio::test]
async fn test_search_returns_best_match_first_above_threshold() {
    let app = fixture_app();

    let response = app
        .oneshot(post_json(
            "/search",
            json!({"query": "code review", "limit": 2, "threshold": 0.3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;

    let prompts = body["prompts"].as_array().unwrap();
    assert!(prompts.len() <= 2);
    assert_eq!(prompts[0]["title"], "Code Review Assistant");
    for hit in prompts {
        assert!(hit["score"].as_f64().unwrap() >= 0.3);
    }
}

#[tokio::test]
async fn test_search_without_query_browses_without_scores() {
    let app = fixture_app();

    let response = app
        .oneshot(post_json("/search", json!({"limit": 3})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;

    let prompts = body["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts.iter().all(|p| p.get("score").is_none()));
    assert_eq!(body["total"], 3);
    assert_eq!(body["hasMore"], true); // full page heuristic
}

#[tokio::test]
async fn test_search_with_category_filter() {
    let app = fixture_app();

    let response = app
        .oneshot(post_json("/search", json!({"category": "coding"})))
        .await
        .unwrap();

    let body = json_body(response.into_body()).await;
    let prompts = body["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0]["category"], "coding");
    assert_eq!(body["hasMore"], false);
}

#[tokio::test]
async fn test_featured_returns_bare_list_of_featured_prompts() {
    let app = fixture_app();

    let response = app.oneshot(get("/featured?limit=10")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;

    let prompts = body.as_array().expect("featured returns a bare list");
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().all(|p| p["featured"] == true));
}

#[tokio::test]
async fn test_category_all_returns_everything() {
    let app = fixture_app();

    let response = app.oneshot(get("/category/all?limit=50")).await.unwrap();

    let body = json_body(response.into_body()).await;
    assert_eq!(body["prompts"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_category_filters_prompts() {
    let app = fixture_app();

    let response = app
        .oneshot(get("/category/writing?limit=50"))
        .await
        .unwrap();

    let body = json_body(response.into_body()).await;
    let prompts = body["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 9);
    assert!(prompts.iter().all(|p| p["category"] == "writing"));
}

#[tokio::test]
async fn test_similar_excludes_the_source_prompt() {
    let app = fixture_app();

    let response = app
        .oneshot(get("/abc123/similar?limit=5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;

    let prompts = body.as_array().unwrap();
    assert!(prompts.len() <= 5);
    assert!(prompts.iter().all(|p| p["id"] != "abc123"));
    assert!(prompts.iter().all(|p| p["score"].is_number()));
}

#[tokio::test]
async fn test_similar_survives_extreme_limit() {
    let app = fixture_app();

    let response = app
        .oneshot(get("/abc123/similar?limit=18446744073709551615"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert!(body.as_array().unwrap().iter().all(|p| p["id"] != "abc123"));
}

#[tokio::test]
async fn test_similar_unknown_id_returns_empty_list() {
    let app = fixture_app();

    let response = app
        .oneshot(get("/does-not-exist/similar"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_stats_copy_increments_uses() {
    let app = fixture_app();

    let response = app
        .clone()
        .oneshot(patch_json("/abc123/stats", json!({"action": "copy"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["updates"]["uses"], 11);
    let updated_at = body["updates"]["updatedAt"].as_str().unwrap();
    assert!(updated_at > "2024-01-01T00:00:00.000Z");

    // The write landed: a second copy reads the merged payload.
    let response = app
        .oneshot(patch_json("/abc123/stats", json!({"action": "copy"})))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["updates"]["uses"], 12);
}

#[tokio::test]
async fn test_stats_unknown_id_returns_404() {
    let app = fixture_app();

    let response = app
        .oneshot(patch_json("/missing/stats", json!({"action": "use"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("missing"));
}
