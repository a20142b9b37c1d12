//! HTTP surface for the Quizmill parse service.
//!
//! This module exposes a compact Axum router with three endpoints:
//!
//! - `POST /parse` – Parse raw markdown and return the structured question
//!   list. Responses are cached by a digest of the input text, exact match
//!   only, with oldest-first eviction.
//! - `GET /health` – Liveness probe with the crate version.
//! - `GET /metrics` – Parse counters for observability dashboards.
//!
//! The service surface is parse-only by design: ingestion into the store
//! runs through the CLI pipeline, not through HTTP.

use crate::cache::ResponseCache;
use crate::metrics::{MetricsSnapshot, ParseMetrics};
use crate::model::{Question, compute_digest};
use crate::parse::parse_markdown;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state injected into the parse handlers: the response cache and
/// the request counters, both explicitly owned here.
pub struct ParseService {
    cache: ResponseCache,
    metrics: ParseMetrics,
}

impl ParseService {
    /// Create the service with a response cache of the given capacity.
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: ResponseCache::new(cache_capacity),
            metrics: ParseMetrics::new(),
        }
    }

    /// Parse raw markdown, consulting the exact-match cache first. Returns
    /// the questions and whether they came from the cache.
    pub fn parse_cached(&self, markdown: &str) -> (Vec<Question>, bool) {
        let key = compute_digest(markdown);
        if let Some(questions) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            return (questions, true);
        }

        let questions = parse_markdown(markdown);
        self.metrics.record_parse(questions.len() as u64);
        self.cache.insert(key, questions.clone());
        (questions, false)
    }

    /// Current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Build the HTTP router exposing the parse surface.
pub fn create_router(service: Arc<ParseService>) -> Router {
    Router::new()
        .route("/parse", post(parse_endpoint))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .with_state(service)
}

/// Request body for the `POST /parse` endpoint.
#[derive(Deserialize)]
struct ParseRequest {
    /// Raw markdown to run through the extraction engine.
    markdown: String,
}

/// Success response for the `POST /parse` endpoint.
#[derive(Serialize)]
struct ParseResponse {
    /// Number of questions extracted.
    count: usize,
    /// True when the response was served from the cache.
    cached: bool,
    /// The extracted questions in source order.
    questions: Vec<Question>,
}

async fn parse_endpoint(
    State(service): State<Arc<ParseService>>,
    Json(request): Json<ParseRequest>,
) -> Json<ParseResponse> {
    let (questions, cached) = service.parse_cached(&request.markdown);
    tracing::info!(count = questions.len(), cached, "Parse request completed");
    Json(ParseResponse {
        count: questions.len(),
        cached,
        questions,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_metrics(State(service): State<Arc<ParseService>>) -> Json<MetricsSnapshot> {
    Json(service.metrics_snapshot())
}
