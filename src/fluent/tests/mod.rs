//! Test helpers for the composition middleware.
//!
//! These tests use `oneshot()` for fast, in-process testing without network I/O.
//! The engines here never fetch anything: they describe the plan they received
//! in the response body so tests can assert on it.

use crate::{CompositionEngine, Error, FetchPlan, Result};
use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::{Arc, Mutex};

#[cfg(test)]
pub(crate) mod compose;

// ============================================================================
// Engines
// ============================================================================

/// Engine that records every plan and answers with a one-line summary:
/// `priority:url` of every job, separated by spaces, main job last.
#[derive(Clone, Default)]
pub(crate) struct RecordingEngine {
    plans: Arc<Mutex<Vec<FetchPlan>>>,
}

impl RecordingEngine {
    pub(crate) fn plans(&self) -> Vec<FetchPlan> {
        self.plans.lock().unwrap().clone()
    }
}

impl CompositionEngine for RecordingEngine {
    async fn compose(&self, plan: FetchPlan, request: Request) -> Result<Response> {
        let summary = plan
            .iter()
            .map(|job| format!("{}:{}", job.priority, job.url))
            .collect::<Vec<_>>()
            .join(" ");
        let body = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|e| Error::internal(e.to_string()))?;

        self.plans.lock().unwrap().push(plan);

        Ok((
            StatusCode::OK,
            [("x-composed", "true")],
            format!("{summary}\n{}", String::from_utf8_lossy(&body)),
        )
            .into_response())
    }
}

/// Engine that always fails.
pub(crate) struct FailingEngine;

impl CompositionEngine for FailingEngine {
    async fn compose(&self, _plan: FetchPlan, _request: Request) -> Result<Response> {
        Err(Error::engine("upstream unreachable"))
    }
}

// ============================================================================
// Router Helpers
// ============================================================================

/// Application routes behind the middleware. Reaching them means the request
/// was passed through.
pub(crate) fn app_routes() -> Router {
    Router::new()
        .route("/static/app.js", get(|| async { "passthrough" }))
        .route("/api/echo", post(|body: String| async move { body }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "passthrough 404") })
}

// ============================================================================
// Request / Response Helpers
// ============================================================================

pub(crate) fn get_request(uri: &str) -> Request {
    axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

pub(crate) async fn get_body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}
