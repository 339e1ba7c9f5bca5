//! Axum router wiring.
//!
//! Four routes plus a completion hook that records `http_requests_total`
//! once per request, after the response is produced.

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::{app_state::AppState, ops, upstream};

const TRACKED_PATHS: [&str; 4] = ["/health", "/ready", "/metrics", "/api/news"];

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(ops::health))
        .route("/ready", get(ops::ready))
        .route("/metrics", get(ops::metrics))
        .route("/api/news", get(upstream::news))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Unmatched paths collapse to one label value so cardinality stays bounded.
fn normalize_path(path: &str) -> &str {
    TRACKED_PATHS.iter().copied().find(|p| *p == path).unwrap_or("unknown")
}

async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path()).to_string();

    let res = next.run(req).await;

    let status = res.status().as_u16().to_string();
    state.metrics().http_requests.inc(&[
        ("method", method.as_str()),
        ("path", path.as_str()),
        ("status", status.as_str()),
        ("color", state.color()),
    ]);
    tracing::info!(%method, %path, %status, "request completed");

    res
}
