//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness, no dependency checks
//! - `/ready`   : readiness (503 until dependencies check out)
//! - `/metrics` : Prometheus text format

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use newsgate_core::protocol::{HealthResponse, ReadyResponse};

use crate::app_state::AppState;
use crate::obs::metrics::EXPOSITION_CONTENT_TYPE;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse { ok: true, ts: epoch_ms(), color: state.color().to_string() })
}

pub async fn ready(State(state): State<AppState>) -> Response {
    let report = state.readiness().check().await;
    let color = state.color().to_string();

    if report.ready {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                color,
                newsapi: Some(report.newsapi.as_str().to_string()),
                db: Some(report.db.as_str().to_string()),
                error: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse { ready: false, color, newsapi: None, db: None, error: report.error }),
        )
            .into_response()
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.registry().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
