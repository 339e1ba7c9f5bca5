//! Wire-shape tests for the operational endpoint bodies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use newsgate_core::protocol::{ErrorResponse, HealthResponse, ReadyResponse};

#[test]
fn ready_success_omits_error() {
    let body = ReadyResponse {
        ready: true,
        color: "blue".into(),
        newsapi: Some("configured".into()),
        db: Some("skipped".into()),
        error: None,
    };

    let v: serde_json::Value = serde_json::to_value(&body).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "ready": true,
            "color": "blue",
            "newsapi": "configured",
            "db": "skipped",
        })
    );
}

#[test]
fn ready_failure_omits_check_fields() {
    let body = ReadyResponse {
        ready: false,
        color: "green".into(),
        newsapi: None,
        db: None,
        error: Some("NEWSAPI_KEY not set".into()),
    };

    let v: serde_json::Value = serde_json::to_value(&body).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "ready": false,
            "color": "green",
            "error": "NEWSAPI_KEY not set",
        })
    );
}

#[test]
fn health_field_names_are_stable() {
    let body = HealthResponse { ok: true, ts: 1_700_000_000_000, color: "unknown".into() };
    let v: serde_json::Value = serde_json::to_value(&body).unwrap();
    assert_eq!(v["ok"], true);
    assert_eq!(v["ts"], 1_700_000_000_000u64);
    assert_eq!(v["color"], "unknown");
}

#[test]
fn error_body_details_are_optional() {
    let bare = serde_json::to_value(ErrorResponse::new("NEWSAPI_KEY not configured")).unwrap();
    assert_eq!(bare, serde_json::json!({ "error": "NEWSAPI_KEY not configured" }));

    let full = serde_json::to_value(ErrorResponse::with_details("fetch_failed", "connect refused")).unwrap();
    assert_eq!(
        full,
        serde_json::json!({ "error": "fetch_failed", "details": "connect refused" })
    );
}
