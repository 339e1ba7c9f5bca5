//! Response bodies of the operational endpoints.
//!
//! Orchestrators and dashboards key off these exact field names; treat them
//! as a stable API.

use serde::{Deserialize, Serialize};

/// `GET /health` body. Liveness only, no dependency checks.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Epoch milliseconds at the time of the probe.
    pub ts: u64,
    pub color: String,
}

/// `GET /ready` body.
///
/// The per-check fields are present on the 200 path only; a failure reports
/// `ready: false` plus `error` and nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsapi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generic JSON error body. Every error path carries at least `error`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self { error: error.into(), details: Some(details.into()) }
    }
}
