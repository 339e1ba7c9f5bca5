//! Instrumented upstream client and the `/api/news` handler.
//!
//! One inbound request maps to exactly one outbound call; no retries. The
//! latency timer starts before the call and both the outcome counter and the
//! histogram are recorded with the same label set on every completion path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;

use newsgate_core::error::{NewsGateError, Result};
use newsgate_core::protocol::ErrorResponse;

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::obs::metrics::{CounterVec, HistogramVec, ServiceMetrics};

/// Outbound request deadline, so a hung upstream cannot hold a slot forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    credential: Option<String>,
    headlines_url: String,
    search_url: String,
    /// Country advertised by the configured headlines URL, or "na".
    headlines_country: String,
    color: String,
    calls: Arc<CounterVec>,
    latency: Arc<HistogramVec>,
}

/// Upstream status and body, passed through to the caller verbatim.
pub struct NewsReply {
    pub status: u16,
    pub body: Bytes,
}

impl NewsClient {
    pub fn new(cfg: &GatewayConfig, metrics: &ServiceMetrics) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NewsGateError::Internal(format!("build http client: {e}")))?;

        Ok(Self {
            http,
            credential: cfg.newsapi_key.clone(),
            headlines_url: cfg.headlines_url.clone(),
            search_url: cfg.search_url.clone(),
            headlines_country: country_of(&cfg.headlines_url),
            color: cfg.color.clone(),
            calls: Arc::clone(&metrics.news_api_calls),
            latency: Arc::clone(&metrics.news_api_latency),
        })
    }

    /// Issue one upstream call. A non-empty query selects search mode.
    ///
    /// A missing credential fails before the timer starts, so it neither
    /// counts as a call nor records a latency sample.
    pub async fn fetch(&self, query: Option<String>) -> Result<NewsReply> {
        let q = query.as_deref().map(str::trim).filter(|s| !s.is_empty());
        // search mode reports country "na"; existing dashboards key on this
        // label scheme
        let country = if q.is_some() { "na" } else { self.headlines_country.as_str() };

        let Some(key) = self.credential.as_deref() else {
            return Err(NewsGateError::Config("NEWSAPI_KEY not configured".to_string()));
        };

        let started = Instant::now();
        let result = self.call(q, key).await;
        let elapsed = started.elapsed();

        match result {
            Ok((status, body)) => {
                let outcome = if (200..300).contains(&status) {
                    "success".to_string()
                } else {
                    format!("http_{status}")
                };
                self.record(&outcome, country, elapsed);
                Ok(NewsReply { status, body })
            }
            Err(err) => {
                self.record("error", country, elapsed);
                Err(NewsGateError::Upstream(err.to_string()))
            }
        }
    }

    async fn call(&self, q: Option<&str>, key: &str) -> reqwest::Result<(u16, Bytes)> {
        let request = match q {
            Some(q) => self.http.get(&self.search_url).query(&[("q", q)]),
            None => self.http.get(&self.headlines_url),
        };
        let response = request.header("X-Api-Key", key).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body))
    }

    fn record(&self, outcome: &str, country: &str, elapsed: Duration) {
        let labels = [("status", outcome), ("country", country), ("color", self.color.as_str())];
        self.calls.inc(&labels);
        self.latency.observe(&labels, elapsed);
    }
}

fn country_of(headlines_url: &str) -> String {
    reqwest::Url::parse(headlines_url)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "country")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| "na".to_string())
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub q: Option<String>,
}

pub async fn news(State(state): State<AppState>, Query(params): Query<NewsQuery>) -> Response {
    let client = state.news().clone();
    // detached so a dropped client connection cannot cancel the call or lose
    // its metrics
    let outcome = match tokio::spawn(async move { client.fetch(params.q).await }).await {
        Ok(result) => result,
        Err(err) => Err(NewsGateError::Internal(format!("news task join: {err}"))),
    };

    match outcome {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                reply.body,
            )
                .into_response()
        }
        Err(NewsGateError::Config(msg)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(msg))).into_response()
        }
        Err(NewsGateError::Upstream(details)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details("fetch_failed", details)),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(%err, "unexpected news handler failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details(err.client_code().as_str(), err.to_string())),
            )
                .into_response()
        }
    }
}
