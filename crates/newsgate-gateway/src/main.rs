//! newsgate gateway entrypoint.
//!
//! - News proxy: /api/news?q=...
//! - Probes: /health (liveness), /ready (readiness)
//! - Metrics: /metrics, Prometheus text format
//! - Connection gauge updated at the accept loop, before HTTP parsing

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use newsgate_gateway::{app_state, config, transport};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = config::load_from_env().expect("config load failed");
    let listen: SocketAddr = ([0, 0, 0, 0], cfg.port).into();

    let state = app_state::AppState::new(cfg).expect("state init failed");

    tracing::info!(%listen, color = %state.color(), "newsgate starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    transport::serve(listener, state).await;
}
