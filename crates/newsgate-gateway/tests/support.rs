//! Shared helpers for integration tests: a real gateway on an ephemeral port.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::net::SocketAddr;

use newsgate_gateway::app_state::AppState;
use newsgate_gateway::config::GatewayConfig;
use newsgate_gateway::transport;

pub fn base_cfg() -> GatewayConfig {
    GatewayConfig {
        port: 0,
        color: "test".to_string(),
        newsapi_key: Some("test-key".to_string()),
        headlines_url: "https://newsapi.org/v2/top-headlines?country=us".to_string(),
        search_url: "https://newsapi.org/v2/everything".to_string(),
        db: None,
    }
}

/// Boot the full transport stack (accept loop, tracker, router) on 127.0.0.1.
pub async fn spawn_gateway(cfg: GatewayConfig) -> (SocketAddr, AppState) {
    let state = AppState::new(cfg).expect("state init");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(transport::serve(listener, state.clone()));
    (addr, state)
}
