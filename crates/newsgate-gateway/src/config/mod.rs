//! Gateway config loader (environment-sourced).

pub mod schema;

pub use schema::{DbAddr, GatewayConfig};

use newsgate_core::error::Result;

/// Load configuration from the process environment.
pub fn load_from_env() -> Result<GatewayConfig> {
    GatewayConfig::from_pairs(std::env::vars())
}
