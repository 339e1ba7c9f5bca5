//! Shared error type across newsgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Required configuration is missing or invalid.
    Config,
    /// A readiness dependency could not be reached in time.
    DependencyUnreachable,
    /// The outbound upstream call failed.
    Upstream,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Config => "config",
            ClientCode::DependencyUnreachable => "dependency_unreachable",
            ClientCode::Upstream => "upstream",
            ClientCode::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, NewsGateError>;

/// Unified error type used by core and gateway.
///
/// None of these are fatal to the process: configuration errors fast-fail the
/// affected request, dependency failures only flip readiness, upstream
/// failures are reported to the caller and counted, never retried.
#[derive(Debug, Error)]
pub enum NewsGateError {
    #[error("config: {0}")]
    Config(String),
    #[error("dependency unreachable: {0}")]
    DependencyUnreachable(String),
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl NewsGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            NewsGateError::Config(_) => ClientCode::Config,
            NewsGateError::DependencyUnreachable(_) => ClientCode::DependencyUnreachable,
            NewsGateError::Upstream(_) => ClientCode::Upstream,
            NewsGateError::Internal(_) => ClientCode::Internal,
        }
    }
}
