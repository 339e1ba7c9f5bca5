//! Readiness evaluation.
//!
//! Probes fire every few seconds, so this check stays cheap: credential
//! presence costs nothing, and the optional DB check is a bare TCP connect
//! under a 2s deadline. It never calls the news API itself; probe traffic
//! must not burn upstream rate limit.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::{DbAddr, GatewayConfig};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Configured,
    Ok,
    Skipped,
    Failed,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Configured => "configured",
            CheckStatus::Ok => "ok",
            CheckStatus::Skipped => "skipped",
            CheckStatus::Failed => "failed",
        }
    }
}

/// Outcome of one readiness evaluation.
#[derive(Debug)]
pub struct ReadinessReport {
    pub ready: bool,
    pub newsapi: CheckStatus,
    pub db: CheckStatus,
    pub error: Option<String>,
}

pub struct ReadinessChecker {
    credential_present: bool,
    db: Option<DbAddr>,
    probe_timeout: Duration,
}

impl ReadinessChecker {
    pub fn new(credential_present: bool, db: Option<DbAddr>, probe_timeout: Duration) -> Self {
        Self { credential_present, db, probe_timeout }
    }

    pub fn from_config(cfg: &GatewayConfig) -> Self {
        Self::new(cfg.newsapi_key.is_some(), cfg.db.clone(), DEFAULT_PROBE_TIMEOUT)
    }

    /// Evaluate readiness. Missing credential fails fast with no I/O.
    pub async fn check(&self) -> ReadinessReport {
        if !self.credential_present {
            return ReadinessReport {
                ready: false,
                newsapi: CheckStatus::Failed,
                db: CheckStatus::Skipped,
                error: Some("NEWSAPI_KEY not set".to_string()),
            };
        }

        let Some(addr) = &self.db else {
            return ReadinessReport {
                ready: true,
                newsapi: CheckStatus::Configured,
                db: CheckStatus::Skipped,
                error: None,
            };
        };

        match self.probe_tcp(addr).await {
            Ok(()) => ReadinessReport {
                ready: true,
                newsapi: CheckStatus::Configured,
                db: CheckStatus::Ok,
                error: None,
            },
            Err(reason) => ReadinessReport {
                ready: false,
                newsapi: CheckStatus::Configured,
                db: CheckStatus::Failed,
                error: Some(reason),
            },
        }
    }

    /// TCP-level connect only; success closes the socket immediately.
    async fn probe_tcp(&self, addr: &DbAddr) -> std::result::Result<(), String> {
        match timeout(self.probe_timeout, TcpStream::connect((addr.host.as_str(), addr.port))).await
        {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(())
            }
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err("DB TCP timeout".to_string()),
        }
    }
}
