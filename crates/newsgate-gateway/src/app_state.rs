//! Shared application state for the newsgate gateway.
//!
//! Owns the metric registry and every component that mutates it, so handlers
//! get one injected handle instead of ambient globals. Cheap to clone.

use std::sync::Arc;

use newsgate_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::metrics::{MetricRegistry, ServiceMetrics};
use crate::readiness::ReadinessChecker;
use crate::transport::tracker::ConnectionTracker;
use crate::upstream::NewsClient;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    registry: MetricRegistry,
    metrics: ServiceMetrics,
    tracker: Arc<ConnectionTracker>,
    readiness: ReadinessChecker,
    news: NewsClient,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let registry = MetricRegistry::new();
        let metrics = ServiceMetrics::register_on(&registry);

        let tracker =
            ConnectionTracker::new(Arc::clone(&metrics.active_connections), cfg.color.clone());
        let readiness = ReadinessChecker::from_config(&cfg);
        let news = NewsClient::new(&cfg, &metrics)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry, metrics, tracker, readiness, news }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn color(&self) -> &str {
        &self.inner.cfg.color
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.inner.metrics
    }

    pub fn tracker(&self) -> Arc<ConnectionTracker> {
        Arc::clone(&self.inner.tracker)
    }

    pub fn readiness(&self) -> &ReadinessChecker {
        &self.inner.readiness
    }

    pub fn news(&self) -> &NewsClient {
        &self.inner.news
    }
}
