//! Metrics registry for the gateway.
//!
//! No external dependencies are used; this module provides counter/gauge/histogram
//! types with dynamic labels backed by `DashMap`. Labels are flattened into
//! sorted key vectors to keep deterministic ordering. Histogram observations are
//! stored in microseconds to avoid floating point math on the hot path and
//! rendered in seconds, which is what the bucket boundaries are declared in.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use newsgate_core::error::{NewsGateError, Result};

/// Content type declared by `render()` output.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Latency bucket upper bounds, in seconds.
pub const LATENCY_BUCKETS: [f64; 7] = [0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn render_labels(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Anything the registry can render.
///
/// `name()` is the registry identity (and the exposition family name for
/// single-family collectors); `render_into` appends `# HELP`/`# TYPE` lines
/// plus one line per live label combination, reading each cell with relaxed
/// atomic loads so rendering never blocks or fails under concurrent mutation.
pub trait Collector: Send + Sync {
    fn name(&self) -> &str;
    fn render_into(&self, out: &mut String);
}

pub struct CounterVec {
    name: String,
    help: String,
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &str, help: &str) -> Arc<Self> {
        Arc::new(Self { name: name.to_string(), help: help.to_string(), map: DashMap::new() })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        let counter = self.map.entry(label_key(labels)).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for an exact label combination.
    pub fn get(&self, labels: &[(&str, &str)]) -> Option<u64> {
        self.map.get(&label_key(labels)).map(|c| c.load(Ordering::Relaxed))
    }

    /// Number of live label combinations.
    pub fn series_count(&self) -> usize {
        self.map.len()
    }
}

impl Collector for CounterVec {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_into(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} counter", self.name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", self.name, render_labels(r.key()), val);
        }
    }
}

pub struct GaugeVec {
    name: String,
    help: String,
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    pub fn new(name: &str, help: &str) -> Arc<Self> {
        Arc::new(Self { name: name.to_string(), help: help.to_string(), map: DashMap::new() })
    }

    /// Set to an absolute value.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self.map.entry(label_key(labels)).or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    /// Current value for an exact label combination.
    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        self.map.get(&label_key(labels)).map(|g| g.load(Ordering::Relaxed))
    }
}

impl Collector for GaugeVec {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_into(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} gauge", self.name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", self.name, render_labels(r.key()), val);
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

pub struct HistogramVec {
    name: String,
    help: String,
    /// Upper bounds in micros, for comparison on observe.
    bounds_micros: Vec<u64>,
    /// The same bounds pre-rendered in seconds, for `le` labels.
    bound_labels: Vec<String>,
    map: DashMap<Vec<(String, String)>, AtomicHistogram>,
}

impl HistogramVec {
    pub fn new(name: &str, help: &str, bounds_secs: &[f64]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            help: help.to_string(),
            bounds_micros: bounds_secs.iter().map(|b| (b * 1_000_000.0) as u64).collect(),
            bound_labels: bounds_secs.iter().map(|b| format!("{b}")).collect(),
            map: DashMap::new(),
        })
    }

    /// Observe a duration, incrementing every cumulative bucket it falls under.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicHistogram::new(self.bounds_micros.len()));
        let micros = duration.as_micros() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in self.bounds_micros.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Observation count for an exact label combination.
    pub fn sample_count(&self, labels: &[(&str, &str)]) -> Option<u64> {
        self.map.get(&label_key(labels)).map(|h| h.count.load(Ordering::Relaxed))
    }

    /// Per-bucket cumulative counts for an exact label combination.
    pub fn bucket_counts(&self, labels: &[(&str, &str)]) -> Option<Vec<u64>> {
        self.map
            .get(&label_key(labels))
            .map(|h| h.buckets.iter().map(|b| b.load(Ordering::Relaxed)).collect())
    }
}

impl Collector for HistogramVec {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_into(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} histogram", self.name);
        for r in self.map.iter() {
            let hist = r.value();
            let label_str = render_labels(r.key());
            let prefix = if label_str.is_empty() { String::new() } else { format!("{label_str},") };

            for (i, le) in self.bound_labels.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", self.name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", self.name, prefix, count);

            let sum = hist.sum_micros.load(Ordering::Relaxed) as f64 / 1e6;
            let _ = writeln!(out, "{}_sum{{{}}} {}", self.name, label_str, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", self.name, label_str, count);
        }
    }
}

/// Process-level defaults: start time and uptime.
pub struct ProcessCollector {
    started: Instant,
    start_epoch_secs: f64,
}

impl ProcessCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            start_epoch_secs: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
        })
    }
}

impl Collector for ProcessCollector {
    fn name(&self) -> &str {
        "process"
    }

    fn render_into(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP process_start_time_seconds Start time of the process since unix epoch in seconds.");
        let _ = writeln!(out, "# TYPE process_start_time_seconds gauge");
        let _ = writeln!(out, "process_start_time_seconds {}", self.start_epoch_secs);
        let _ = writeln!(out, "# HELP process_uptime_seconds Seconds since process start.");
        let _ = writeln!(out, "# TYPE process_uptime_seconds gauge");
        let _ = writeln!(out, "process_uptime_seconds {}", self.started.elapsed().as_secs_f64());
    }
}

/// Central collection point for all instruments.
///
/// Renders in registration order. The lock is held only to push or snapshot
/// the collector list; instrument mutation never touches it.
#[derive(Default)]
pub struct MetricRegistry {
    collectors: Mutex<Vec<Arc<dyn Collector>>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collector. Rejects a second collector with the same name.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let mut guard = match self.collectors.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.iter().any(|c| c.name() == collector.name()) {
            return Err(NewsGateError::Internal(format!(
                "metric {} already registered",
                collector.name()
            )));
        }
        guard.push(collector);
        Ok(())
    }

    /// Render every registered collector into exposition-format text.
    pub fn render(&self) -> String {
        let collectors: Vec<Arc<dyn Collector>> = {
            let guard = match self.collectors.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.clone()
        };

        let mut out = String::new();
        for c in &collectors {
            c.render_into(&mut out);
        }
        out
    }
}

/// The gateway's instruments, registered once at startup.
///
/// Names, labels, and buckets are pinned by existing dashboards and alerts;
/// do not rename without migrating those.
pub struct ServiceMetrics {
    pub http_requests: Arc<CounterVec>,
    pub news_api_calls: Arc<CounterVec>,
    pub news_api_latency: Arc<HistogramVec>,
    pub active_connections: Arc<GaugeVec>,
}

impl ServiceMetrics {
    pub fn register_on(registry: &MetricRegistry) -> Self {
        let http_requests = CounterVec::new("http_requests_total", "Total HTTP requests");
        let news_api_calls = CounterVec::new("news_api_calls_total", "Total NewsAPI calls");
        let news_api_latency = HistogramVec::new(
            "news_api_response_time_seconds",
            "NewsAPI response time in seconds",
            &LATENCY_BUCKETS,
        );
        let active_connections =
            GaugeVec::new("active_connections", "Active TCP connections to this backend pod");

        register_or_warn(registry, http_requests.clone());
        register_or_warn(registry, news_api_calls.clone());
        register_or_warn(registry, news_api_latency.clone());
        register_or_warn(registry, active_connections.clone());
        register_or_warn(registry, ProcessCollector::new());

        Self { http_requests, news_api_calls, news_api_latency, active_connections }
    }
}

fn register_or_warn(registry: &MetricRegistry, collector: Arc<dyn Collector>) {
    if let Err(err) = registry.register(collector) {
        tracing::warn!(%err, "duplicate metric registration ignored");
    }
}
