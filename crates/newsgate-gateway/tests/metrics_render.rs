//! Instrument and registry rendering.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use newsgate_gateway::obs::metrics::{
    Collector, CounterVec, GaugeVec, HistogramVec, MetricRegistry, ServiceMetrics,
    LATENCY_BUCKETS,
};

#[test]
fn counter_renders_help_type_and_sorted_labels() {
    let c = CounterVec::new("http_requests_total", "Total HTTP requests");
    c.inc(&[("path", "/health"), ("method", "GET"), ("status", "200"), ("color", "blue")]);
    c.inc(&[("path", "/health"), ("method", "GET"), ("status", "200"), ("color", "blue")]);

    let mut out = String::new();
    c.render_into(&mut out);

    assert!(out.contains("# HELP http_requests_total Total HTTP requests\n"));
    assert!(out.contains("# TYPE http_requests_total counter\n"));
    // label keys are sorted on insert, so the line is deterministic
    assert!(out.contains(
        "http_requests_total{color=\"blue\",method=\"GET\",path=\"/health\",status=\"200\"} 2\n"
    ));
}

#[test]
fn label_values_escaped() {
    let c = CounterVec::new("x_total", "x");
    c.inc(&[("status", "a\"b\\c\nd")]);

    let mut out = String::new();
    c.render_into(&mut out);

    assert!(out.contains(r#"x_total{status="a\"b\\c\nd"} 1"#));
}

#[test]
fn gauge_set_overwrites() {
    let g = GaugeVec::new("active_connections", "Active TCP connections");
    g.set(&[("color", "blue")], 3);
    g.set(&[("color", "blue")], 1);
    assert_eq!(g.get(&[("color", "blue")]), Some(1));

    let mut out = String::new();
    g.render_into(&mut out);
    assert!(out.contains("active_connections{color=\"blue\"} 1\n"));
}

#[test]
fn histogram_buckets_are_cumulative() {
    let h = HistogramVec::new("news_api_response_time_seconds", "latency", &LATENCY_BUCKETS);
    let labels = [("status", "success"), ("country", "us"), ("color", "blue")];

    // 70ms: above the 0.05 bound, inside every bound from 0.1 up
    h.observe(&labels, Duration::from_millis(70));

    let buckets = h.bucket_counts(&labels).expect("series exists");
    assert_eq!(buckets, vec![0, 1, 1, 1, 1, 1, 1]);
    assert_eq!(h.sample_count(&labels), Some(1));

    let mut out = String::new();
    h.render_into(&mut out);

    // le labels are rendered in seconds
    assert!(out.contains("le=\"0.05\"} 0"));
    assert!(out.contains("le=\"0.1\"} 1"));
    assert!(out.contains("le=\"5\"} 1"));
    assert!(out.contains("le=\"+Inf\"} 1"));
    assert!(out.contains("news_api_response_time_seconds_count{color=\"blue\",country=\"us\",status=\"success\"} 1"));
    // sum is 0.07 seconds, stored at microsecond precision
    assert!(out.contains("news_api_response_time_seconds_sum{color=\"blue\",country=\"us\",status=\"success\"} 0.07"));
}

#[test]
fn duplicate_registration_rejected() {
    let registry = MetricRegistry::new();
    registry.register(CounterVec::new("a_total", "a")).expect("first registration");
    let err = registry.register(CounterVec::new("a_total", "again")).expect_err("duplicate");
    assert_eq!(err.client_code().as_str(), "internal");
}

#[test]
fn registry_renders_in_registration_order() {
    let registry = MetricRegistry::new();
    registry.register(CounterVec::new("first_total", "first")).unwrap();
    registry.register(CounterVec::new("second_total", "second")).unwrap();

    let out = registry.render();
    let first = out.find("# TYPE first_total").unwrap();
    let second = out.find("# TYPE second_total").unwrap();
    assert!(first < second);
}

#[test]
fn service_metrics_families_always_present() {
    let registry = MetricRegistry::new();
    let _metrics = ServiceMetrics::register_on(&registry);

    let out = registry.render();
    for family in [
        "http_requests_total",
        "news_api_calls_total",
        "news_api_response_time_seconds",
        "active_connections",
        "process_uptime_seconds",
        "process_start_time_seconds",
    ] {
        assert!(out.contains(&format!("# TYPE {family}")), "missing family {family}");
    }
}
