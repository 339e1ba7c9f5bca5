//! Lightweight in-process metrics (dependency-free).
//!
//! Exposes Prometheus-compatible metrics without pulling in an exporter
//! crate. Instruments are stored as atomics and rendered by the `/metrics`
//! handler.

pub mod metrics;
