//! newsgate gateway library entry.
//!
//! This crate wires the config, metrics registry, connection tracking,
//! readiness checking, and the instrumented upstream client into a cohesive
//! proxy service. It is intended to be consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod readiness;
pub mod router;
pub mod transport;
pub mod upstream;
