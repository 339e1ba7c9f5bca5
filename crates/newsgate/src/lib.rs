//! Top-level facade crate for newsgate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use newsgate_core::*;
}

pub mod gateway {
    pub use newsgate_gateway::*;
}
