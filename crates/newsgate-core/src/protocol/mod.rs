//! Wire-level contracts for the HTTP surface.
//!
//! Only the operational endpoints have shapes owned by this service; the
//! `/api/news` success body is the upstream's JSON passed through verbatim.

pub mod ops;

pub use ops::{ErrorResponse, HealthResponse, ReadyResponse};
