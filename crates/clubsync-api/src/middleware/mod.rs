//! # Middleware
//!
//! Request metrics, per-client rate limiting and HTTP tracing.

pub mod metrics;
pub mod rate_limit;
pub mod tracing_layer;
