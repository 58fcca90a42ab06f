//! Metrics and observability
//!
//! Per-pool atomic counters plus a Prometheus-compatible publisher.

mod counters;
mod exporter;

pub use counters::{PoolCounters, PoolStats};
pub use exporter::{describe, init_metrics, publish};
