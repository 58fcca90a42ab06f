//! Prometheus metrics exporter
//!
//! Pool snapshots are pushed to the `metrics` facade with a `pool` label;
//! the Prometheus exporter serves them over HTTP when enabled.

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use super::counters::PoolStats;
use crate::config::MetricsConfig;

/// Initialize the Prometheus metrics exporter
pub fn init_metrics(config: &MetricsConfig) -> Result<()> {
    describe();

    // Spawns its own runtime thread when called outside tokio
    PrometheusBuilder::new()
        .with_http_listener(config.bind_addr)
        .install()?;

    Ok(())
}

/// Register metric descriptions
pub fn describe() {
    describe_counter!("slabpool_takes_total", "Successful takes");
    describe_counter!("slabpool_misses_total", "Takes that found the pool empty");
    describe_counter!("slabpool_puts_total", "Buffers admitted back into the pool");
    describe_counter!("slabpool_rejected_size_total", "Puts rejected for wrong length");
    describe_counter!("slabpool_rejected_full_total", "Puts rejected by a full pool");
    describe_counter!("slabpool_expansions_total", "Expansion calls");
    describe_gauge!("slabpool_available", "Partitions currently available");
    describe_gauge!("slabpool_capacity", "Partitions ever admitted");
    describe_gauge!("slabpool_regions", "Backing regions owned");
}

/// Publish a pool snapshot under the given pool name
pub fn publish(pool: &str, stats: &PoolStats) {
    let label = pool.to_string();

    counter!("slabpool_takes_total", "pool" => label.clone()).absolute(stats.takes);
    counter!("slabpool_misses_total", "pool" => label.clone()).absolute(stats.misses);
    counter!("slabpool_puts_total", "pool" => label.clone()).absolute(stats.puts);
    counter!("slabpool_rejected_size_total", "pool" => label.clone())
        .absolute(stats.rejected_size);
    counter!("slabpool_rejected_full_total", "pool" => label.clone())
        .absolute(stats.rejected_full);
    counter!("slabpool_expansions_total", "pool" => label.clone()).absolute(stats.expansions);

    gauge!("slabpool_available", "pool" => label.clone()).set(stats.available as f64);
    gauge!("slabpool_capacity", "pool" => label.clone()).set(stats.capacity as f64);
    gauge!("slabpool_regions", "pool" => label).set(stats.regions as f64);
}
