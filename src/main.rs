//! slabpool - Stress driver
//!
//! Hammers a shared buffer pool from many threads and checks that no buffer
//! is ever handed to two holders at once.

use anyhow::{Context, Result};
use crossbeam::channel::{self, RecvTimeoutError};
use crossbeam::utils::Backoff;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use slabpool::{metrics, BufferPool, Config, VERSION};

const POOL_NAME: &str = "stress";

/// Outcome of one worker's run
#[derive(Debug, Default)]
struct WorkerReport {
    cycles: u64,
    clobbered: u64,
    rejected: u64,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    let config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };

    slabpool::util::init_tracing(&config.logging)?;

    info!(
        version = VERSION,
        config_path = ?config_path,
        "Starting slabpool stress run"
    );

    if config.pool.partition_count == 0 && config.pool.expand_by == 0 {
        anyhow::bail!("partition_count and expand_by are both 0, the pool can never serve a buffer");
    }

    if config.metrics.enabled {
        metrics::init_metrics(&config.metrics)?;
        info!(bind_addr = %config.metrics.bind_addr, "Metrics endpoint started");
    }

    let pool = BufferPool::new(config.pool.partition_size, config.pool.partition_count);
    let workers = config.stress.effective_workers();
    let interval = Duration::from_millis(config.stress.report_interval_ms.max(1));

    info!(
        partition_size = config.pool.partition_size,
        partition_count = config.pool.partition_count,
        expand_by = config.pool.expand_by,
        workers,
        iterations = config.stress.iterations,
        "Pool ready"
    );

    let started = Instant::now();
    let (done_tx, done_rx) = channel::bounded::<()>(0);

    let reports = crossbeam::thread::scope(|s| {
        let reporter_pool = pool.clone();
        s.spawn(move |_| report_progress(&reporter_pool, &done_rx, interval));

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let pool = pool.clone();
                let config = &config;
                s.spawn(move |_| run_worker(&pool, id, config))
            })
            .collect();

        let reports: Vec<WorkerReport> = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .collect();

        // Disconnect stops the reporter
        drop(done_tx);
        reports
    })
    .map_err(|_| anyhow::anyhow!("Stress worker panicked"))?;

    let stats = pool.stats();
    if config.metrics.enabled {
        metrics::publish(POOL_NAME, &stats);
    }

    let cycles: u64 = reports.iter().map(|r| r.cycles).sum();
    let clobbered: u64 = reports.iter().map(|r| r.clobbered).sum();
    let rejected: u64 = reports.iter().map(|r| r.rejected).sum();
    let elapsed = started.elapsed();

    info!(
        cycles,
        elapsed_ms = elapsed.as_millis() as u64,
        takes = stats.takes,
        misses = stats.misses,
        expansions = stats.expansions,
        available = stats.available,
        capacity = stats.capacity,
        regions = stats.regions,
        "Stress run finished"
    );

    if reports.len() != workers {
        anyhow::bail!("{} of {} workers did not finish", workers - reports.len(), workers);
    }
    if clobbered > 0 || rejected > 0 {
        error!(clobbered, rejected, "Pool handed out a buffer twice");
        anyhow::bail!("{} clobbered buffers, {} rejected puts", clobbered, rejected);
    }
    if stats.available != stats.capacity {
        warn!(
            available = stats.available,
            capacity = stats.capacity,
            "Pool not full after run"
        );
    }

    Ok(())
}

/// Take, fill, verify and return a buffer `iterations` times
fn run_worker(pool: &BufferPool, id: usize, config: &Config) -> WorkerReport {
    let mut report = WorkerReport::default();
    let backoff = Backoff::new();

    for i in 0..config.stress.iterations {
        backoff.reset();
        let mut buf = loop {
            if let Some(buf) = pool.take() {
                break buf;
            }
            if config.pool.expand_by > 0 {
                pool.expand(config.pool.expand_by);
            } else {
                backoff.snooze();
            }
        };

        let tag = (id as u8) ^ (i as u8);
        buf.fill(tag);
        std::thread::yield_now();
        if buf.iter().any(|&b| b != tag) {
            report.clobbered += 1;
        }

        if !pool.put(buf) {
            report.rejected += 1;
        }
        report.cycles += 1;
    }

    report
}

/// Log pool stats every `interval` until `done` disconnects
fn report_progress(pool: &BufferPool, done: &channel::Receiver<()>, interval: Duration) {
    loop {
        match done.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let stats = pool.stats();
                metrics::publish(POOL_NAME, &stats);
                info!(
                    takes = stats.takes,
                    misses = stats.misses,
                    in_use = stats.in_use(),
                    capacity = stats.capacity,
                    "Progress"
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
