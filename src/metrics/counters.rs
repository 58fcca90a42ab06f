//! Atomic counters for pool activity
//!
//! Owned by each pool instance and updated outside the pool lock, so they can
//! be bumped from any thread without contention on bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-pool activity counters
#[derive(Debug, Default)]
pub struct PoolCounters {
    takes: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    rejected_size: AtomicU64,
    rejected_full: AtomicU64,
    expansions: AtomicU64,
}

impl PoolCounters {
    pub const fn new() -> Self {
        Self {
            takes: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            rejected_size: AtomicU64::new(0),
            rejected_full: AtomicU64::new(0),
            expansions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn take(&self) {
        self.takes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reject_size(&self) {
        self.rejected_size.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reject_full(&self) {
        self.rejected_full.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn expansion(&self) {
        self.expansions.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters. Pool gauges are filled in by the caller.
    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            takes: self.takes.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            rejected_size: self.rejected_size.load(Ordering::Relaxed),
            rejected_full: self.rejected_full.load(Ordering::Relaxed),
            expansions: self.expansions.load(Ordering::Relaxed),
            ..PoolStats::default()
        }
    }
}

/// Snapshot of pool activity for reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub takes: u64,
    pub misses: u64,
    pub puts: u64,
    pub rejected_size: u64,
    pub rejected_full: u64,
    pub expansions: u64,
    /// Partitions currently available
    pub available: usize,
    /// Partitions ever admitted
    pub capacity: usize,
    /// Backing regions owned by the pool
    pub regions: usize,
}

impl PoolStats {
    /// Partitions currently checked out
    pub fn in_use(&self) -> usize {
        self.capacity - self.available
    }

    /// Total rejected puts
    pub fn rejected(&self) -> u64 {
        self.rejected_size + self.rejected_full
    }
}
