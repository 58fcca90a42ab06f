//! Fixed-size buffer pool
//!
//! Partitions carved from contiguous regions, handed out with `take` and
//! returned with `put`. Bookkeeping sits behind one short-lived lock; an empty
//! pool answers immediately instead of waiting for a return.

use bytes::BytesMut;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

use super::partition::{self, Region};
use super::sync::{Arc, Mutex};
use crate::metrics::{PoolCounters, PoolStats};

/// Mutable pool state, guarded by the pool lock
struct PoolState {
    /// Partitions not checked out
    available: Vec<BytesMut>,
    /// Partitions ever admitted
    capacity: usize,
    /// Keeps every backing region alive for the pool's lifetime
    regions: Vec<Region>,
}

/// Inner pool state (shared across clones)
struct BufferPoolInner {
    partition_size: usize,
    state: Mutex<PoolState>,
    counters: PoolCounters,
}

/// Pool of equally sized buffers carved from contiguous regions
///
/// Clones share the same pool. Separately constructed pools are fully
/// independent.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<BufferPoolInner>,
}

impl BufferPool {
    /// Create a pool holding `partition_count` buffers of `partition_size`
    /// bytes, all carved from a single allocation
    ///
    /// A zero size or count is accepted and yields a degenerate pool.
    pub fn new(partition_size: usize, partition_count: usize) -> Self {
        let (partitions, region) = partition::create(partition_size, partition_count);

        debug!(
            partition_size,
            count = partition_count,
            region = region.id().get(),
            "Buffer pool created"
        );

        let state = PoolState {
            available: partitions,
            capacity: partition_count,
            regions: vec![region],
        };

        Self {
            inner: Arc::new(BufferPoolInner {
                partition_size,
                state: Mutex::new(state),
                counters: PoolCounters::new(),
            }),
        }
    }

    /// Length of every buffer this pool serves
    pub fn partition_size(&self) -> usize {
        self.inner.partition_size
    }

    /// Take a buffer out of the pool
    /// Returns None if the pool is empty; never waits for a buffer to be put back
    pub fn take(&self) -> Option<BytesMut> {
        let taken = self.inner.state.lock().available.pop();

        match taken {
            Some(_) => self.inner.counters.take(),
            None => {
                self.inner.counters.miss();
                trace!("Buffer pool empty");
            }
        }
        taken
    }

    /// Take a buffer wrapped in a guard that puts it back on drop
    pub fn lease(&self) -> Option<Lease> {
        self.take().map(|buf| Lease {
            buf: Some(buf),
            pool: self.clone(),
        })
    }

    /// Return a buffer to the pool
    ///
    /// Rejects buffers whose length differs from the partition size, and any
    /// buffer once the pool already holds its full capacity. A rejected buffer
    /// is dropped. The pool does not check where the buffer came from.
    pub fn put(&self, buf: BytesMut) -> bool {
        if buf.len() != self.inner.partition_size {
            self.inner.counters.reject_size();
            trace!(
                len = buf.len(),
                partition_size = self.inner.partition_size,
                "Rejected buffer of wrong size"
            );
            return false;
        }

        {
            let mut state = self.inner.state.lock();
            if state.available.len() >= state.capacity {
                drop(state);
                self.inner.counters.reject_full();
                trace!("Rejected buffer, pool is full");
                return false;
            }
            state.available.push(buf);
        }

        self.inner.counters.put();
        true
    }

    /// Grow the pool by `count` buffers carved from a fresh region
    ///
    /// Existing buffers, checked out or available, are untouched.
    pub fn expand(&self, count: usize) {
        if count == 0 {
            return;
        }

        // Allocate before taking the lock
        let (partitions, region) = partition::create(self.inner.partition_size, count);
        let region_id = region.id();

        let capacity = {
            let mut state = self.inner.state.lock();
            // Reserve up to capacity so put never reallocates under the lock
            let needed = (state.capacity + count).saturating_sub(state.available.len());
            state.available.reserve(needed);
            state.available.extend(partitions);
            state.capacity += count;
            state.regions.push(region);
            state.capacity
        };

        self.inner.counters.expansion();
        debug!(
            count,
            capacity,
            region = region_id.get(),
            "Buffer pool expanded"
        );
    }

    /// Number of buffers currently available
    pub fn len(&self) -> usize {
        self.inner.state.lock().available.len()
    }

    /// Check if no buffer is available
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total buffers ever admitted, through construction and expansion
    pub fn capacity(&self) -> usize {
        self.inner.state.lock().capacity
    }

    /// Check if every admitted buffer is back in the pool
    pub fn is_full(&self) -> bool {
        let state = self.inner.state.lock();
        state.available.len() >= state.capacity
    }

    /// Number of backing regions owned by the pool
    pub fn region_count(&self) -> usize {
        self.inner.state.lock().regions.len()
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let mut stats = self.inner.counters.snapshot();
        let state = self.inner.state.lock();
        stats.available = state.available.len();
        stats.capacity = state.capacity;
        stats.regions = state.regions.len();
        stats
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("BufferPool")
            .field("partition_size", &self.inner.partition_size)
            .field("available", &state.available.len())
            .field("capacity", &state.capacity)
            .field("regions", &state.regions.len())
            .finish()
    }
}

/// A buffer taken from the pool that goes back on drop
pub struct Lease {
    buf: Option<BytesMut>,
    pool: BufferPool,
}

impl Lease {
    /// Keep the buffer; it will not be returned to the pool
    pub fn detach(mut self) -> BytesMut {
        self.buf.take().unwrap_or_default()
    }
}

impl Deref for Lease {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_deref_mut().unwrap_or_default()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.put(buf);
        }
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").field("len", &self.len()).finish()
    }
}
