//! Partition allocator
//!
//! Allocates one contiguous backing region and carves it into equally sized,
//! non-overlapping views. Every view shares the region's allocation; nothing
//! is copied. The allocation is reference counted and is released once the
//! region handle and every partition carved from it have been dropped.

use bytes::BytesMut;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REGION_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier of a backing region, unique within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

impl RegionId {
    fn next() -> Self {
        Self(NEXT_REGION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Handle to a backing region
///
/// Holds an empty view at the end of the region, which keeps the whole
/// allocation alive for as long as the handle exists. Offsets are fixed when
/// the region is carved and never recomputed.
#[derive(Debug)]
pub struct Region {
    id: RegionId,
    base: usize,
    len: usize,
    partition_size: usize,
    partition_count: usize,
    _pin: BytesMut,
}

impl Region {
    /// Region id
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Length of the region in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the region has no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of each partition
    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    /// Number of partitions carved from this region
    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    /// Offset of `view` inside this region, if the whole view lies within it
    ///
    /// The view must start on a byte of the region, so an empty view at the
    /// end of the region is not inside it.
    pub fn offset_of(&self, view: &[u8]) -> Option<usize> {
        let start = view.as_ptr() as usize;
        let offset = start.checked_sub(self.base)?;
        if offset >= self.len || view.len() > self.len - offset {
            return None;
        }
        Some(offset)
    }

    /// Check if `view` lies within this region
    pub fn contains(&self, view: &[u8]) -> bool {
        self.offset_of(view).is_some()
    }

    /// Rejoin a full, ordered set of untouched partitions into one view of
    /// the region
    ///
    /// No bytes are copied: the returned buffer starts at the region's base
    /// address. Returns `None` if any partition is missing, out of order,
    /// resized or foreign.
    pub fn reassemble(&self, parts: Vec<BytesMut>) -> Option<BytesMut> {
        if parts.len() != self.partition_count {
            return None;
        }

        for (i, part) in parts.iter().enumerate() {
            if part.len() != self.partition_size
                || part.capacity() != self.partition_size
                || part.as_ptr() as usize != self.base + i * self.partition_size
            {
                return None;
            }
        }

        let mut whole = BytesMut::new();
        for part in parts {
            whole.unsplit(part);
        }
        Some(whole)
    }
}

/// Allocate a zeroed region of `partition_size * partition_count` bytes and
/// carve it into `partition_count` partitions
///
/// A zero size or count is legal and yields zero-length partitions or none
/// at all.
///
/// # Panics
///
/// Panics if the region length overflows `usize`, like `Vec` does on
/// capacity overflow.
pub fn create(partition_size: usize, partition_count: usize) -> (Vec<BytesMut>, Region) {
    let len = partition_size
        .checked_mul(partition_count)
        .expect("region length overflows usize");

    split(BytesMut::zeroed(len), partition_size, partition_count)
}

/// Carve an existing backing buffer into `partition_size` views
///
/// Bytes already written to `backing` are visible through the partitions at
/// the same offsets. A trailing remainder shorter than `partition_size` is
/// kept pinned in the region but never handed out. A zero `partition_size`
/// yields no partitions.
pub fn carve(backing: BytesMut, partition_size: usize) -> (Vec<BytesMut>, Region) {
    let count = if partition_size == 0 {
        0
    } else {
        backing.len() / partition_size
    };
    split(backing, partition_size, count)
}

fn split(mut backing: BytesMut, partition_size: usize, count: usize) -> (Vec<BytesMut>, Region) {
    let base = backing.as_ptr() as usize;
    let mut partitions = Vec::with_capacity(count);
    for _ in 0..count {
        partitions.push(backing.split_to(partition_size));
    }

    let region = Region {
        id: RegionId::next(),
        base,
        len: count * partition_size,
        partition_size,
        partition_count: count,
        _pin: backing,
    };

    (partitions, region)
}
