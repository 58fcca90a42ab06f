//! Buffer pool
//!
//! Fixed-size buffers carved from contiguous regions and recycled through a
//! shared, non-blocking pool.

mod buffer;
pub mod partition;
mod sync;

pub use buffer::{BufferPool, Lease};
pub use partition::{Region, RegionId};
