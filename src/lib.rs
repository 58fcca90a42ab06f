//! slabpool - fixed-size buffer recycling pool
//!
//! Pre-allocates equally sized byte buffers as partitions of one contiguous
//! region and recycles them through a thread-safe pool whose take and put
//! never wait on availability.

pub mod config;
pub mod metrics;
pub mod pool;
pub mod util;

pub use config::Config;
pub use metrics::PoolStats;
pub use pool::{BufferPool, Lease};

/// Crate version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
