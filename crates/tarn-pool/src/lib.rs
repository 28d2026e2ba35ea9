//! Fixed-arena pool allocation for Tarn.
//!
//! Provides a single-arena allocator that owns one contiguous byte pool and
//! serves allocation, resizing, and release requests against it without ever
//! touching the global allocator after construction. Block metadata lives in
//! a separate, fixed-capacity descriptor slab, so a client overrunning its
//! payload can corrupt neighbouring payload bytes but never the allocator's
//! bookkeeping.
//!
//! # Architecture
//!
//! ```text
//! Pool (locked facade)
//! └── Mutex<PoolState>
//!     ├── FreeList (unlocked core)
//!     │   ├── Vec<u8>        — the data pool, one contiguous arena
//!     │   └── Vec<BlockDesc> — descriptor slab, chained in address order
//!     └── OpCounters — observable rejection/failure counts
//! ```
//!
//! All descriptors — free and allocated — stay on one singly linked chain in
//! address order, so the partition of the arena is structural: walking the
//! chain visits every byte of the pool exactly once. `alloc` splits a free
//! block when the remainder is worth keeping; `free` eagerly merges with both
//! physical neighbours.
//!
//! # Handles
//!
//! Clients hold [`BlockHandle`]s, not pointers. A handle encodes the slab
//! index, a generation counter, and the payload location; every operation
//! validates the generation, so stale, double-freed, forged, or cross-pool
//! handles are rejected as observable no-ops instead of corrupting memory.
//!
//! # Safety
//!
//! All storage is `Vec`-backed with zero-init on allocation. No `unsafe`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod config;
pub mod error;
mod freelist;
pub mod handle;
pub mod pool;
pub mod stats;

// Public re-exports for the primary API surface.
pub use block::BlockSpan;
pub use config::{FitPolicy, PoolConfig};
pub use error::PoolError;
pub use handle::BlockHandle;
pub use pool::Pool;
pub use stats::PoolStats;
