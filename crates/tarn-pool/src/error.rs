//! Pool-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during pool operations.
///
/// Allocation pressure is deliberately *not* an error: `alloc` and `resize`
/// return `None` when no free block is large enough, which is a normal
/// outcome the caller must check. Errors are reserved for construction
/// problems and for payload access through an invalid handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The configuration is unusable (zero capacity, and similar).
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
    /// The requested capacity exceeds what the pool supports.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Largest supported capacity in bytes.
        capacity: usize,
    },
    /// A handle that no longer (or never did) name a live allocation in
    /// this pool: freed, double-freed, forged, or from another pool.
    StaleHandle {
        /// Slab index encoded in the handle.
        index: u32,
        /// Generation encoded in the handle.
        generation: u32,
    },
    /// A payload access that runs past the end of its block.
    OutOfBounds {
        /// Offset within the block where the access started.
        offset: usize,
        /// Length of the access in bytes.
        len: usize,
        /// Usable size of the block in bytes.
        block_len: usize,
    },
    /// The pool has been closed; no further operations are possible.
    Closed,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => {
                write!(f, "invalid pool config: {reason}")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "pool capacity exceeded: requested {requested} bytes, maximum {capacity} bytes"
                )
            }
            Self::StaleHandle { index, generation } => {
                write!(f, "stale handle: slot {index}, generation {generation}")
            }
            Self::OutOfBounds {
                offset,
                len,
                block_len,
            } => {
                write!(
                    f,
                    "access out of bounds: {len} bytes at offset {offset} in a {block_len}-byte block"
                )
            }
            Self::Closed => write!(f, "pool is closed"),
        }
    }
}

impl Error for PoolError {}
