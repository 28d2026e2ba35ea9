//! Block handles.
//!
//! A [`BlockHandle`] names one live allocation in a pool. It replaces the
//! raw payload pointer a C-style allocator would return: instead of an
//! address that must be cast back to a header, the handle carries the
//! stamp of the issuing pool, the slab index of its descriptor, and a
//! generation counter, so the pool can validate it in O(1) and reject
//! anything stale or foreign.

use std::fmt;

/// Sentinel index meaning "no block" in encoded handles.
pub const NIL_INDEX: u32 = u32::MAX;

/// A validated reference to one allocated block in a [`Pool`](crate::Pool).
///
/// Handles are `Copy` and cheap to pass around. They stay valid until the
/// matching `free` (or a growing `resize`), after which the pool's
/// generation check rejects them. Every handle also carries the stamp of
/// the pool that issued it; a pool rejects any handle stamped by another
/// pool, even when two pools with identical allocation histories hand out
/// handles with identical geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct BlockHandle {
    /// Stamp of the issuing pool.
    pub(crate) pool_id: u64,
    /// Descriptor slab index.
    pub(crate) index: u32,
    /// Slab slot generation at allocation time.
    pub(crate) generation: u32,
    /// Payload offset within the data pool, in bytes.
    pub(crate) offset: u32,
    /// Usable payload size in bytes. May exceed the requested size when the
    /// excess was below the split threshold.
    pub(crate) len: u32,
}

impl BlockHandle {
    /// Create a new handle.
    pub(crate) fn new(pool_id: u64, index: u32, generation: u32, offset: u32, len: u32) -> Self {
        Self {
            pool_id,
            index,
            generation,
            offset,
            len,
        }
    }

    /// Stamp of the pool that issued this handle.
    pub fn pool_id(&self) -> u64 {
        self.pool_id
    }

    /// Descriptor slab index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation this handle was issued under.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Payload offset within the data pool, in bytes.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Usable payload size in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether this handle names a zero-sized payload. Never true for a
    /// handle issued by a pool (zero-size requests are rejected).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reassemble a handle from its raw parts.
    ///
    /// Intended for data structures that persist handles *inside* pool
    /// payload bytes (e.g. a linked list storing its `next` reference in
    /// the node record). A handle rebuilt from corrupted or made-up parts
    /// is safe to present to the pool: the stamp and generation checks
    /// reject it.
    pub fn from_raw_parts(pool_id: u64, index: u32, generation: u32, offset: u32, len: u32) -> Self {
        Self::new(pool_id, index, generation, offset, len)
    }

    /// Decompose the handle into `(pool_id, index, generation, offset, len)`.
    pub fn into_raw_parts(self) -> (u64, u32, u32, u32, u32) {
        (self.pool_id, self.index, self.generation, self.offset, self.len)
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockHandle(pool={}, slot={}, gen={}, off={}, len={})",
            self.pool_id, self.index, self.generation, self.offset, self.len
        )
    }
}
