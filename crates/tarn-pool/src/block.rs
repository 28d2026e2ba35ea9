//! Block descriptors and the descriptor slab's value types.
//!
//! A [`BlockDesc`] describes one contiguous region of the data pool. All
//! descriptors — free and allocated — live in a separate slab and are
//! chained by slab index in address order, so the chain itself is the
//! partition of the arena: `desc.offset + desc.size == next.offset` for
//! every link, the first descriptor starts at offset 0, and the last ends
//! at the pool capacity.

use std::fmt;

/// Sentinel slab index terminating the address-ordered chain.
pub(crate) const NIL: u32 = u32::MAX;

/// Lifecycle state of a descriptor slab slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlockState {
    /// Describes a region that is available for allocation.
    Free,
    /// Describes a region currently owned by a client.
    Allocated,
    /// The slot describes no region; it was absorbed by a coalesce and is
    /// available for reuse by a future split.
    Vacant,
}

/// Descriptor for one region of the data pool.
///
/// Plain value type; all linkage is by slab index, never by reference, so
/// the slab can live in a single `Vec` with no self-borrow knots.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BlockDesc {
    /// Payload offset within the data pool, in bytes.
    pub offset: u32,
    /// Usable payload size in bytes.
    pub size: u32,
    /// Slot state.
    pub state: BlockState,
    /// Slab index of the next descriptor in address order, or [`NIL`].
    pub next: u32,
    /// Bumped whenever the slot leaves `Allocated` or is vacated/reused.
    /// Handles carry the generation they were issued under; a mismatch
    /// means the handle is stale.
    pub generation: u32,
}

impl BlockDesc {
    /// One byte past the end of this block's payload.
    pub fn end(&self) -> u32 {
        self.offset + self.size
    }
}

/// One entry of a pool layout snapshot: an address-ordered `(offset, len,
/// free)` span. Diagnostic view only — spans carry no generation and cannot
/// be turned back into handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSpan {
    /// Payload offset within the data pool, in bytes.
    pub offset: u32,
    /// Span length in bytes.
    pub len: u32,
    /// Whether the span is free.
    pub free: bool,
}

impl fmt::Display for BlockSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.free { "free" } else { "used" };
        write!(f, "[{}..{}) {}", self.offset, self.offset + self.len, tag)
    }
}
