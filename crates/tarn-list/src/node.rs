//! The fixed-size node record stored in the pool.
//!
//! A node is 28 bytes, little-endian:
//!
//! ```text
//! 0..2   value (u16)
//! 2..4   reserved, zero
//! 4..8   next.index      ─┐
//! 8..12  next.generation  │ encoded BlockHandle of the next node;
//! 12..16 next.offset      │ index == NIL_INDEX means "no next"
//! 16..20 next.len         │
//! 20..28 next.pool_id    ─┘
//! ```
//!
//! The link is a full raw handle, not just an offset: the pool's stamp and
//! generation checks then protect traversal from following a link into a
//! block that has since been freed or reused, or into another pool.

use tarn_pool::handle::NIL_INDEX;
use tarn_pool::BlockHandle;

/// Size of one node record in bytes, before allocator alignment.
pub const NODE_BYTES: usize = 28;

/// Decoded contents of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeRecord {
    /// Stored value.
    pub value: u16,
    /// Handle of the next node, or `None` at the tail.
    pub next: Option<BlockHandle>,
}

impl NodeRecord {
    pub(crate) fn encode(&self) -> [u8; NODE_BYTES] {
        let mut bytes = [0u8; NODE_BYTES];
        bytes[0..2].copy_from_slice(&self.value.to_le_bytes());
        let (pool_id, index, generation, offset, len) = match self.next {
            Some(handle) => handle.into_raw_parts(),
            None => (0, NIL_INDEX, 0, 0, 0),
        };
        bytes[4..8].copy_from_slice(&index.to_le_bytes());
        bytes[8..12].copy_from_slice(&generation.to_le_bytes());
        bytes[12..16].copy_from_slice(&offset.to_le_bytes());
        bytes[16..20].copy_from_slice(&len.to_le_bytes());
        bytes[20..28].copy_from_slice(&pool_id.to_le_bytes());
        bytes
    }

    pub(crate) fn decode(bytes: &[u8; NODE_BYTES]) -> Self {
        let le_u32 = |range: std::ops::Range<usize>| {
            let mut quad = [0u8; 4];
            quad.copy_from_slice(&bytes[range]);
            u32::from_le_bytes(quad)
        };
        let value = u16::from_le_bytes([bytes[0], bytes[1]]);
        let index = le_u32(4..8);
        let next = (index != NIL_INDEX).then(|| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[20..28]);
            BlockHandle::from_raw_parts(
                u64::from_le_bytes(word),
                index,
                le_u32(8..12),
                le_u32(12..16),
                le_u32(16..20),
            )
        });
        Self { value, next }
    }
}
