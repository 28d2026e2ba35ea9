//! The unlocked allocator core: data pool, descriptor slab, and free-list
//! maintenance.
//!
//! [`FreeList`] owns the arena bytes and the descriptor chain and implements
//! search, split, eager coalesce, and resize composition. It takes `&mut
//! self` and performs no locking — the [`Pool`](crate::Pool) facade holds
//! the mutex and calls in here, so composite operations (`resize` calling
//! alloc and free) never re-enter a lock they already hold.
//!
//! # Chain invariants
//!
//! Walking from `head` by `next` visits every region of the pool exactly
//! once in strictly increasing address order: the first descriptor starts
//! at offset 0, each descriptor ends where its successor begins, and the
//! last ends at the pool capacity. `Vacant` slab slots are never on the
//! chain. After any completed operation, no two chain-adjacent descriptors
//! are both `Free`.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::block::{BlockDesc, BlockSpan, BlockState, NIL};
use crate::config::{FitPolicy, PoolConfig};
use crate::error::PoolError;
use crate::handle::BlockHandle;

/// Process-wide pool id source. Every core gets a distinct stamp, carried
/// in each handle it issues, so a handle can never resolve against a pool
/// that did not issue it — even when two pools with identical allocation
/// histories produce handles with identical geometry.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of a resize through the core.
///
/// The facade folds this into `Option<BlockHandle>` for callers; the
/// distinct variants exist so rejections and failures can be counted
/// separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResizeOutcome {
    /// The payload moved to a new, larger block; the old handle is dead.
    Moved(BlockHandle),
    /// The current block already satisfies the request; same handle.
    Unchanged(BlockHandle),
    /// `new_size == 0`: the block was freed.
    Freed,
    /// No free block large enough; the original block is untouched.
    NoSpace,
    /// The handle is stale or foreign; nothing happened.
    Invalid,
}

/// The allocator core: one contiguous data pool partitioned by an
/// address-ordered descriptor chain.
pub(crate) struct FreeList {
    /// Stamp carried by every handle this core issues.
    id: u64,
    /// Arena bytes. Allocated once at construction, never grown.
    pool: Vec<u8>,
    /// Descriptor slab. Capacity reserved up front for the worst case of
    /// one descriptor per minimum-size block.
    blocks: Vec<BlockDesc>,
    /// Slab slots vacated by coalescing, available for reuse by splits.
    vacant: Vec<u32>,
    /// Slab index of the descriptor at offset 0.
    head: u32,
    /// Pool capacity in bytes (aligned).
    capacity: u32,
    /// Upper bound on live descriptors: `capacity / ALIGN`.
    max_blocks: usize,
    /// Free-block search policy.
    policy: FitPolicy,
    /// Bytes currently inside `Allocated` blocks.
    used_bytes: u32,
}

impl FreeList {
    /// Build a core with a single free block spanning the whole pool.
    pub(crate) fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        if config.capacity == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "capacity must be non-zero".to_string(),
            });
        }
        if config.capacity > PoolConfig::MAX_CAPACITY {
            return Err(PoolError::CapacityExceeded {
                requested: config.capacity,
                capacity: PoolConfig::MAX_CAPACITY,
            });
        }
        let capacity = config.aligned_capacity();
        let max_blocks = capacity / PoolConfig::ALIGN;
        let mut blocks = Vec::with_capacity(max_blocks);
        blocks.push(BlockDesc {
            offset: 0,
            size: capacity as u32,
            state: BlockState::Free,
            next: NIL,
            generation: 0,
        });
        Ok(Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            pool: vec![0u8; capacity],
            blocks,
            vacant: Vec::new(),
            head: 0,
            capacity: capacity as u32,
            max_blocks,
            policy: config.policy,
            used_bytes: 0,
        })
    }

    // ── Allocation ────────────────────────────────────────────────────

    /// Allocate `size` bytes. Returns `None` for a zero-size request or
    /// when no free block is large enough.
    pub(crate) fn alloc(&mut self, size: usize) -> Option<BlockHandle> {
        let need = self.aligned_request(size)?;
        let chosen = self.find_fit(need)?;
        Some(self.take(chosen, need))
    }

    /// Round a request up to the allocation granularity, rejecting zero and
    /// anything that cannot possibly fit.
    fn aligned_request(&self, size: usize) -> Option<u32> {
        if size == 0 {
            return None;
        }
        let need = size.checked_add(PoolConfig::ALIGN - 1)? / PoolConfig::ALIGN * PoolConfig::ALIGN;
        if need > self.capacity as usize {
            return None;
        }
        Some(need as u32)
    }

    /// Scan the chain for a free block of at least `need` bytes.
    fn find_fit(&self, need: u32) -> Option<u32> {
        let mut best: Option<u32> = None;
        let mut cur = self.head;
        while cur != NIL {
            let desc = &self.blocks[cur as usize];
            if desc.state == BlockState::Free && desc.size >= need {
                match self.policy {
                    FitPolicy::FirstFit => return Some(cur),
                    FitPolicy::BestFit => {
                        if best.is_none_or(|b| desc.size < self.blocks[b as usize].size) {
                            best = Some(cur);
                        }
                    }
                }
            }
            cur = desc.next;
        }
        best
    }

    /// Split `slot` if the excess is worth keeping, mark it allocated,
    /// zero the payload, and issue a handle.
    fn take(&mut self, slot: u32, need: u32) -> BlockHandle {
        debug_assert_eq!(self.blocks[slot as usize].state, BlockState::Free);
        let excess = self.blocks[slot as usize].size - need;
        if excess >= PoolConfig::ALIGN as u32 {
            // Tail becomes a new free block immediately after in address
            // order. If the slab is somehow out of slots (unreachable with
            // the capacity/ALIGN reservation), the block is handed out
            // whole instead.
            if let Some(tail) = self.claim_slot() {
                let head_desc = self.blocks[slot as usize];
                let tail_desc = &mut self.blocks[tail as usize];
                tail_desc.offset = head_desc.offset + need;
                tail_desc.size = excess;
                tail_desc.state = BlockState::Free;
                tail_desc.next = head_desc.next;
                let desc = &mut self.blocks[slot as usize];
                desc.size = need;
                desc.next = tail;
            }
        }
        let desc = &mut self.blocks[slot as usize];
        desc.state = BlockState::Allocated;
        let (offset, len, generation) = (desc.offset, desc.size, desc.generation);
        self.used_bytes += len;
        self.pool[offset as usize..(offset + len) as usize].fill(0);
        BlockHandle::new(self.id, slot, generation, offset, len)
    }

    /// Obtain a slab slot for a split: reuse a vacated one, or extend the
    /// slab if the reservation still has room.
    fn claim_slot(&mut self) -> Option<u32> {
        if let Some(slot) = self.vacant.pop() {
            return Some(slot);
        }
        if self.blocks.len() < self.max_blocks {
            self.blocks.push(BlockDesc {
                offset: 0,
                size: 0,
                state: BlockState::Vacant,
                next: NIL,
                generation: 0,
            });
            return Some((self.blocks.len() - 1) as u32);
        }
        None
    }

    // ── Release ───────────────────────────────────────────────────────

    /// Release the block named by `handle`. Returns `false` (and changes
    /// nothing) when the handle is stale, double-freed, or foreign.
    pub(crate) fn free(&mut self, handle: BlockHandle) -> bool {
        let Some(slot) = self.resolve(handle) else {
            return false;
        };
        {
            let desc = &mut self.blocks[slot as usize];
            desc.state = BlockState::Free;
            desc.generation = desc.generation.wrapping_add(1);
            self.used_bytes -= desc.size;
        }
        // Eager coalesce: absorb the physically following block, then let a
        // free predecessor absorb the result. Chain adjacency is physical
        // adjacency because the chain partitions the pool.
        self.merge_with_next(slot);
        if let Some(prev) = self.prev_of(slot) {
            if self.blocks[prev as usize].state == BlockState::Free {
                self.merge_with_next(prev);
            }
        }
        true
    }

    /// Merge `slot` with its chain successor when both are free.
    fn merge_with_next(&mut self, slot: u32) {
        debug_assert_eq!(self.blocks[slot as usize].state, BlockState::Free);
        let next = self.blocks[slot as usize].next;
        if next == NIL {
            return;
        }
        let succ = self.blocks[next as usize];
        if succ.state != BlockState::Free {
            return;
        }
        debug_assert_eq!(self.blocks[slot as usize].end(), succ.offset);
        let desc = &mut self.blocks[slot as usize];
        desc.size += succ.size;
        desc.next = succ.next;
        self.vacate(next);
    }

    /// Return a vacated slot to the slab, invalidating any handle to it.
    fn vacate(&mut self, slot: u32) {
        let desc = &mut self.blocks[slot as usize];
        desc.state = BlockState::Vacant;
        desc.next = NIL;
        desc.size = 0;
        desc.generation = desc.generation.wrapping_add(1);
        self.vacant.push(slot);
    }

    /// Find the chain predecessor of `slot` by walking from the head.
    fn prev_of(&self, slot: u32) -> Option<u32> {
        if slot == self.head {
            return None;
        }
        let mut cur = self.head;
        while cur != NIL {
            let next = self.blocks[cur as usize].next;
            if next == slot {
                return Some(cur);
            }
            cur = next;
        }
        None
    }

    // ── Resize ────────────────────────────────────────────────────────

    /// Resize the block named by `handle` to `new_size` bytes.
    ///
    /// Grows by allocate-copy-free; a failed grow leaves the original block
    /// live and untouched. There is no shrink-in-place: a block whose
    /// capacity already covers the request is returned unchanged.
    pub(crate) fn resize(&mut self, handle: BlockHandle, new_size: usize) -> ResizeOutcome {
        let Some(slot) = self.resolve(handle) else {
            return ResizeOutcome::Invalid;
        };
        if new_size == 0 {
            let freed = self.free(handle);
            debug_assert!(freed);
            return ResizeOutcome::Freed;
        }
        let old = self.blocks[slot as usize];
        if old.size as usize >= new_size {
            return ResizeOutcome::Unchanged(handle);
        }
        let Some(new_handle) = self.alloc(new_size) else {
            return ResizeOutcome::NoSpace;
        };
        // Both blocks are live, so the ranges are disjoint.
        let src = old.offset as usize;
        self.pool
            .copy_within(src..src + old.size as usize, new_handle.offset as usize);
        let freed = self.free(handle);
        debug_assert!(freed);
        ResizeOutcome::Moved(new_handle)
    }

    // ── Payload access ────────────────────────────────────────────────

    /// Copy `buf.len()` payload bytes starting at `offset` into `buf`.
    pub(crate) fn read(
        &self,
        handle: BlockHandle,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<(), PoolError> {
        let desc = self.checked_block(handle, offset, buf.len())?;
        let start = desc.offset as usize + offset;
        buf.copy_from_slice(&self.pool[start..start + buf.len()]);
        Ok(())
    }

    /// Copy `bytes` into the payload starting at `offset`.
    pub(crate) fn write(
        &mut self,
        handle: BlockHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<(), PoolError> {
        let desc = self.checked_block(handle, offset, bytes.len())?;
        let start = desc.offset as usize + offset;
        self.pool[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Validate a handle and an access range within its block.
    fn checked_block(
        &self,
        handle: BlockHandle,
        offset: usize,
        len: usize,
    ) -> Result<BlockDesc, PoolError> {
        let slot = self.resolve(handle).ok_or(PoolError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        })?;
        let desc = self.blocks[slot as usize];
        let in_bounds = offset
            .checked_add(len)
            .is_some_and(|end| end <= desc.size as usize);
        if !in_bounds {
            return Err(PoolError::OutOfBounds {
                offset,
                len,
                block_len: desc.size as usize,
            });
        }
        Ok(desc)
    }

    /// Map a handle to its slab slot iff this core issued it and it names
    /// a live allocation.
    fn resolve(&self, handle: BlockHandle) -> Option<u32> {
        if handle.pool_id != self.id {
            return None;
        }
        let desc = self.blocks.get(handle.index as usize)?;
        let live = desc.state == BlockState::Allocated
            && desc.generation == handle.generation
            && desc.offset == handle.offset
            && desc.size == handle.len;
        live.then_some(handle.index)
    }

    // ── Introspection ─────────────────────────────────────────────────

    /// Pool capacity in bytes.
    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes inside allocated blocks.
    pub(crate) fn used_bytes(&self) -> u32 {
        self.used_bytes
    }

    /// Number of live (non-vacant) descriptors.
    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len() - self.vacant.len()
    }

    /// Number of free blocks and the largest free block size.
    pub(crate) fn free_summary(&self) -> (usize, u32) {
        let mut count = 0;
        let mut largest = 0;
        let mut cur = self.head;
        while cur != NIL {
            let desc = &self.blocks[cur as usize];
            if desc.state == BlockState::Free {
                count += 1;
                largest = largest.max(desc.size);
            }
            cur = desc.next;
        }
        (count, largest)
    }

    /// Address-ordered snapshot of every region in the pool.
    pub(crate) fn layout(&self) -> Vec<BlockSpan> {
        let mut spans = Vec::with_capacity(self.block_count());
        let mut cur = self.head;
        while cur != NIL {
            let desc = &self.blocks[cur as usize];
            spans.push(BlockSpan {
                offset: desc.offset,
                len: desc.size,
                free: desc.state == BlockState::Free,
            });
            cur = desc.next;
        }
        spans
    }
}
