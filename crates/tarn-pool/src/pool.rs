//! The thread-safe pool facade.
//!
//! [`Pool`] wraps the unlocked [`FreeList`] core in one mutex and is the
//! only public entry point. Every operation acquires the lock exactly once
//! at entry; composite operations (`resize` delegating to allocate and
//! free) run against the core while the lock is held, so there is no
//! re-entry path. The guard releases on every exit, including the early
//! failure returns.
//!
//! Closing the pool drops the core in place. The facade stays usable —
//! every later call fails safely (`None`, no-op, or [`PoolError::Closed`])
//! without touching released state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::block::BlockSpan;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::freelist::{FreeList, ResizeOutcome};
use crate::handle::BlockHandle;
use crate::stats::PoolStats;

/// Operation counters, kept outside the core so rejections after `close`
/// are still recorded.
#[derive(Debug, Default)]
struct OpCounters {
    failed_allocs: u64,
    rejected_zero_allocs: u64,
    invalid_frees: u64,
    invalid_resizes: u64,
}

/// Everything behind the lock: the core (while open) and the counters.
struct PoolState {
    core: Option<FreeList>,
    counters: OpCounters,
}

impl PoolState {
    fn alloc(&mut self, size: usize) -> Option<BlockHandle> {
        if size == 0 {
            self.counters.rejected_zero_allocs += 1;
            return None;
        }
        let Some(core) = self.core.as_mut() else {
            self.counters.failed_allocs += 1;
            return None;
        };
        let handle = core.alloc(size);
        if handle.is_none() {
            self.counters.failed_allocs += 1;
        }
        handle
    }

    fn free(&mut self, handle: BlockHandle) {
        let accepted = match self.core.as_mut() {
            Some(core) => core.free(handle),
            None => false,
        };
        if !accepted {
            self.counters.invalid_frees += 1;
        }
    }

    fn resize(&mut self, handle: BlockHandle, new_size: usize) -> Option<BlockHandle> {
        let Some(core) = self.core.as_mut() else {
            self.counters.invalid_resizes += 1;
            return None;
        };
        match core.resize(handle, new_size) {
            ResizeOutcome::Moved(h) | ResizeOutcome::Unchanged(h) => Some(h),
            ResizeOutcome::Freed => None,
            ResizeOutcome::NoSpace => {
                self.counters.failed_allocs += 1;
                None
            }
            ResizeOutcome::Invalid => {
                self.counters.invalid_resizes += 1;
                None
            }
        }
    }
}

/// A thread-safe, fixed-capacity arena allocator.
///
/// All state lives behind one mutex; share a `Pool` across threads by
/// reference or `Arc`. Allocation failure is a normal outcome (`None`),
/// never a panic, and invalid handles are rejected as observable no-ops —
/// see [`PoolStats`] for the counters.
///
/// # Example
///
/// ```
/// use tarn_pool::{Pool, PoolConfig};
///
/// let pool = Pool::new(PoolConfig::new(1024))?;
/// let block = pool.alloc(64).expect("fresh pool has space");
/// pool.write(block, 0, b"hello")?;
///
/// let mut buf = [0u8; 5];
/// pool.read(block, 0, &mut buf)?;
/// assert_eq!(&buf, b"hello");
///
/// pool.free(block);
/// assert_eq!(pool.stats().used_bytes, 0);
/// # Ok::<(), tarn_pool::PoolError>(())
/// ```
pub struct Pool {
    state: Mutex<PoolState>,
}

impl Pool {
    /// Create a pool from a validated configuration.
    ///
    /// Unlike a C-style `mem_init`, reservation problems are surfaced as a
    /// recoverable error, never a process abort.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let core = FreeList::new(&config)?;
        Ok(Self {
            state: Mutex::new(PoolState {
                core: Some(core),
                counters: OpCounters::default(),
            }),
        })
    }

    /// Create a pool of `capacity` bytes with the default configuration.
    pub fn with_capacity(capacity: usize) -> Result<Self, PoolError> {
        Self::new(PoolConfig::new(capacity))
    }

    /// Allocate a block of at least `size` bytes, zero-filled.
    ///
    /// Returns `None` for a zero-size request, when no free block is large
    /// enough, or after [`Pool::close`]. The handle stays valid until the
    /// matching [`Pool::free`] or a growing [`Pool::resize`].
    pub fn alloc(&self, size: usize) -> Option<BlockHandle> {
        self.lock().alloc(size)
    }

    /// Release the block named by `handle`.
    ///
    /// A stale, double-freed, or foreign handle is a no-op; the rejection
    /// is counted in [`PoolStats::invalid_frees`]. Adjacent free blocks are
    /// merged eagerly before the call returns.
    pub fn free(&self, handle: BlockHandle) {
        self.lock().free(handle);
    }

    /// Resize a block to `new_size` bytes.
    ///
    /// `None` as the handle delegates to [`Pool::alloc`]; `new_size == 0`
    /// delegates to [`Pool::free`] and returns `None`. A block whose
    /// capacity already covers the request is returned unchanged. Growing
    /// moves the payload to a fresh block and frees the old one; if that
    /// allocation fails the original block stays live and `None` is
    /// returned.
    pub fn resize(&self, handle: Option<BlockHandle>, new_size: usize) -> Option<BlockHandle> {
        let mut state = self.lock();
        match handle {
            None => state.alloc(new_size),
            Some(h) => state.resize(h, new_size),
        }
    }

    /// Copy `buf.len()` bytes out of the block, starting at `offset`.
    pub fn read(&self, handle: BlockHandle, offset: usize, buf: &mut [u8]) -> Result<(), PoolError> {
        match self.lock().core.as_ref() {
            Some(core) => core.read(handle, offset, buf),
            None => Err(PoolError::Closed),
        }
    }

    /// Copy `bytes` into the block, starting at `offset`.
    pub fn write(&self, handle: BlockHandle, offset: usize, bytes: &[u8]) -> Result<(), PoolError> {
        match self.lock().core.as_mut() {
            Some(core) => core.write(handle, offset, bytes),
            None => Err(PoolError::Closed),
        }
    }

    /// Release the arena and all its blocks at once.
    ///
    /// Outstanding handles become stale; presenting one later is rejected
    /// like any other invalid handle. Idempotent.
    pub fn close(&self) {
        self.lock().core = None;
    }

    /// Whether [`Pool::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().core.is_none()
    }

    /// Arena capacity in bytes, or 0 once closed.
    pub fn capacity(&self) -> usize {
        self.lock()
            .core
            .as_ref()
            .map_or(0, |core| core.capacity() as usize)
    }

    /// Snapshot the layout figures and operation counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        let mut stats = PoolStats {
            failed_allocs: state.counters.failed_allocs,
            rejected_zero_allocs: state.counters.rejected_zero_allocs,
            invalid_frees: state.counters.invalid_frees,
            invalid_resizes: state.counters.invalid_resizes,
            ..PoolStats::default()
        };
        if let Some(core) = state.core.as_ref() {
            let (free_blocks, largest) = core.free_summary();
            stats.capacity_bytes = core.capacity() as usize;
            stats.used_bytes = core.used_bytes() as usize;
            stats.free_bytes = (core.capacity() - core.used_bytes()) as usize;
            stats.block_count = core.block_count();
            stats.free_block_count = free_blocks;
            stats.largest_free_block = largest as usize;
        }
        stats
    }

    /// Address-ordered snapshot of every block span, for diagnostics and
    /// invariant checking. Empty once closed.
    pub fn layout(&self) -> Vec<BlockSpan> {
        self.lock()
            .core
            .as_ref()
            .map(FreeList::layout)
            .unwrap_or_default()
    }

    /// Acquire the state lock, recovering from poisoning. A poisoned lock
    /// only means another thread panicked while holding the guard; the
    /// core restores its invariants before any panic can escape.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
