//! Pool metrics.
//!
//! The pool reports its state through counters rather than logging: layout
//! figures describe the arena right now, and the operation counters make
//! the deliberately silent failure paths (rejected zero-size requests,
//! stale-handle frees) observable and testable.

/// A point-in-time snapshot of a pool's layout and operation counters.
///
/// Layout figures are zero after [`Pool::close`](crate::Pool::close);
/// operation counters keep accumulating for the lifetime of the `Pool`
/// value, including rejections that happen after close.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Arena capacity in bytes (aligned).
    pub capacity_bytes: usize,
    /// Bytes inside allocated blocks, including alignment padding.
    pub used_bytes: usize,
    /// Bytes inside free blocks.
    pub free_bytes: usize,
    /// Total number of blocks, free and allocated.
    pub block_count: usize,
    /// Number of free blocks.
    pub free_block_count: usize,
    /// Size of the largest free block in bytes — the largest request that
    /// can currently succeed.
    pub largest_free_block: usize,
    /// Allocations that failed because no free block was large enough.
    pub failed_allocs: u64,
    /// Zero-size allocation requests, rejected uniformly.
    pub rejected_zero_allocs: u64,
    /// `free` calls with a stale, double-freed, or foreign handle.
    pub invalid_frees: u64,
    /// `resize` calls with a stale or foreign handle.
    pub invalid_resizes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        let stats = PoolStats::default();
        assert_eq!(stats.capacity_bytes, 0);
        assert_eq!(stats.failed_allocs, 0);
        assert_eq!(stats.invalid_frees, 0);
    }
}
