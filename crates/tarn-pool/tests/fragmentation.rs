//! Integration test: free-list behavior under fragmentation pressure.
//!
//! Exercises the pool through split/coalesce cycles and random churn and
//! checks, after every completed operation, that the block layout still
//! partitions the arena exactly (no gap, no overlap) and that no two
//! adjacent blocks are both free.

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tarn_pool::{BlockHandle, FitPolicy, Pool, PoolConfig};

/// Assert the partition and eager-coalescing invariants from the layout.
fn assert_invariants(pool: &Pool) {
    let spans = pool.layout();
    assert!(!spans.is_empty(), "open pool must have at least one block");
    assert_eq!(spans[0].offset, 0, "first block must start at offset 0");
    for pair in spans.windows(2) {
        assert_eq!(
            pair[0].offset + pair[0].len,
            pair[1].offset,
            "gap or overlap between {} and {}",
            pair[0],
            pair[1]
        );
        assert!(
            !(pair[0].free && pair[1].free),
            "uncoalesced free neighbours: {} and {}",
            pair[0],
            pair[1]
        );
    }
    let last = spans.last().unwrap();
    assert_eq!(
        (last.offset + last.len) as usize,
        pool.capacity(),
        "last block must end at the pool capacity"
    );
}

#[test]
fn coalescing_round_trip() {
    let pool = Pool::with_capacity(3 * 64).unwrap();
    let a = pool.alloc(64).unwrap();
    let b = pool.alloc(64).unwrap();
    let c = pool.alloc(64).unwrap();
    assert_eq!(pool.stats().free_bytes, 0);

    // Free in the order that exercises both merge directions: A leaves a
    // leading hole, C a trailing hole, and freeing B must bridge them.
    pool.free(a);
    assert_invariants(&pool);
    pool.free(c);
    assert_invariants(&pool);
    pool.free(b);
    assert_invariants(&pool);

    let stats = pool.stats();
    assert_eq!(stats.block_count, 1);
    assert_eq!(stats.largest_free_block, 192);

    // The combined region is allocatable again in one piece.
    let whole = pool.alloc(192).unwrap();
    assert_eq!(whole.offset(), 0);
    assert_eq!(whole.len(), 192);
}

#[test]
fn exhaustion_edges() {
    let capacity = 1024;
    let pool = Pool::with_capacity(capacity).unwrap();

    // One byte over capacity can never fit.
    assert!(pool.alloc(capacity + 1).is_none());

    // The full capacity fits exactly once (no per-block overhead inside
    // the data pool in the separate-metadata layout).
    let whole = pool.alloc(capacity).unwrap();
    assert!(pool.alloc(1).is_none());
    assert_eq!(pool.stats().failed_allocs, 2);

    pool.free(whole);
    assert_eq!(pool.stats().largest_free_block, capacity);
    assert_invariants(&pool);
}

#[test]
fn interleaved_frees_leave_no_adjacent_free_blocks() {
    let pool = Pool::with_capacity(4096).unwrap();
    let handles: Vec<BlockHandle> = (0..16).map(|_| pool.alloc(128).unwrap()).collect();

    // Free every other block, then the rest.
    for (i, &h) in handles.iter().enumerate() {
        if i % 2 == 0 {
            pool.free(h);
            assert_invariants(&pool);
        }
    }
    for (i, &h) in handles.iter().enumerate() {
        if i % 2 == 1 {
            pool.free(h);
            assert_invariants(&pool);
        }
    }
    assert_eq!(pool.stats().block_count, 1);
}

#[test]
fn resize_chain_preserves_data() {
    let pool = Pool::with_capacity(64 * 1024).unwrap();
    let payload: Vec<u8> = (0..=255).cycle().take(500).map(|b: u16| b as u8).collect();

    let mut handle = pool.alloc(payload.len()).unwrap();
    pool.write(handle, 0, &payload).unwrap();

    // Grow through several doublings; the original payload must survive
    // every move.
    let mut size = payload.len();
    for _ in 0..5 {
        size *= 2;
        handle = pool.resize(Some(handle), size).expect("pool has room");
        let mut readback = vec![0u8; payload.len()];
        pool.read(handle, 0, &mut readback).unwrap();
        assert_eq!(readback, payload);
        assert_invariants(&pool);
    }

    // Shrinking requests are no-ops on the same handle.
    let same = pool.resize(Some(handle), 8).unwrap();
    assert_eq!(same, handle);
}

fn churn(policy: FitPolicy, seed: u64) {
    let pool = Pool::new(PoolConfig::new(64 * 1024).with_policy(policy)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut live: Vec<BlockHandle> = Vec::new();

    for step in 0..2_000 {
        if rng.random_bool(0.6) || live.is_empty() {
            let size = rng.random_range(1..1024);
            if let Some(handle) = pool.alloc(size) {
                // Stamp the block so later verification catches any
                // double-served range.
                pool.write(handle, 0, &handle.offset().to_le_bytes())
                    .unwrap();
                live.push(handle);
            }
        } else {
            let handle = live.swap_remove(rng.random_range(0..live.len()));
            let mut stamp = [0u8; 4];
            pool.read(handle, 0, &mut stamp).unwrap();
            assert_eq!(
                u32::from_le_bytes(stamp),
                handle.offset(),
                "stamp clobbered at step {step}"
            );
            pool.free(handle);
        }
        if step % 64 == 0 {
            assert_invariants(&pool);
        }
    }

    let expected: usize = live.iter().map(|h| h.len() as usize).sum();
    assert_eq!(pool.stats().used_bytes, expected);
    for handle in live {
        pool.free(handle);
    }
    assert_invariants(&pool);
    let stats = pool.stats();
    assert_eq!(stats.used_bytes, 0);
    assert_eq!(stats.block_count, 1);
    assert_eq!(stats.invalid_frees, 0);
}

#[test]
fn churn_first_fit() {
    churn(FitPolicy::FirstFit, 0xC0FFEE);
}

#[test]
fn churn_best_fit() {
    churn(FitPolicy::BestFit, 0xC0FFEE);
}
