//! Benchmark fixtures for the Tarn pool allocator.
//!
//! Provides pre-built pool configurations shared by the criterion benches:
//!
//! - [`bench_pool`]: a 1 MiB arena with the requested fit policy
//! - [`churn_sizes`]: a deterministic, seed-derived mix of request sizes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tarn_pool::{FitPolicy, Pool, PoolConfig};

/// Arena capacity used by the churn benches: 1 MiB.
pub const BENCH_CAPACITY: usize = 1 << 20;

/// Build a benchmark pool with the given fit policy.
pub fn bench_pool(policy: FitPolicy) -> Pool {
    Pool::new(PoolConfig::new(BENCH_CAPACITY).with_policy(policy))
        .expect("bench capacity is valid")
}

/// A deterministic mix of request sizes in `16..=512` bytes.
///
/// Seeded ChaCha, so every run of a bench sees the same request stream.
pub fn churn_sizes(seed: u64, count: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.random_range(16..=512)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_sizes_are_deterministic_and_bounded() {
        let a = churn_sizes(7, 100);
        let b = churn_sizes(7, 100);
        assert_eq!(a, b);
        assert!(a.iter().all(|&s| (16..=512).contains(&s)));
    }
}
