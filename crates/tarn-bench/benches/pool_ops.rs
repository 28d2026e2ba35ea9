//! Criterion micro-benchmarks for pool allocation, release, and resize.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tarn_bench::{bench_pool, churn_sizes};
use tarn_list::NodeList;
use tarn_pool::FitPolicy;

/// Benchmark: allocate-then-free churn through a window of live blocks,
/// once per fit policy.
fn bench_alloc_free_churn(c: &mut Criterion) {
    for (name, policy) in [
        ("churn_first_fit", FitPolicy::FirstFit),
        ("churn_best_fit", FitPolicy::BestFit),
    ] {
        let pool = bench_pool(policy);
        let sizes = churn_sizes(42, 256);
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut live = Vec::with_capacity(sizes.len());
                for &size in &sizes {
                    if let Some(handle) = pool.alloc(size) {
                        live.push(handle);
                    }
                    // Keep a bounded window live so frees interleave with
                    // allocations instead of clustering at the end.
                    if live.len() > 32 {
                        pool.free(live.swap_remove(0));
                    }
                }
                for handle in live.drain(..) {
                    pool.free(handle);
                }
                black_box(pool.stats().block_count);
            });
        });
    }
}

/// Benchmark: repeated doubling resize of a single block.
fn bench_resize_growth(c: &mut Criterion) {
    let pool = bench_pool(FitPolicy::FirstFit);
    c.bench_function("resize_doubling", |b| {
        b.iter(|| {
            let mut handle = pool.alloc(16).unwrap();
            let mut size = 16usize;
            while size < 16 * 1024 {
                size *= 2;
                handle = pool.resize(Some(handle), size).unwrap();
            }
            black_box(handle.len());
            pool.free(handle);
        });
    });
}

/// Benchmark: append 256 nodes to a pool-backed list, then tear it down.
fn bench_list_append_teardown(c: &mut Criterion) {
    let pool = Arc::new(bench_pool(FitPolicy::FirstFit));
    c.bench_function("list_append_256", |b| {
        b.iter(|| {
            let mut list = NodeList::new(Arc::clone(&pool));
            for v in 0..256u16 {
                list.push_back(v);
            }
            black_box(list.len());
            // Drop frees every node back to the pool.
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_churn,
    bench_resize_growth,
    bench_list_append_teardown
);
criterion_main!(benches);
