//! Benchmarks for the Beanstalk foundation layer.
//!
//! Run with: `cargo bench --package beanstalk_foundation`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use beanstalk_foundation::Bitset;

// =============================================================================
// Bitset Benchmarks
// =============================================================================

fn dense(n: u32) -> Bitset {
    (0..n).filter(|i| i % 3 != 0).collect()
}

fn bench_bitset_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitset/algebra");

    for size in [64u32, 1024, 16_384] {
        let a = dense(size);
        let b: Bitset = (0..size).filter(|i| i % 2 == 0).collect();

        group.bench_with_input(BenchmarkId::new("intersect", size), &size, |bench, _| {
            bench.iter(|| black_box(a.intersect(&b)));
        });
        group.bench_with_input(BenchmarkId::new("is_subset", size), &size, |bench, _| {
            bench.iter(|| black_box(b.is_subset(&a)));
        });
        group.bench_with_input(BenchmarkId::new("iter", size), &size, |bench, _| {
            bench.iter(|| black_box(a.iter().sum::<u32>()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bitset_algebra);
criterion_main!(benches);
