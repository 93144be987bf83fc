//! Benchmarks for tile layout geometry
//!
//! Measures performance of:
//! - Spiral index to coordinate conversion
//! - Building spiral clusters
//! - Neighbor resolution and diameter

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hexroll_topology::{spiral_to_coord, Layout};

fn bench_spiral_to_coord(c: &mut Criterion) {
    let mut group = c.benchmark_group("spiral_to_coord");

    for &index in &[0u64, 6, 100, 10_000, 1_000_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(index), &index, |b, &idx| {
            b.iter(|| spiral_to_coord(black_box(idx)))
        });
    }
    group.finish();
}

fn bench_spiral_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("spiral_layout");

    for &count in &[7usize, 37, 127, 469] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter(|| Layout::spiral(black_box(n)))
        });
    }
    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let layout = Layout::spiral(127);

    c.bench_function("neighbors_of_all_127", |b| {
        b.iter(|| {
            for i in 0..layout.len() {
                black_box(layout.neighbors_of(i));
            }
        })
    });

    c.bench_function("diameter_127", |b| b.iter(|| black_box(&layout).diameter()));
}

criterion_group!(benches, bench_spiral_to_coord, bench_spiral_layout, bench_neighbors);
criterion_main!(benches);
