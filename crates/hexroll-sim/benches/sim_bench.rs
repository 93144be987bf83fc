//! Benchmarks for mesh simulation throughput
//!
//! Measures performance of:
//! - Ticking a settled cluster in setup
//! - A full roll from button press to settled compare

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use hexroll_sim::{Simulation, SimulationConfig};
use hexroll_topology::Layout;

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for &tiles in &[7usize, 37, 127] {
        group.throughput(Throughput::Elements(tiles as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tiles), &tiles, |b, &n| {
            let mut sim = Simulation::with_layout(SimulationConfig::default(), &Layout::spiral(n))
                .expect("valid layout");
            b.iter(|| sim.step())
        });
    }
    group.finish();
}

fn bench_full_roll(c: &mut Criterion) {
    let mut group = c.benchmark_group("press_to_settled");
    group.sample_size(20);

    for &tiles in &[7usize, 19] {
        group.bench_with_input(BenchmarkId::from_parameter(tiles), &tiles, |b, &n| {
            b.iter_batched(
                || {
                    let mut sim =
                        Simulation::with_layout(SimulationConfig::default(), &Layout::spiral(n))
                            .expect("valid layout");
                    sim.press_all();
                    sim
                },
                |mut sim| sim.run_until(Simulation::is_settled, 5_000),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_full_roll);
criterion_main!(benches);
