use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use dev_utils::{build_synthetic_scenario, GenerationConfig};
use raptor::{query, DEFAULT_MAX_ROUNDS};

fn raptor_benchmark(c: &mut Criterion) {
    let scenario = build_synthetic_scenario(&GenerationConfig::default(), 42);
    c.bench_function("raptor query", |b| {
        b.iter(|| {
            query(
                black_box(&scenario.network),
                black_box(&scenario.origin),
                black_box(&scenario.destination),
                black_box(scenario.departure),
                DEFAULT_MAX_ROUNDS,
            )
        })
    });
}

criterion_group!(benches, raptor_benchmark);
criterion_main!(benches);
