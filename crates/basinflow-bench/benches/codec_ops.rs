//! Criterion micro-benchmarks for scenario persistence and result hashing.

use std::hint::black_box;

use basinflow_bench::{reference_simulation, stress_column};
use basinflow_scenario::codec::{decode_scenario, encode_scenario};
use basinflow_scenario::json::scenario_to_json;
use basinflow_scenario::{compare_results, result_hash, Scenario};
use criterion::{criterion_group, criterion_main, Criterion};

/// The stress column with a result attached: 120 layers x 601 steps.
fn simulated_stress() -> Scenario {
    let model = stress_column();
    let result = reference_simulation(1.0)
        .unwrap()
        .run(&model, |_| {})
        .unwrap();
    Scenario::new("stress", model).with_result(result)
}

fn bench_codec_encode(c: &mut Criterion) {
    let scenario = simulated_stress();

    c.bench_function("codec_encode_stress", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(1 << 22);
            encode_scenario(&mut buf, &scenario).unwrap();
            black_box(&buf);
        });
    });
}

fn bench_codec_decode(c: &mut Criterion) {
    let scenario = simulated_stress();
    let mut encoded = Vec::new();
    encode_scenario(&mut encoded, &scenario).unwrap();

    c.bench_function("codec_decode_stress", |b| {
        b.iter(|| {
            let mut cursor = encoded.as_slice();
            let decoded = decode_scenario(&mut cursor).unwrap();
            black_box(&decoded);
        });
    });
}

fn bench_result_hash(c: &mut Criterion) {
    let scenario = simulated_stress();
    let result = scenario.result().unwrap();

    c.bench_function("result_hash_stress", |b| {
        b.iter(|| black_box(result_hash(result)));
    });
}

fn bench_compare_identical(c: &mut Criterion) {
    let a = simulated_stress();
    let b_scenario = a.snapshot();
    let (left, right) = (a.result().unwrap(), b_scenario.result().unwrap());

    c.bench_function("compare_identical_stress", |b| {
        b.iter(|| black_box(compare_results(left, right, 0.0)));
    });
}

fn bench_json_export(c: &mut Criterion) {
    let scenario = simulated_stress();

    let mut group = c.benchmark_group("json");
    group.sample_size(10);
    group.bench_function("json_export_stress", |b| {
        b.iter(|| black_box(scenario_to_json(&scenario).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_codec_encode,
    bench_codec_decode,
    bench_result_hash,
    bench_compare_identical,
    bench_json_export
);
criterion_main!(benches);
