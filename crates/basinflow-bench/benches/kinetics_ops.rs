//! Criterion micro-benchmarks for the kinetic schemes.

use std::hint::black_box;

use basinflow_core::KerogenType;
use basinflow_stages::{KineticScheme, ReflectanceTransform};
use criterion::{criterion_group, criterion_main, Criterion};

/// A burial ramp from 20 °C to 180 °C over 100 steps of 1 Myr.
fn ramp() -> Vec<f64> {
    (0..=100).map(|i| 20.0 + 1.6 * i as f64).collect()
}

fn bench_easy_ro_history(c: &mut Criterion) {
    let scheme = KineticScheme::easy_ro();
    let temperatures = ramp();

    c.bench_function("easy_ro_100_steps", |b| {
        b.iter(|| {
            let mut unreacted = vec![1.0; scheme.len()];
            for pair in temperatures.windows(2) {
                scheme.advance(&mut unreacted, pair[0], pair[1], 1.0);
            }
            let ro = ReflectanceTransform::EASY_RO.reflectance(scheme.conversion(&unreacted));
            black_box(ro);
        });
    });
}

fn bench_pepper_corvi_history(c: &mut Criterion) {
    let temperatures = ramp();

    for kerogen in [KerogenType::TypeI, KerogenType::TypeII, KerogenType::TypeIII] {
        let scheme = KineticScheme::pepper_corvi_default(kerogen);
        c.bench_function(&format!("pepper_corvi_{kerogen:?}_100_steps"), |b| {
            b.iter(|| {
                let mut unreacted = vec![1.0; scheme.len()];
                for pair in temperatures.windows(2) {
                    scheme.advance(&mut unreacted, pair[0], pair[1], 1.0);
                }
                black_box(scheme.conversion(&unreacted));
            });
        });
    }
}

fn bench_fine_gaussian(c: &mut Criterion) {
    let scheme = KineticScheme::pepper_corvi(KerogenType::TypeII, 201).unwrap();
    let mut unreacted = vec![1.0; scheme.len()];

    c.bench_function("gaussian_201_bins_single_step", |b| {
        b.iter(|| {
            scheme.advance(&mut unreacted, 120.0, 121.0, 0.5);
            black_box(&unreacted);
        });
    });
}

criterion_group!(
    benches,
    bench_easy_ro_history,
    bench_pepper_corvi_history,
    bench_fine_gaussian
);
criterion_main!(benches);
