//! Benchmarks for the normalizer and compositor

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use riskmap_algorithms::suitability::{
    composite, normalize, RiskConfig, RiskInputs, RiskModel, WeightPolicy, Weights,
};
use riskmap_core::{GeoTransform, Raster};

fn create_layer(size: usize, base: f64, spread: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(60.0, 37.0, 0.01, -0.01));
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f64 / 200.0 * spread;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("suitability/normalize");
    for size in [256, 512, 1024, 2048] {
        let lst = create_layer(size, 10.0, 30.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| normalize(black_box(&lst), 18.0, 32.0).unwrap())
        });
    }
    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("suitability/composite");
    for size in [256, 512, 1024, 2048] {
        let t = create_layer(size, 0.0, 1.0);
        let v = create_layer(size, 0.0, 1.0);
        let r = create_layer(size, 0.0, 1.0);
        let weights = Weights::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                composite(black_box(&t), black_box(&v), black_box(&r), &weights, WeightPolicy::Strict)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("suitability/model");
    let model = RiskModel::new(RiskConfig::default()).unwrap();
    for size in [512, 2048] {
        let t = create_layer(size, 10.0, 30.0);
        let v = create_layer(size, 0.0, 1.0);
        let r = create_layer(size, 0.0, 500.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                model
                    .evaluate(black_box(&RiskInputs {
                        temperature: &t,
                        vegetation: &v,
                        rainfall: &r,
                    }))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_composite, bench_model);
criterion_main!(benches);
