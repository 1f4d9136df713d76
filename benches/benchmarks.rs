//! Benchmarks for training and prediction.

use core::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ripper_rs::{Attribute, Dataset, Instance, Ripper, RipperConfig, utils::rng_from_seed};

fn synthetic_data(n_rows: usize) -> Dataset {
    use rand::Rng;
    let mut rng = rng_from_seed(42);
    let mut data = Dataset::new(vec![
        Attribute::discrete("class", &["neg", "pos"]),
        Attribute::discrete("flag", &["off", "on"]),
        Attribute::continuous("x"),
        Attribute::continuous("y"),
    ])
    .unwrap();
    for _ in 0..n_rows {
        let flag = rng.random_range(0..2u64) as f64;
        let x = rng.random::<f64>() * 100.0;
        let y = rng.random::<f64>() * 100.0;
        let noisy = rng.random::<f64>() < 0.05;
        let mut class = if x > 60.0 || (flag == 1.0 && y > 30.0) { 1.0 } else { 0.0 };
        if noisy {
            class = 1.0 - class;
        }
        data.push(Instance::new(vec![class, flag, x, y])).unwrap();
    }
    data
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n_rows in [100, 300, 1000] {
        let data = synthetic_data(n_rows);
        let config = RipperConfig::builder().seed(42).build().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &n_rows, |b, _| {
            b.iter(|| {
                let model = Ripper::new(config).fit(black_box(&data)).unwrap();
                black_box(model)
            });
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");

    for n_rows in [100, 1000, 10_000] {
        let train = synthetic_data(1000);
        let config = RipperConfig::builder().seed(42).build().unwrap();
        let model = Ripper::new(config).fit(&train).unwrap();
        let data = synthetic_data(n_rows);

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &n_rows, |b, _| {
            b.iter(|| black_box(model.predict(black_box(&data)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_predict);
criterion_main!(benches);
