//! Benchmarks for the odometry integrator.

use car_lib::odometry::{Odometry, Params};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_update(c: &mut Criterion) {
    c.bench_function("odometry update straight", |b| {
        let mut odom = Odometry::with_params(Params::default());
        b.iter(|| {
            odom.update(black_box(1.0 / 30.0), black_box(40), black_box(0.0), Some(16.0));
        });
    });

    c.bench_function("odometry update arc", |b| {
        let mut odom = Odometry::with_params(Params::default());
        b.iter(|| {
            odom.update(black_box(1.0 / 30.0), black_box(40), black_box(15.0), Some(16.0));
        });
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
