use criterion::{Criterion, criterion_group};
use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::SinXzField;
use isosurf_lib::{Parameters, WeldingStrategy, extract_raw_mesh, extract_surface};
use std::time::Duration;

fn sin_xz_parameters(welding: WeldingStrategy<f32>) -> Parameters<f32> {
    Parameters::new(Vector3::new(10.0, 4.0, 10.0), 0.05).with_welding(welding)
}

pub fn extract_sin_xz_raw(c: &mut Criterion) {
    let parameters = sin_xz_parameters(WeldingStrategy::GridPoint);

    let mut group = c.benchmark_group("extraction");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("extract_sin_xz_raw", |b| {
        b.iter(|| std::hint::black_box(extract_raw_mesh(&SinXzField, &parameters).unwrap()))
    });

    group.finish();
}

pub fn extract_sin_xz_spatial_hash(c: &mut Criterion) {
    let parameters = sin_xz_parameters(WeldingStrategy::SpatialHash(Default::default()));

    let mut group = c.benchmark_group("extraction");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("extract_sin_xz_spatial_hash", |b| {
        b.iter(|| std::hint::black_box(extract_surface(&SinXzField, &parameters).unwrap()))
    });

    group.finish();
}

pub fn extract_sin_xz_grid_point(c: &mut Criterion) {
    let parameters = sin_xz_parameters(WeldingStrategy::GridPoint);

    let mut group = c.benchmark_group("extraction");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("extract_sin_xz_grid_point", |b| {
        b.iter(|| std::hint::black_box(extract_surface(&SinXzField, &parameters).unwrap()))
    });

    group.finish();
}

criterion_group!(
    bench_extraction,
    extract_sin_xz_raw,
    extract_sin_xz_spatial_hash,
    extract_sin_xz_grid_point
);
