use criterion::{BenchmarkId, Criterion, criterion_group};
use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::SinXzField;
use isosurf_lib::welding::weld_by_spatial_hash;
use isosurf_lib::{Parameters, SpatialHashParameters, extract_raw_mesh};
use std::time::Duration;

pub fn weld_spatial_hash_bucket_steps(c: &mut Criterion) {
    let parameters = Parameters::new(Vector3::new(10.0, 4.0, 10.0), 0.05);
    let raw_mesh = extract_raw_mesh(&SinXzField, &parameters).unwrap();

    let mut group = c.benchmark_group("welding");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    for bucket_step in [0.01f32, 0.03, 0.1] {
        let welding = SpatialHashParameters {
            threshold: 1e-4,
            bucket_step,
        };
        group.bench_with_input(
            BenchmarkId::new("weld_by_spatial_hash", bucket_step),
            &welding,
            |b, welding| b.iter(|| std::hint::black_box(weld_by_spatial_hash(&raw_mesh, welding).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(bench_welding, weld_spatial_hash_bucket_steps);
