use criterion::{Criterion, criterion_group};
use isosurf_lib::mesh::TriMesh3d;
use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::SinXzField;
use isosurf_lib::{Parameters, WeldingStrategy, extract_surface};
use std::time::Duration;

fn sin_xz_mesh() -> TriMesh3d<f32> {
    let parameters = Parameters::new(Vector3::new(10.0, 4.0, 10.0), 0.05)
        .with_welding(WeldingStrategy::GridPoint);
    extract_surface(&SinXzField, &parameters)
        .unwrap()
        .into_welded_mesh()
        .mesh
}

pub fn mesh_vertex_normals(c: &mut Criterion) {
    let mesh = sin_xz_mesh();

    let mut group = c.benchmark_group("mesh");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("mesh_vertex_normals", |b| {
        b.iter(|| {
            let normals = mesh.vertex_normals();
            std::hint::black_box(normals)
        })
    });

    group.finish();
}

pub fn mesh_vertex_normals_parallel(c: &mut Criterion) {
    let mesh = sin_xz_mesh();

    let mut group = c.benchmark_group("mesh");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("mesh_vertex_normals_parallel", |b| {
        b.iter(|| {
            let normals = mesh.par_vertex_normals();
            std::hint::black_box(normals)
        })
    });

    group.finish();
}

criterion_group!(
    bench_mesh,
    mesh_vertex_normals,
    mesh_vertex_normals_parallel
);
