use isosurf_lib::mesh::TriMesh3d;
use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::SinXzField;
use isosurf_lib::welding::weld_by_spatial_hash;
use isosurf_lib::{
    Parameters, SpatialHashParameters, WeldingStrategy, extract_raw_mesh, extract_surface,
};

fn two_vertex_mesh(distance: f64) -> TriMesh3d<f64> {
    TriMesh3d {
        vertices: vec![
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(0.5 + distance, 0.5, 0.5),
            Vector3::new(0.5, 1.5, 0.5),
        ],
        triangles: vec![[0, 1, 2]],
    }
}

#[test]
fn test_spatial_hash_merges_close_vertices() {
    let parameters = SpatialHashParameters {
        threshold: 1e-4,
        bucket_step: 0.03,
    };

    let welded = weld_by_spatial_hash(&two_vertex_mesh(1e-6), &parameters).unwrap();
    assert_eq!(welded.mesh.vertices.len(), 2);
    assert_eq!(welded.vertex_map[0], welded.vertex_map[1]);

    let welded = weld_by_spatial_hash(&two_vertex_mesh(0.1), &parameters).unwrap();
    assert_eq!(welded.mesh.vertices.len(), 3);
    assert_ne!(welded.vertex_map[0], welded.vertex_map[1]);
}

#[test]
fn test_spatial_hash_of_raw_mesh_matches_extraction() {
    let parameters = Parameters::new(Vector3::new(5.0, 5.0, 5.0), 0.5);
    let raw = extract_raw_mesh(&SinXzField, &parameters).unwrap();
    let welded = weld_by_spatial_hash(&raw, &SpatialHashParameters::default()).unwrap();
    let extraction = extract_surface(&SinXzField, &parameters).unwrap();

    assert_eq!(&welded.mesh, extraction.mesh());
    assert_eq!(Some(welded.normals.as_slice()), extraction.normals());
    assert_eq!(welded.vertex_map.len(), raw.vertices.len());
}

#[test]
fn test_welded_positions_stem_from_raw_positions() {
    let parameters = Parameters::new(Vector3::new(5.0, 5.0, 5.0), 0.5);
    let raw = extract_raw_mesh(&SinXzField, &parameters).unwrap();
    let welded = weld_by_spatial_hash(&raw, &SpatialHashParameters::default()).unwrap();

    // Every raw vertex is within the threshold of the vertex it was merged into
    for (raw_vertex, &new_index) in raw.vertices.iter().zip(welded.vertex_map.iter()) {
        let welded_vertex = welded.mesh.vertices[new_index as usize];
        assert!((welded_vertex - raw_vertex).norm_squared() < 1e-4);
    }
}

#[test]
fn test_large_threshold_merges_more() {
    let parameters = Parameters::new(Vector3::new(5.0, 5.0, 5.0), 0.25);
    let raw = extract_raw_mesh(&SinXzField, &parameters).unwrap();

    let fine = weld_by_spatial_hash(&raw, &SpatialHashParameters::default()).unwrap();
    let coarse = weld_by_spatial_hash(
        &raw,
        &SpatialHashParameters {
            threshold: 0.04,
            bucket_step: 0.5,
        },
    )
    .unwrap();

    assert!(coarse.mesh.vertices.len() < fine.mesh.vertices.len());
    assert_eq!(coarse.mesh.triangles.len(), raw.triangles.len());
}

#[test]
fn test_bucket_smaller_than_threshold_still_welds() {
    // Exact duplicates always end up in the same bucket
    let parameters = Parameters::new(Vector3::new(3.0, 3.0, 3.0), 0.5).with_welding(
        WeldingStrategy::SpatialHash(SpatialHashParameters {
            threshold: 1.0,
            bucket_step: 0.01,
        }),
    );
    let extraction = extract_surface(&SinXzField, &parameters).unwrap();
    assert!(extraction.stats().welded_vertices < extraction.stats().raw_vertices);
}

#[test]
fn test_grid_point_welding_uses_fewer_vertices() {
    let parameters = Parameters::new(Vector3::new(5.0, 5.0, 5.0), 0.25);
    let spatial_hash = extract_surface(&SinXzField, &parameters).unwrap();
    let grid_point = extract_surface(
        &SinXzField,
        &parameters.clone().with_welding(WeldingStrategy::GridPoint),
    )
    .unwrap();

    assert_eq!(
        spatial_hash.stats().raw_triangles,
        grid_point.stats().raw_triangles
    );
    assert!(grid_point.stats().welded_vertices <= spatial_hash.stats().welded_vertices);
    assert_eq!(
        grid_point.mesh().triangles.len() + grid_point.stats().dropped_triangles,
        grid_point.stats().raw_triangles
    );
}
