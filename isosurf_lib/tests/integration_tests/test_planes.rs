use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::PlaneField;
use isosurf_lib::{Parameters, Real, ScalarField, WeldingStrategy, extract_surface};

fn params<R: Real>(extent: f64, cell_size: f64, welding: WeldingStrategy<R>) -> Parameters<R> {
    Parameters::new(
        Vector3::repeat(R::from_f64(extent).unwrap()),
        R::from_f64(cell_size).unwrap(),
    )
    .with_welding(welding)
}

fn check_planar_mesh<R: Real, F: ScalarField<R>>(
    field: &F,
    welding: WeldingStrategy<R>,
    expected_normal_y: f64,
) {
    let extraction = extract_surface(field, &params(2.0, 1.0, welding)).unwrap();
    let mesh = extraction.mesh();
    let stats = extraction.stats();

    assert_eq!(stats.cells_visited, 8, "Number of visited cells");
    assert_eq!(stats.active_cells, 4, "Number of active cells");
    assert_eq!(stats.raw_triangles, 8, "Number of raw triangles");
    assert_eq!(stats.raw_vertices, 24, "Number of raw vertices");
    assert_eq!(mesh.triangles.len(), 8, "Number of triangles");
    assert_eq!(mesh.vertices.len(), 9, "Number of welded vertices");
    assert_eq!(mesh.indices().len(), 24);
    assert_eq!(mesh.find_invalid_triangle(), None);

    let eps = R::from_f64(1e-5).unwrap();
    for v in &mesh.vertices {
        assert!(v.y.abs() < eps, "vertex {:?} is not on the plane", v);
    }

    // Vertices form the regular 3x3 lattice of the grid points at y = 0
    for x in [-1.0, 0.0, 1.0] {
        for z in [-1.0, 0.0, 1.0] {
            let p = Vector3::new(x, 0.0, z).map(|c| R::from_f64(c).unwrap());
            assert!(
                mesh.vertices.iter().any(|v| (v - p).norm() < eps),
                "missing vertex at {:?}",
                p
            );
        }
    }

    for tri in &mesh.triangles {
        let n = mesh.face_normal_unnormalized(tri);
        assert!(n.y.to_f64().unwrap() * expected_normal_y > 0.0);
        assert!(n.x.abs() < eps && n.z.abs() < eps);
    }
}

#[test]
fn test_plane_below_isovalue_above_xz_spatial_hash() {
    check_planar_mesh::<f64, _>(
        &PlaneField::y_up(),
        WeldingStrategy::SpatialHash(Default::default()),
        -1.0,
    );
}

#[test]
fn test_plane_below_isovalue_above_xz_grid_point() {
    check_planar_mesh::<f64, _>(&PlaneField::y_up(), WeldingStrategy::GridPoint, -1.0);
}

#[test]
fn test_plane_below_isovalue_above_xz_f32() {
    check_planar_mesh::<f32, _>(
        &PlaneField::y_up(),
        WeldingStrategy::SpatialHash(Default::default()),
        -1.0,
    );
    check_planar_mesh::<f32, _>(&PlaneField::y_up(), WeldingStrategy::GridPoint, -1.0);
}

#[test]
fn test_plane_below_isovalue_under_xz() {
    let field = |p: &Vector3<f64>| p.y;
    check_planar_mesh(
        &field,
        WeldingStrategy::SpatialHash(Default::default()),
        1.0,
    );
    check_planar_mesh(&field, WeldingStrategy::GridPoint, 1.0);
}

#[test]
fn test_plane_cases_per_layer() {
    use isosurf_lib::marching_cubes::CellCorners;
    use isosurf_lib::uniform_grid::UniformGrid;

    let grid = UniformGrid::centered(&Vector3::new(2.0, 2.0, 2.0), 1.0).unwrap();
    let field = |p: &Vector3<f64>| p.y;

    for cell in grid.cells() {
        let case = CellCorners::sample_cell(&grid, &cell, &field).classify(0.0);
        if cell.index()[1] == 0 {
            assert_eq!(case.index(), 15);
            assert_ne!(case.edge_mask(), 0);
        } else {
            assert_eq!(case.index(), 0);
        }
    }
}

#[test]
fn test_spatial_hash_normals_of_plane() {
    let extraction = extract_surface(
        &PlaneField::y_up(),
        &params::<f64>(2.0, 1.0, WeldingStrategy::SpatialHash(Default::default())),
    )
    .unwrap();

    let normals = extraction.normals().unwrap();
    assert_eq!(normals.len(), extraction.mesh().vertices.len());
    for n in normals {
        assert!((n - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-12);
    }
}

#[test]
fn test_grid_point_welding_has_no_normals() {
    let extraction = extract_surface(
        &PlaneField::y_up(),
        &params::<f64>(2.0, 1.0, WeldingStrategy::GridPoint),
    )
    .unwrap();

    assert!(extraction.normals().is_none());
    assert_eq!(extraction.stats().dropped_triangles, 0);
}
