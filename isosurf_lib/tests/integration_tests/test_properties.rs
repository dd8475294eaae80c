use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::{ConstantField, SinXzField, SphereField};
use isosurf_lib::{
    ExtractionError, ParameterError, Parameters, SpatialHashParameters, WeldingStrategy,
    extract_raw_mesh, extract_surface,
};

fn sin_xz_params(cell_size: f64, welding: WeldingStrategy<f64>) -> Parameters<f64> {
    Parameters::new(Vector3::new(5.0, 5.0, 5.0), cell_size).with_welding(welding)
}

fn strategies() -> [WeldingStrategy<f64>; 2] {
    [
        WeldingStrategy::SpatialHash(SpatialHashParameters::default()),
        WeldingStrategy::GridPoint,
    ]
}

#[test]
fn test_extraction_is_deterministic() {
    for welding in strategies() {
        let parameters = sin_xz_params(0.25, welding);
        let first = extract_surface(&SinXzField, &parameters).unwrap();
        let second = extract_surface(&SinXzField, &parameters).unwrap();

        assert_eq!(first.mesh().vertices, second.mesh().vertices);
        assert_eq!(first.mesh().indices(), second.mesh().indices());
        assert_eq!(first.normals(), second.normals());
        assert_eq!(first.stats(), second.stats());
    }
}

#[test]
fn test_mesh_invariants_sin_xz() {
    for cell_size in [1.0, 0.5, 0.1] {
        for welding in strategies() {
            let extraction = extract_surface(&SinXzField, &sin_xz_params(cell_size, welding)).unwrap();
            let mesh = extraction.mesh();
            let stats = extraction.stats();

            assert!(!mesh.triangles.is_empty());
            assert_eq!(mesh.indices().len() % 3, 0);
            assert_eq!(mesh.indices().len(), 3 * mesh.triangles.len());
            assert!(
                mesh.indices()
                    .iter()
                    .all(|&i| (i as usize) < mesh.vertices.len())
            );
            assert!(stats.welded_vertices <= stats.raw_vertices);
            assert!(2 * stats.welded_vertices < stats.raw_vertices, "welding merged too few vertices");
            assert_eq!(stats.raw_vertices, 3 * stats.raw_triangles);
            assert_eq!(
                mesh.triangles.len() + stats.dropped_triangles,
                stats.raw_triangles
            );
            assert!(stats.active_cells <= stats.cells_visited);
        }
    }
}

#[test]
fn test_welded_vertices_lie_within_grid() {
    for welding in strategies() {
        let extraction = extract_surface(&SinXzField, &sin_xz_params(0.5, welding)).unwrap();
        let aabb = extraction.grid().aabb().clone();
        for v in &extraction.mesh().vertices {
            assert!(aabb.contains_point(v), "{:?} outside of {:?}", v, aabb);
        }
    }
}

#[test]
fn test_normals_are_unit_length() {
    let extraction = extract_surface(
        &SinXzField,
        &sin_xz_params(0.25, WeldingStrategy::SpatialHash(Default::default())),
    )
    .unwrap();

    let normals = extraction.normals().unwrap();
    assert_eq!(normals.len(), extraction.mesh().vertices.len());
    for n in normals {
        let norm = n.norm();
        assert!((norm - 1.0).abs() < 1e-9 || norm == 0.0);
    }
}

#[test]
fn test_raw_mesh_is_triangle_soup() {
    let raw = extract_raw_mesh(&SinXzField, &sin_xz_params(0.5, WeldingStrategy::GridPoint)).unwrap();
    assert_eq!(raw.vertices.len(), 3 * raw.triangles.len());
    for (i, tri) in raw.triangles.iter().enumerate() {
        let base = 3 * i as u32;
        assert_eq!(tri, &[base, base + 1, base + 2]);
    }

    let welded =
        extract_surface(&SinXzField, &sin_xz_params(0.5, WeldingStrategy::GridPoint)).unwrap();
    assert_eq!(welded.stats().raw_vertices, raw.vertices.len());
}

#[test]
fn test_raw_mesh_is_kept_from_the_same_walk() {
    for welding in strategies() {
        let parameters = sin_xz_params(0.5, welding);
        let separate = extract_raw_mesh(&SinXzField, &parameters).unwrap();

        let without = extract_surface(&SinXzField, &parameters).unwrap();
        assert!(without.raw_mesh().is_none());

        let mut with = extract_surface(&SinXzField, &parameters.clone().with_raw_mesh(true)).unwrap();
        assert_eq!(with.mesh(), without.mesh());
        assert_eq!(with.stats(), without.stats());

        let kept = with.take_raw_mesh().unwrap();
        assert_eq!(kept.triangles.len(), with.stats().raw_triangles);
        assert_eq!(kept, separate);
        assert!(with.raw_mesh().is_none());
    }
}

#[test]
fn test_constant_field_produces_empty_mesh() {
    for value in [1.0, -1.0] {
        for welding in strategies() {
            let extraction =
                extract_surface(&ConstantField(value), &sin_xz_params(0.5, welding)).unwrap();
            assert!(extraction.mesh().vertices.is_empty());
            assert!(extraction.mesh().indices().is_empty());
            assert_eq!(extraction.stats().active_cells, 0);
            assert_eq!(extraction.stats().cells_visited, 1000);
        }
    }
}

#[test]
fn test_region_smaller_than_cell_produces_empty_mesh() {
    for welding in strategies() {
        for mesh_size in [Vector3::new(0.5, 3.0, 3.0), Vector3::repeat(0.999995)] {
            let parameters = Parameters::new(mesh_size, 1.0).with_welding(welding.clone());
            let extraction = extract_surface(&SinXzField, &parameters).unwrap();
            assert!(extraction.grid().is_empty());
            assert_eq!(extraction.stats().cells_visited, 0);
            assert!(extraction.mesh().vertices.is_empty());
            assert!(extraction.mesh().triangles.is_empty());
        }
    }
}

#[test]
fn test_nan_samples_produce_finite_vertices() {
    // The field is undefined beyond x = 0.9, the plane y = 0 ends there
    let field = |p: &Vector3<f64>| if p.x > 0.9 { f64::NAN } else { -p.y };

    for welding in strategies() {
        let parameters = Parameters::new(Vector3::repeat(4.0), 0.5).with_welding(welding);
        let extraction = extract_surface(&field, &parameters).unwrap();
        let mesh = extraction.mesh();

        assert!(!mesh.triangles.is_empty());
        assert!(mesh.find_invalid_triangle().is_none());
        for v in &mesh.vertices {
            assert!(v.iter().all(|c| c.is_finite()), "vertex {:?} is not finite", v);
            assert!(v.x <= 1.0 + 1e-12);
        }
        if let Some(normals) = extraction.normals() {
            assert_eq!(normals.len(), mesh.vertices.len());
        }
    }
}

#[test]
fn test_sphere_is_closed() {
    let sphere = SphereField::<f64> {
        center: Vector3::new(0.1, -0.05, 0.02),
        radius: 1.5,
    };
    let parameters = Parameters::new(Vector3::new(4.0, 4.0, 4.0), 0.2);
    let extraction = extract_surface(&sphere, &parameters).unwrap();
    let mesh = extraction.mesh();

    // Every vertex of a welded closed surface is shared by several triangles
    let mut valence = vec![0usize; mesh.vertices.len()];
    for &i in mesh.indices() {
        valence[i as usize] += 1;
    }
    assert!(valence.iter().all(|&n| n >= 3));

    for v in &mesh.vertices {
        let distance = (v - sphere.center).norm();
        assert!((distance - sphere.radius).abs() < 0.05);
    }
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let invalid = [
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), 0.0),
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), -1.0),
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), 0.001),
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), f64::NAN),
        Parameters::new(Vector3::new(5.0, 0.0, 5.0), 1.0),
        Parameters::new(Vector3::new(5.0, -2.0, 5.0), 1.0),
        Parameters::new(Vector3::new(5.0, 5.0, f64::INFINITY), 1.0),
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), 1.0).with_iso_surface_threshold(f64::NAN),
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), 1.0).with_welding(
            WeldingStrategy::SpatialHash(SpatialHashParameters {
                threshold: -1e-4,
                bucket_step: 0.03,
            }),
        ),
        Parameters::new(Vector3::new(5.0, 5.0, 5.0), 1.0).with_welding(
            WeldingStrategy::SpatialHash(SpatialHashParameters {
                threshold: 1e-4,
                bucket_step: 0.0,
            }),
        ),
    ];

    for parameters in &invalid {
        assert!(
            matches!(
                extract_surface(&SinXzField, parameters),
                Err(ExtractionError::InvalidConfiguration(_))
            ),
            "{:?} was not rejected",
            parameters
        );
        assert!(matches!(
            extract_raw_mesh(&SinXzField, parameters),
            Err(ExtractionError::InvalidConfiguration(_))
        ));
    }

    assert!(matches!(
        extract_surface(&SinXzField, &invalid[2]),
        Err(ExtractionError::InvalidConfiguration(
            ParameterError::InvalidCellSize(_)
        ))
    ));
}

#[test]
fn test_single_and_double_precision_agree() {
    let parameters = sin_xz_params(0.5, WeldingStrategy::GridPoint);
    let extraction_f64 = extract_surface(&SinXzField, &parameters).unwrap();
    let extraction_f32 =
        extract_surface(&SinXzField, &parameters.try_convert::<f32>().unwrap()).unwrap();

    // Samples at the grid points are far from the isovalue, so the classification agrees
    assert_eq!(
        extraction_f64.stats().active_cells,
        extraction_f32.stats().active_cells
    );
    assert_eq!(
        extraction_f64.stats().raw_triangles,
        extraction_f32.stats().raw_triangles
    );
}
