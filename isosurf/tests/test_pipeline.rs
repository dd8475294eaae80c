use isosurf::extract::FieldConfig;
use isosurf_lib::io::json_format;
use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::{Parameters, WeldingStrategy};

use all_asserts::{assert_gt, assert_le};
use std::path::Path;

fn run_extract(output_file: &Path, extra_args: &[&str]) -> Result<(), anyhow::Error> {
    let mut args = vec![
        "isosurf".to_string(),
        "-q".to_string(),
        "extract".to_string(),
        "-o".to_string(),
        output_file.to_string_lossy().into_owned(),
    ];
    args.extend(extra_args.iter().map(|a| a.to_string()));
    isosurf::cli::run_isosurf(args)
}

#[test]
fn test_basic_pipeline() -> Result<(), Box<dyn std::error::Error>> {
    let params = Parameters::<f64>::default();
    let field = FieldConfig::SinXz.build::<f64>()?;

    let result = isosurf::extraction_pipeline(field.as_ref(), &params, true)?;
    let extraction = &result.extraction;
    let raw_mesh = result
        .raw_mesh
        .as_ref()
        .expect("pipeline should produce a raw mesh");

    assert_eq!(extraction.stats().cells_visited, 125);
    assert_eq!(
        raw_mesh.triangles.len(),
        extraction.stats().raw_triangles,
        "Number of raw triangles should match the statistics"
    );
    assert_eq!(raw_mesh.vertices.len(), 3 * raw_mesh.triangles.len());
    assert_gt!(extraction.mesh().vertices.len(), 0);
    assert_le!(extraction.mesh().vertices.len(), raw_mesh.vertices.len());
    assert!(extraction.mesh().find_invalid_triangle().is_none());
    assert!(extraction.raw_mesh().is_none());

    // The raw mesh of the single grid walk is identical to a separate raw extraction
    assert_eq!(raw_mesh, &isosurf_lib::extract_raw_mesh(field.as_ref(), &params)?);

    Ok(())
}

#[test]
fn test_pipeline_grid_point_sphere() -> Result<(), Box<dyn std::error::Error>> {
    let params = Parameters::new(Vector3::repeat(6.0), 0.5).with_welding(WeldingStrategy::GridPoint);
    let field = FieldConfig::Sphere { radius: 2.0 }.build::<f32>()?;
    let params = params
        .try_convert::<f32>()
        .expect("parameters should be representable in single precision");

    let result = isosurf::extraction_pipeline(field.as_ref(), &params, false)?;
    let mesh = result.extraction.mesh();

    assert!(result.raw_mesh.is_none());
    assert!(result.extraction.normals().is_none());
    assert_gt!(mesh.triangles.len(), 0);
    for v in &mesh.vertices {
        assert!(
            (v.norm() - 2.0).abs() < 0.5,
            "Vertex {:?} should be close to the sphere surface",
            v
        );
    }

    Ok(())
}

#[test]
fn test_cli_writes_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let output_file = dir.path().join("plane.json");
    let raw_file = dir.path().join("plane_raw.json");

    run_extract(
        &output_file,
        &[
            "--field",
            "plane-y",
            "--mesh-size",
            "2.0",
            "2.0",
            "2.0",
            "--cell-size",
            "1.0",
            "--output-raw-file",
            raw_file.to_str().ok_or("non UTF-8 temp path")?,
        ],
    )?;

    let mesh = json_format::mesh_from_json::<f64, _>(&output_file)?;
    assert_eq!(mesh.mesh.vertices.len(), 9);
    assert_eq!(mesh.mesh.triangles.len(), 8);
    for v in &mesh.mesh.vertices {
        assert!(v.y.abs() < 1e-6, "Vertex {:?} should lie on the plane", v);
    }
    let normals = mesh
        .normals
        .expect("spatial hash welding should write normals");
    assert_eq!(normals.len(), 9);
    for n in &normals {
        assert!((n - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-6);
    }

    let raw_mesh = json_format::mesh_from_json::<f64, _>(&raw_file)?;
    assert_eq!(raw_mesh.mesh.vertices.len(), 24);
    assert_eq!(raw_mesh.mesh.triangles.len(), 8);
    assert!(raw_mesh.normals.is_none());

    Ok(())
}

#[test]
fn test_cli_writes_obj() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let output_file = dir.path().join("plane.obj");

    run_extract(
        &output_file,
        &[
            "--field",
            "plane-y",
            "--mesh-size",
            "2.0",
            "2.0",
            "2.0",
            "--welding",
            "grid-point",
            "--double-precision=on",
        ],
    )?;

    let content = std::fs::read_to_string(&output_file)?;
    let count = |prefix: &str| content.lines().filter(|l| l.starts_with(prefix)).count();
    assert_eq!(count("v "), 9);
    assert_eq!(count("vn "), 0);
    assert_eq!(count("f "), 8);

    Ok(())
}

#[test]
fn test_cli_refuses_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let output_file = dir.path().join("existing.obj");
    std::fs::write(&output_file, "keep")?;

    assert!(run_extract(&output_file, &[]).is_err());
    assert_eq!(std::fs::read_to_string(&output_file)?, "keep");

    run_extract(&output_file, &["--overwrite"])?;
    assert!(std::fs::read_to_string(&output_file)?.starts_with("v "));

    Ok(())
}

#[test]
fn test_cli_rejects_invalid_parameters() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let output_file = dir.path().join("too_small.obj");
    assert!(run_extract(&output_file, &["--cell-size", "0.001"]).is_err());
    assert!(!output_file.exists());

    let output_file = dir.path().join("negative.obj");
    assert!(run_extract(&output_file, &["--mesh-size", "1.0", "-1.0", "1.0"]).is_err());
    assert!(!output_file.exists());

    let output_file = dir.path().join("unknown.xyz");
    assert!(run_extract(&output_file, &["--field", "sphere"]).is_err());

    Ok(())
}
