//! Helper functions for the JSON file format
//!
//! Meshes are stored as a single object with flat arrays:
//! ```json
//! {"vertices": [[0.0, 0.0, 0.0], ...], "indices": [0, 1, 2, ...], "normals": [[0.0, 1.0, 0.0], ...]}
//! ```
//! The `normals` entry is omitted for meshes without normals.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, anyhow};
use nalgebra::Vector3;
use serde_json::{Value, json};

use crate::mesh::{TriMesh3d, WeldedMesh};
use crate::{Real, profile};

type CoordinatesF64 = Vec<[f64; 3]>;

fn to_coordinates<R: Real>(vectors: &[Vector3<R>]) -> Result<CoordinatesF64, anyhow::Error> {
    vectors
        .iter()
        .map(|v| {
            f64::try_convert_vec_from(v)
                .map(|c| [c.x, c.y, c.z])
                .ok_or_else(|| anyhow!("Failed to convert coordinate {:?} to f64", v))
        })
        .collect()
}

fn from_coordinates<R: Real>(coordinates: CoordinatesF64) -> Result<Vec<Vector3<R>>, anyhow::Error> {
    coordinates
        .into_iter()
        .map(|[x, y, z]| {
            R::try_convert_vec_from(&Vector3::new(x, y, z)).ok_or_else(|| {
                anyhow!("Failed to convert coordinate from input to output float type, value out of range?")
            })
        })
        .collect()
}

/// Converts the mesh into its JSON representation
pub fn mesh_to_json_value<R: Real>(mesh: &WeldedMesh<R>) -> Result<Value, anyhow::Error> {
    let mut value = json!({
        "vertices": to_coordinates(&mesh.mesh.vertices)?,
        "indices": mesh.mesh.indices(),
    });
    if let Some(normals) = &mesh.normals {
        value["normals"] = json!(to_coordinates(normals)?);
    }
    Ok(value)
}

/// Writes the mesh to a JSON file
pub fn mesh_to_json<R: Real, P: AsRef<Path>>(
    mesh: &WeldedMesh<R>,
    filename: P,
) -> Result<(), anyhow::Error> {
    profile!("mesh_to_json");

    let value = mesh_to_json_value(mesh)?;
    let file = File::create(filename).context("Failed to open file handle for writing JSON file")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &value).context("Failed to write JSON file")?;
    writer.flush().context("Failed to flush JSON file")?;
    Ok(())
}

/// Loads a mesh that was written by [mesh_to_json]
pub fn mesh_from_json<R: Real, P: AsRef<Path>>(
    json_file: P,
) -> Result<WeldedMesh<R>, anyhow::Error> {
    let file = File::open(json_file.as_ref()).context("Cannot open file for JSON parsing")?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .context("Reading of file to JSON structure failed. Not a valid JSON file.")?;
    mesh_from_json_value(value)
}

/// Converts the JSON representation back into a mesh
pub fn mesh_from_json_value<R: Real>(mut value: Value) -> Result<WeldedMesh<R>, anyhow::Error> {
    let mut take = |key: &str| value.get_mut(key).map(Value::take);

    let vertices = take("vertices").context("Missing \"vertices\" entry in JSON mesh")?;
    let vertices = serde_json::from_value::<CoordinatesF64>(vertices)
        .context("Parsing of mesh vertices failed, expected an array of coordinate triplets")?;
    let indices = take("indices").context("Missing \"indices\" entry in JSON mesh")?;
    let indices = serde_json::from_value::<Vec<u32>>(indices)
        .context("Parsing of mesh indices failed, expected an array of vertex indices")?;
    let normals = take("normals")
        .map(serde_json::from_value::<CoordinatesF64>)
        .transpose()
        .context("Parsing of mesh normals failed, expected an array of coordinate triplets")?;

    if indices.len() % 3 != 0 {
        return Err(anyhow!(
            "Number of indices ({}) is not a multiple of three",
            indices.len()
        ));
    }

    let mesh = TriMesh3d {
        vertices: from_coordinates(vertices)?,
        triangles: indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect(),
    };
    if let Some(invalid) = mesh.find_invalid_triangle() {
        return Err(anyhow!("Triangle {} references a vertex that does not exist", invalid));
    }

    Ok(WeldedMesh {
        mesh,
        normals: normals.map(from_coordinates::<R>).transpose()?,
    })
}
