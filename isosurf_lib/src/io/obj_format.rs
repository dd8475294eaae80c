//! Helper functions for the OBJ file format

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::mesh::WeldedMesh;
use crate::{Real, profile};

/// Writes the mesh to an OBJ file, normals are written as `vn` lines if the mesh has normals
pub fn mesh_to_obj<R: Real, P: AsRef<Path>>(
    mesh: &WeldedMesh<R>,
    filename: P,
) -> Result<(), anyhow::Error> {
    profile!("mesh_to_obj");

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(filename)
        .context("Failed to open file handle for writing OBJ file")?;
    let mut writer = BufWriter::with_capacity(100000, file);

    write_obj(mesh, &mut writer)?;
    writer.flush().context("Failed to flush OBJ file")?;
    Ok(())
}

/// Writes the mesh in OBJ format to the given writer
pub fn write_obj<R: Real, W: Write>(mesh: &WeldedMesh<R>, writer: &mut W) -> Result<(), anyhow::Error> {
    for v in &mesh.mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    if let Some(normals) = &mesh.normals {
        for n in normals {
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    let with_normals = mesh.normals.is_some();
    for [a, b, c] in mesh.mesh.triangles.iter().map(|tri| tri.map(|i| i + 1)) {
        if with_normals {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }

    Ok(())
}
