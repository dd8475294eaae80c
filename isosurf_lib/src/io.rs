//! Convenience functions for exporting extracted meshes to various file formats

use std::path::Path;

use anyhow::anyhow;

use crate::Real;
use crate::mesh::WeldedMesh;

pub mod json_format;
pub mod obj_format;
pub mod vtk_format;

/// Writes the mesh to a file, the format is chosen by the file extension (`obj`, `vtk` or `json`)
pub fn write_mesh<R: Real, P: AsRef<Path>>(
    mesh: &WeldedMesh<R>,
    filename: P,
) -> Result<(), anyhow::Error> {
    let filename = filename.as_ref();
    let extension = filename
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            anyhow!(
                "Unable to detect file format of output file \"{}\" (missing file extension)",
                filename.display()
            )
        })?;

    match extension.as_str() {
        "obj" => obj_format::mesh_to_obj(mesh, filename),
        "vtk" => vtk_format::write_vtk(mesh, filename, "isosurf mesh"),
        "json" => json_format::mesh_to_json(mesh, filename),
        _ => Err(anyhow!(
            "Unsupported file format extension \"{}\" of output file \"{}\"",
            extension,
            filename.display()
        )),
    }
}
