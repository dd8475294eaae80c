//! Helper functions for the VTK file format

use std::fs::create_dir_all;
use std::path::Path;

use anyhow::Context;
use vtkio::IOBuffer;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType,
    UnstructuredGridPiece, Version, VertexNumbers, Vtk,
};

use crate::mesh::{TriMesh3d, WeldedMesh};
use crate::{Real, profile};

/// Conversion of meshes into VTK data sets
pub trait IntoVtkDataSet {
    fn into_dataset(self) -> DataSet;
}

impl<R: Real> From<&TriMesh3d<R>> for UnstructuredGridPiece {
    fn from(mesh: &TriMesh3d<R>) -> Self {
        let points = mesh
            .vertices
            .iter()
            .flat_map(|v| v.iter().map(|c| c.to_f64().unwrap_or(f64::NAN)))
            .collect::<Vec<_>>();

        let vertices = {
            let mut vertices = Vec::with_capacity(mesh.triangles.len() * (3 + 1));
            for triangle in mesh.triangles.iter() {
                vertices.push(3);
                vertices.extend_from_slice(triangle);
            }
            vertices
        };

        let cell_types = vec![CellType::Triangle; mesh.triangles.len()];

        UnstructuredGridPiece {
            points: IOBuffer::F64(points),
            cells: Cells {
                cell_verts: VertexNumbers::Legacy {
                    num_cells: cell_types.len() as u32,
                    vertices,
                },
                types: cell_types,
            },
            data: Attributes::new(),
        }
    }
}

impl<R: Real> IntoVtkDataSet for &TriMesh3d<R> {
    fn into_dataset(self) -> DataSet {
        DataSet::inline(UnstructuredGridPiece::from(self))
    }
}

impl<R: Real> IntoVtkDataSet for &WeldedMesh<R> {
    fn into_dataset(self) -> DataSet {
        let mut piece = UnstructuredGridPiece::from(&self.mesh);
        if let Some(normals) = &self.normals {
            let data = normals
                .iter()
                .flat_map(|n| n.iter().map(|c| c.to_f64().unwrap_or(f64::NAN)))
                .collect::<Vec<_>>();
            piece.data.point.push(Attribute::DataArray(DataArray {
                name: "normals".to_string(),
                elem: ElementType::Normals,
                data: IOBuffer::F64(data),
            }));
        }
        DataSet::inline(piece)
    }
}

/// Tries to write `data` that is convertible to a VTK `DataSet` into a big endian VTK file
pub fn write_vtk<P: AsRef<Path>>(
    data: impl IntoVtkDataSet,
    filename: P,
    title: &str,
) -> Result<(), anyhow::Error> {
    profile!("write_vtk");
    let vtk_file = Vtk {
        version: Version::new((4, 2)),
        title: title.to_string(),
        file_path: None,
        byte_order: ByteOrder::BigEndian,
        data: data.into_dataset(),
    };

    let filename = filename.as_ref();
    if let Some(dir) = filename.parent() {
        create_dir_all(dir).context("Failed to create parent directory of output file")?;
    }
    vtk_file
        .export_be(filename)
        .context("Error while writing VTK output to file")
}
