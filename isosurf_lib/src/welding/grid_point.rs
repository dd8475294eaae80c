use log::trace;
use nalgebra::Vector3;

use crate::marching_cubes::EdgePoint;
use crate::marching_cubes::triangulation::TriangleSink;
use crate::mesh::TriMesh3d;
use crate::uniform_grid::{CellIndex, PointIndex};
use crate::{ExtractionError, MapType, Real, new_map};

/// Result of the grid point welding
#[derive(Clone, Debug)]
pub struct GridPointWelding<R: Real> {
    /// The mesh with merged vertices placed at the mean of their edge crossings
    pub mesh: TriMesh3d<R>,
    /// Grid point that each vertex of the mesh was keyed by
    pub vertex_keys: Vec<PointIndex>,
    /// Number of triangles that were dropped because two of their vertices mapped to the same grid point
    pub dropped_triangles: usize,
}

/// Running sum of all edge crossings that were mapped to a vertex
#[derive(Copy, Clone, Debug)]
struct Satellites<R: Real> {
    sum: Vector3<R>,
    count: usize,
}

/// Triangle sink that welds vertices by the grid point nearest to their edge crossing
///
/// The first crossing mapped to a grid point allocates the vertex, all later crossings mapped to
/// the same grid point reuse it. The final vertex position is the mean of all crossings mapped to it.
pub(crate) struct GridPointWelder<R: Real> {
    mesh: TriMesh3d<R>,
    vertex_indices: MapType<PointIndex, u32>,
    vertex_keys: Vec<PointIndex>,
    satellites: Vec<Satellites<R>>,
    dropped_triangles: usize,
}

impl<R: Real> GridPointWelder<R> {
    pub(crate) fn new() -> Self {
        Self {
            mesh: TriMesh3d::new(),
            vertex_indices: new_map(),
            vertex_keys: Vec::new(),
            satellites: Vec::new(),
            dropped_triangles: 0,
        }
    }

    /// Returns the index of the vertex keyed by the grid point and adds the crossing to its satellites
    fn vertex_for(
        &mut self,
        key: PointIndex,
        position: &Vector3<R>,
    ) -> Result<u32, ExtractionError<R>> {
        if let Some(&index) = self.vertex_indices.get(&key) {
            let satellites = &mut self.satellites[index as usize];
            satellites.sum += position;
            satellites.count += 1;
            return Ok(index);
        }

        let index = self.mesh.push_vertex(*position)?;
        self.vertex_indices.insert(key, index);
        self.vertex_keys.push(key);
        self.satellites.push(Satellites {
            sum: *position,
            count: 1,
        });
        Ok(index)
    }

    /// Moves every vertex to the mean of its satellites and returns the welded mesh
    pub(crate) fn finish(self) -> GridPointWelding<R> {
        let Self {
            mut mesh,
            vertex_keys,
            satellites,
            dropped_triangles,
            ..
        } = self;

        for (vertex, satellites) in mesh.vertices.iter_mut().zip(satellites.iter()) {
            *vertex = satellites.sum / R::from_usize(satellites.count).unwrap_or_else(R::one);
        }

        trace!(
            "Grid point welding produced {} vertices and {} triangles, dropped {} degenerate triangles",
            mesh.vertices.len(),
            mesh.triangles.len(),
            dropped_triangles
        );

        GridPointWelding {
            mesh,
            vertex_keys,
            dropped_triangles,
        }
    }
}

impl<R: Real> TriangleSink<R> for GridPointWelder<R> {
    fn push_triangle(
        &mut self,
        cell: &CellIndex,
        vertices: [&EdgePoint<R>; 3],
    ) -> Result<(), ExtractionError<R>> {
        let keys = vertices.map(|v| cell.corner_point(v.nearest_corner));

        // Drop the triangle before any vertex is registered
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[0] == keys[2] {
            self.dropped_triangles += 1;
            return Ok(());
        }

        let triangle = [
            self.vertex_for(keys[0], &vertices[0].position)?,
            self.vertex_for(keys[1], &vertices[1].position)?,
            self.vertex_for(keys[2], &vertices[2].position)?,
        ];
        self.mesh.push_triangle(triangle);
        Ok(())
    }
}
