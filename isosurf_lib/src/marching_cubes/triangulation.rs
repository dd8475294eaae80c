use anyhow::Context;

use crate::marching_cubes::{CellEdgePoints, EdgePoint, MarchingCubesCase};
use crate::mesh::RawMesh;
use crate::uniform_grid::CellIndex;
use crate::{ExtractionError, Real};

/// Trait used by [triangulate_cell] to turn the triangles of a cell into mesh connectivity
pub(crate) trait TriangleSink<R: Real> {
    /// Consumes one triangle of the given cell, vertices are in the winding order of the lookup table
    fn push_triangle(
        &mut self,
        cell: &CellIndex,
        vertices: [&EdgePoint<R>; 3],
    ) -> Result<(), ExtractionError<R>>;
}

/// Sink that appends three new vertices for every triangle (the raw triangle soup)
pub(crate) struct TriangleSoupSink<'a, R: Real> {
    mesh: &'a mut RawMesh<R>,
}

impl<'a, R: Real> TriangleSoupSink<'a, R> {
    pub(crate) fn new(mesh: &'a mut RawMesh<R>) -> Self {
        Self { mesh }
    }
}

impl<R: Real> TriangleSink<R> for TriangleSoupSink<'_, R> {
    #[inline(always)]
    fn push_triangle(
        &mut self,
        _cell: &CellIndex,
        vertices: [&EdgePoint<R>; 3],
    ) -> Result<(), ExtractionError<R>> {
        let [a, b, c] = vertices;
        let triangle = [
            self.mesh.push_vertex(a.position)?,
            self.mesh.push_vertex(b.position)?,
            self.mesh.push_vertex(c.position)?,
        ];
        self.mesh.push_triangle(triangle);
        Ok(())
    }
}

/// Sink that forwards every triangle to two other sinks
pub(crate) struct TeeSink<'a, A, B> {
    first: &'a mut A,
    second: &'a mut B,
}

impl<'a, A, B> TeeSink<'a, A, B> {
    pub(crate) fn new(first: &'a mut A, second: &'a mut B) -> Self {
        Self { first, second }
    }
}

impl<R: Real, A: TriangleSink<R>, B: TriangleSink<R>> TriangleSink<R> for TeeSink<'_, A, B> {
    #[inline(always)]
    fn push_triangle(
        &mut self,
        cell: &CellIndex,
        vertices: [&EdgePoint<R>; 3],
    ) -> Result<(), ExtractionError<R>> {
        self.first.push_triangle(cell, vertices)?;
        self.second.push_triangle(cell, vertices)
    }
}

/// Emits all triangles of the case into the sink, returns the number of emitted triangles
#[inline]
pub(crate) fn triangulate_cell<R: Real, S: TriangleSink<R>>(
    cell: &CellIndex,
    case: MarchingCubesCase,
    edge_points: &CellEdgePoints<R>,
    sink: &mut S,
) -> Result<usize, ExtractionError<R>> {
    let mut num_triangles = 0;
    for edge_indices in case.triangles() {
        let vertices = get_triangle(edge_points, edge_indices).with_context(|| {
            format!(
                "Failed to triangulate cell {:?} (case {})",
                cell.index(),
                case.index()
            )
        })?;
        sink.push_triangle(cell, vertices)?;
        num_triangles += 1;
    }

    Ok(num_triangles)
}

/// Helper function that looks up the edge points of the triangle with the given local edge indices
fn get_triangle<R: Real>(
    edge_points: &CellEdgePoints<R>,
    edge_indices: [usize; 3],
) -> Result<[&EdgePoint<R>; 3], anyhow::Error> {
    let get_vertex = |edge: usize| {
        edge_points.get(edge).with_context(|| {
            format!(
                "Missing iso surface vertex at edge {}. This is a bug.",
                edge
            )
        })
    };

    let [e0, e1, e2] = edge_indices;
    Ok([get_vertex(e0)?, get_vertex(e1)?, get_vertex(e2)?])
}
