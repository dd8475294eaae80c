use log::{info, trace};
use nalgebra::Vector3;

use crate::marching_cubes::triangulation::{
    TeeSink, TriangleSink, TriangleSoupSink, triangulate_cell,
};
use crate::marching_cubes::{CellCorners, CellEdgePoints};
use crate::mesh::{RawMesh, TriMesh3d, WeldedMesh};
use crate::welding::grid_point::GridPointWelder;
use crate::welding::weld_by_spatial_hash;
use crate::{
    ExtractionError, Parameters, Real, ScalarField, UniformGrid, WeldingStrategy, profile,
};

/// Counters collected during an extraction
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct ExtractionStats {
    /// Number of cells that were sampled and classified
    pub cells_visited: usize,
    /// Number of cells that are crossed by the surface
    pub active_cells: usize,
    /// Number of triangles emitted by the per-cell triangulation
    pub raw_triangles: usize,
    /// Number of vertices of the triangle soup (three per emitted triangle)
    pub raw_vertices: usize,
    /// Number of vertices after welding
    pub welded_vertices: usize,
    /// Number of triangles dropped by the degenerate triangle guard of the grid point welding
    pub dropped_triangles: usize,
}

/// Result of a surface extraction
#[derive(Clone, Debug)]
pub struct SurfaceExtraction<R: Real> {
    /// Background grid that was walked by marching cubes
    grid: UniformGrid<R>,
    /// The welded surface mesh
    mesh: WeldedMesh<R>,
    /// The unwelded triangle soup, only present if requested by the parameters
    raw_mesh: Option<RawMesh<R>>,
    /// Counters of the extraction
    stats: ExtractionStats,
}

impl<R: Real> SurfaceExtraction<R> {
    /// Returns the background grid that was walked by marching cubes
    pub fn grid(&self) -> &UniformGrid<R> {
        &self.grid
    }

    /// Returns the welded surface mesh
    pub fn mesh(&self) -> &TriMesh3d<R> {
        &self.mesh.mesh
    }

    /// Returns the vertex normals if they were computed by the welding strategy
    pub fn normals(&self) -> Option<&[Vector3<R>]> {
        self.mesh.normals.as_deref()
    }

    /// Returns the welded mesh together with its normals
    pub fn welded_mesh(&self) -> &WeldedMesh<R> {
        &self.mesh
    }

    /// Returns the unwelded triangle soup if [Parameters::keep_raw_mesh] was set
    pub fn raw_mesh(&self) -> Option<&RawMesh<R>> {
        self.raw_mesh.as_ref()
    }

    /// Moves the unwelded triangle soup out of the extraction
    pub fn take_raw_mesh(&mut self) -> Option<RawMesh<R>> {
        self.raw_mesh.take()
    }

    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Consumes the extraction and returns the welded mesh
    pub fn into_welded_mesh(self) -> WeldedMesh<R> {
        self.mesh
    }
}

/// Counters of the grid walk
#[derive(Copy, Clone, Default, Debug)]
struct MarchStats {
    cells_visited: usize,
    active_cells: usize,
    triangles: usize,
}

/// Extracts the isosurface of the scalar field and welds its vertices with the configured strategy
///
/// The field is sampled on a grid of cubic cells that covers a region of size `mesh_size` centered
/// at the origin. Cells are walked with x as the outermost and z as the innermost axis, so the
/// output is fully determined by the parameters and the field.
///
/// If [Parameters::keep_raw_mesh] is set, the triangle soup emitted during the same grid walk is
/// kept in the result as well, see [SurfaceExtraction::raw_mesh].
pub fn extract_surface<R: Real, F: ScalarField<R> + ?Sized>(
    field: &F,
    parameters: &Parameters<R>,
) -> Result<SurfaceExtraction<R>, ExtractionError<R>> {
    profile!("extract_surface");
    parameters.validate()?;

    let grid = UniformGrid::centered(&parameters.mesh_size, parameters.cell_size)?;
    log_grid_info(&grid);

    let iso_value = parameters.iso_surface_threshold;
    let (mesh, raw_mesh, march, dropped_triangles) = match &parameters.welding {
        WeldingStrategy::SpatialHash(spatial_hash) => {
            let mut raw_mesh = RawMesh::new();
            let march = march_cells(
                &grid,
                field,
                iso_value,
                &mut TriangleSoupSink::new(&mut raw_mesh),
            )?;
            let welded = weld_by_spatial_hash(&raw_mesh, spatial_hash)?;
            let mesh = WeldedMesh {
                mesh: welded.mesh,
                normals: Some(welded.normals),
            };
            (mesh, parameters.keep_raw_mesh.then_some(raw_mesh), march, 0)
        }
        WeldingStrategy::GridPoint => {
            let mut welder = GridPointWelder::new();
            let mut raw_mesh = parameters.keep_raw_mesh.then(RawMesh::new);
            let march = match raw_mesh.as_mut() {
                Some(raw_mesh) => {
                    let mut soup = TriangleSoupSink::new(raw_mesh);
                    march_cells(
                        &grid,
                        field,
                        iso_value,
                        &mut TeeSink::new(&mut welder, &mut soup),
                    )?
                }
                None => march_cells(&grid, field, iso_value, &mut welder)?,
            };
            let welded = welder.finish();
            let mesh = WeldedMesh {
                mesh: welded.mesh,
                normals: None,
            };
            (mesh, raw_mesh, march, welded.dropped_triangles)
        }
    };

    let stats = ExtractionStats {
        cells_visited: march.cells_visited,
        active_cells: march.active_cells,
        raw_triangles: march.triangles,
        raw_vertices: 3 * march.triangles,
        welded_vertices: mesh.mesh.vertices.len(),
        dropped_triangles,
    };

    info!(
        "Extracted surface with {} vertices and {} triangles ({} welding, {} raw vertices, {} of {} cells active).",
        stats.welded_vertices,
        mesh.mesh.triangles.len(),
        parameters.welding.name(),
        stats.raw_vertices,
        stats.active_cells,
        stats.cells_visited,
    );

    Ok(SurfaceExtraction {
        grid,
        mesh,
        raw_mesh,
        stats,
    })
}

/// Extracts the isosurface of the scalar field without welding, every triangle gets three fresh vertices
///
/// The welding strategy of the parameters is ignored.
pub fn extract_raw_mesh<R: Real, F: ScalarField<R> + ?Sized>(
    field: &F,
    parameters: &Parameters<R>,
) -> Result<RawMesh<R>, ExtractionError<R>> {
    profile!("extract_raw_mesh");
    parameters.validate()?;

    let grid = UniformGrid::centered(&parameters.mesh_size, parameters.cell_size)?;
    log_grid_info(&grid);

    let mut raw_mesh = RawMesh::new();
    march_cells(
        &grid,
        field,
        parameters.iso_surface_threshold,
        &mut TriangleSoupSink::new(&mut raw_mesh),
    )?;

    Ok(raw_mesh)
}

/// Walks all cells of the grid and emits the triangles of every active cell into the sink
fn march_cells<R: Real, F: ScalarField<R> + ?Sized, S: TriangleSink<R>>(
    grid: &UniformGrid<R>,
    field: &F,
    iso_value: R,
    sink: &mut S,
) -> Result<MarchStats, ExtractionError<R>> {
    profile!("march_cells");

    let mut stats = MarchStats::default();
    for cell in grid.cells() {
        stats.cells_visited += 1;

        let corners = CellCorners::sample_cell(grid, &cell, field);
        let case = corners.classify(iso_value);
        if case.is_trivial() {
            continue;
        }

        stats.active_cells += 1;
        let edge_points = CellEdgePoints::compute(&corners, case, iso_value);
        stats.triangles += triangulate_cell(&cell, case, &edge_points, sink)?;
    }

    trace!(
        "Marching cubes visited {} cells, {} were active and emitted {} triangles",
        stats.cells_visited, stats.active_cells, stats.triangles
    );

    Ok(stats)
}

fn log_grid_info<R: Real>(grid: &UniformGrid<R>) {
    info!(
        "Using a grid with {:?}x{:?}x{:?} points and {:?}x{:?}x{:?} cells of edge length {}.",
        grid.points_per_dim()[0],
        grid.points_per_dim()[1],
        grid.points_per_dim()[2],
        grid.cells_per_dim()[0],
        grid.cells_per_dim()[1],
        grid.cells_per_dim()[2],
        grid.cell_size()
    );
    info!("The resulting domain size is: {:?}", grid.aabb());
}
