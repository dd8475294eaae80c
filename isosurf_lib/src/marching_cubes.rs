//! Per-cell building blocks of the marching cubes algorithm
//!
//! A cell is processed in four steps: its eight corners are sampled ([CellCorners]), the samples
//! are classified against the isovalue ([MarchingCubesCase]), the surface crossings on the edges
//! are interpolated ([CellEdgePoints]) and finally the triangles of the case are emitted using the
//! lookup tables in [marching_cubes_lut].

use nalgebra::Vector3;

use crate::marching_cubes::marching_cubes_lut::{
    CELL_CORNER_OFFSETS, marching_cubes_edge_mask, marching_cubes_triangulation_iter_for_case,
};
use crate::uniform_grid::{CellIndex, UniformGrid};
use crate::{Real, ScalarField};

mod interpolation;
pub mod marching_cubes_lut;
pub(crate) mod triangulation;

pub use interpolation::{
    CellEdgePoints, EDGE_INTERPOLATION_EPSILON, EdgePoint, interpolate_edge, nearest_corner,
};

/// Returns the positions of the eight corners of the cube with the given origin and edge length
///
/// ```
/// use isosurf_lib::marching_cubes::cube_corners;
/// use isosurf_lib::nalgebra::Vector3;
///
/// let corners = cube_corners(&Vector3::new(1.0, 2.0, 3.0), 0.5);
/// assert_eq!(corners[0], Vector3::new(1.0, 2.0, 3.0));
/// assert_eq!(corners[2], Vector3::new(1.5, 2.0, 3.5));
/// assert_eq!(corners[7], Vector3::new(1.0, 2.5, 3.5));
/// ```
pub fn cube_corners<R: Real>(origin: &Vector3<R>, cell_size: R) -> [Vector3<R>; 8] {
    CELL_CORNER_OFFSETS.map(|[dx, dy, dz]| {
        origin + Vector3::new(cell_size.times(dx), cell_size.times(dy), cell_size.times(dz))
    })
}

/// Positions and field samples of the eight corners of a cell
#[derive(Clone, PartialEq, Debug)]
pub struct CellCorners<R: Real> {
    /// Corner positions in local corner order
    pub positions: [Vector3<R>; 8],
    /// Field samples at the corner positions
    pub values: [R; 8],
}

impl<R: Real> CellCorners<R> {
    /// Samples the field at the corners of the cube with the given origin and edge length
    pub fn sample<F: ScalarField<R> + ?Sized>(origin: &Vector3<R>, cell_size: R, field: &F) -> Self {
        Self::from_positions(cube_corners(origin, cell_size), field)
    }

    /// Samples the field at the corners of a cell of the grid
    ///
    /// Corner positions are computed from the global grid point indices, so corners shared with
    /// neighboring cells have identical positions and samples.
    pub fn sample_cell<F: ScalarField<R> + ?Sized>(
        grid: &UniformGrid<R>,
        cell: &CellIndex,
        field: &F,
    ) -> Self {
        let positions = cell
            .corner_points()
            .map(|point| grid.point_coordinates(&point));
        Self::from_positions(positions, field)
    }

    fn from_positions<F: ScalarField<R> + ?Sized>(positions: [Vector3<R>; 8], field: &F) -> Self {
        let values = positions.each_ref().map(|p| field.evaluate(p));
        Self { positions, values }
    }

    /// Classifies the corner samples against the isovalue
    pub fn classify(&self, iso_value: R) -> MarchingCubesCase {
        MarchingCubesCase::classify(&self.values, iso_value)
    }
}

/// One of the 256 marching cubes cases of a cell
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MarchingCubesCase(u8);

impl MarchingCubesCase {
    /// Classifies the corner samples, corner `i` sets bit `i` if its sample is strictly below the isovalue
    ///
    /// A sample that is NaN never compares below the isovalue and therefore counts as outside.
    pub fn classify<R: Real>(values: &[R; 8], iso_value: R) -> Self {
        Self(
            values
                .iter()
                .enumerate()
                .fold(0, |case, (i, v)| case | (((*v < iso_value) as u8) << i)),
        )
    }

    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// The case index in `0..256`
    pub fn index(&self) -> u8 {
        self.0
    }

    /// Mask of the edges crossed by the surface, bit `e` corresponds to local edge `e`
    pub fn edge_mask(&self) -> u16 {
        marching_cubes_edge_mask(self.0)
    }

    /// Returns whether the surface crosses the given local edge
    pub fn is_edge_crossed(&self, edge: usize) -> bool {
        self.edge_mask() & (1 << edge) != 0
    }

    /// Returns whether the surface does not pass through the cell
    pub fn is_trivial(&self) -> bool {
        self.edge_mask() == 0
    }

    /// Iterator over the triangles of this case as triplets of local edge indices
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> {
        marching_cubes_triangulation_iter_for_case(self.0)
    }
}
