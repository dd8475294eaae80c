use itertools::iproduct;
use nalgebra::Vector3;
use thiserror::Error as ThisError;

use crate::marching_cubes::marching_cubes_lut::CELL_CORNER_OFFSETS;
use crate::{Aabb3d, Real};

/*
 * Cube description (z points into the page):
 *         7 ________ 6
 *         /|       /|          y
 *       /  |     /  |          |
 *   4 /_______ /    |          |___ x
 *    |     |  |5    |         /
 *    |    3|__|_____|2       z
 *    |    /   |    /
 *    |  /     |  /
 *    |/_______|/
 *   0          1
 */

/// Multiple of the machine epsilon by which the far face of the last cell may pass the sampled region
pub const CELL_COUNT_ULPS: usize = 16;

/// An index triplet of a point in the grid (index along each axis)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PointIndex {
    index: [usize; 3],
}

/// An index triplet of a cell in the grid (index along each axis)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CellIndex {
    index: [usize; 3],
}

impl PointIndex {
    pub fn from_ijk(index: [usize; 3]) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &[usize; 3] {
        &self.index
    }
}

impl CellIndex {
    pub fn from_ijk(index: [usize; 3]) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &[usize; 3] {
        &self.index
    }

    /// Returns the grid point of the given local corner (`0..8`) of this cell
    #[inline(always)]
    pub fn corner_point(&self, local_corner: usize) -> PointIndex {
        let [i, j, k] = self.index;
        let [di, dj, dk] = CELL_CORNER_OFFSETS[local_corner];
        PointIndex::from_ijk([i + di, j + dj, k + dk])
    }

    /// Returns the grid points of all corners of this cell in local corner order
    pub fn corner_points(&self) -> [PointIndex; 8] {
        std::array::from_fn(|corner| self.corner_point(corner))
    }
}

/// Regular grid of cubic cells used as the background grid for marching cubes
///
/// The grid starts at the min coordinate of its AABB and consists of `n_cells_per_dim` cells
/// along each axis. Point coordinates are always computed from their global index so corners
/// shared by adjacent cells have bit-identical coordinates.
#[derive(Clone, PartialEq, Debug)]
pub struct UniformGrid<R: Real> {
    /// AABB spanned by the cells of the grid
    aabb: Aabb3d<R>,
    /// Edge length of the cubic cells
    cell_size: R,
    /// Number of cells along each axis
    n_cells_per_dim: [usize; 3],
}

/// Error type for the construction of a [UniformGrid]
#[rustfmt::skip]
#[derive(Copy, Clone, PartialEq, Debug, ThisError)]
pub enum GridConstructionError<R: Real> {
    /// The cell size is invalid, it has to be finite and larger than zero
    #[error("invalid cell size `{0}` supplied, cell size has to be larger than zero")]
    InvalidCellSize(R),
    /// The extents of the sampled region are invalid
    #[error("invalid extents `{0:?}` supplied, every extent has to be finite and larger than zero")]
    InvalidExtents(Vector3<R>),
    /// The number of cells cannot be represented
    #[error("the number of cells per dimension cannot be represented by usize")]
    IndexTypeTooSmallCellsPerDim,
    /// The total number of grid points cannot be represented
    #[error("the total number of grid points cannot be represented by usize")]
    IndexTypeTooSmallTotalPoints,
}

impl<R: Real> UniformGrid<R> {
    /// Constructs the grid sampling a region of the given extents centered at the origin
    ///
    /// Along every axis the cells start at `-size/2` and a cell is part of the grid if its far face
    /// does not exceed `size/2`. Only rounding errors of the division are tolerated (relative to the
    /// extent, see [CELL_COUNT_ULPS]), so extents smaller than one cell result in a grid without
    /// cells along that axis.
    pub fn centered(extents: &Vector3<R>, cell_size: R) -> Result<Self, GridConstructionError<R>> {
        if !cell_size.is_finite() || cell_size <= R::zero() {
            return Err(GridConstructionError::InvalidCellSize(cell_size));
        }
        if extents.iter().any(|e| !e.is_finite() || *e <= R::zero()) {
            return Err(GridConstructionError::InvalidExtents(*extents));
        }

        let mut n_cells_per_dim = [0; 3];
        for (n_cells, extent) in n_cells_per_dim.iter_mut().zip(extents.iter()) {
            *n_cells = cells_fitting_extent(*extent, cell_size)
                .ok_or(GridConstructionError::IndexTypeTooSmallCellsPerDim)?;
        }

        let half_extents = extents.scale(R::from_f64_unchecked(0.5));
        Self::new(&(-half_extents), &n_cells_per_dim, cell_size)
    }

    /// Constructs a grid with the given min coordinate and number of cells along each axis
    pub fn new(
        min: &Vector3<R>,
        n_cells_per_dim: &[usize; 3],
        cell_size: R,
    ) -> Result<Self, GridConstructionError<R>> {
        if !cell_size.is_finite() || cell_size <= R::zero() {
            return Err(GridConstructionError::InvalidCellSize(cell_size));
        }

        n_cells_per_dim
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(n.checked_add(1)?))
            .ok_or(GridConstructionError::IndexTypeTooSmallTotalPoints)?;

        let extents = Vector3::new(
            cell_size.times(n_cells_per_dim[0]),
            cell_size.times(n_cells_per_dim[1]),
            cell_size.times(n_cells_per_dim[2]),
        );

        Ok(Self {
            aabb: Aabb3d::new(*min, min + extents),
            cell_size,
            n_cells_per_dim: *n_cells_per_dim,
        })
    }

    /// Returns the AABB spanned by the cells of the grid
    pub fn aabb(&self) -> &Aabb3d<R> {
        &self.aabb
    }

    /// Returns the edge length of the cells
    pub fn cell_size(&self) -> R {
        self.cell_size
    }

    /// Returns the number of cells along each axis
    pub fn cells_per_dim(&self) -> &[usize; 3] {
        &self.n_cells_per_dim
    }

    /// Returns the number of points along each axis
    pub fn points_per_dim(&self) -> [usize; 3] {
        self.n_cells_per_dim.map(|n| n + 1)
    }

    /// Returns the total number of cells of the grid
    pub fn num_cells(&self) -> usize {
        self.n_cells_per_dim.iter().product()
    }

    /// Returns whether the grid has no cells, which happens if some extent is smaller than one cell
    pub fn is_empty(&self) -> bool {
        self.num_cells() == 0
    }

    /// Returns the cell with the given index triplet if it is part of the grid
    pub fn get_cell(&self, ijk: [usize; 3]) -> Option<CellIndex> {
        ijk.iter()
            .zip(self.n_cells_per_dim.iter())
            .all(|(i, n)| i < n)
            .then(|| CellIndex::from_ijk(ijk))
    }

    /// Returns the point with the given index triplet if it is part of the grid
    pub fn get_point(&self, ijk: [usize; 3]) -> Option<PointIndex> {
        ijk.iter()
            .zip(self.n_cells_per_dim.iter())
            .all(|(i, n)| i <= n)
            .then(|| PointIndex::from_ijk(ijk))
    }

    /// Iterates over all cells in walk order (x outermost, z innermost)
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        let [nx, ny, nz] = self.n_cells_per_dim;
        iproduct!(0..nx, 0..ny, 0..nz).map(|(i, j, k)| CellIndex::from_ijk([i, j, k]))
    }

    /// Returns the coordinates of the given grid point
    #[inline(always)]
    pub fn point_coordinates(&self, point: &PointIndex) -> Vector3<R> {
        let [i, j, k] = point.index;
        self.aabb.min()
            + Vector3::new(
                self.cell_size.times(i),
                self.cell_size.times(j),
                self.cell_size.times(k),
            )
    }

    /// Returns the coordinates of the origin (corner `0`) of the given cell
    pub fn cell_origin(&self, cell: &CellIndex) -> Vector3<R> {
        self.point_coordinates(&cell.corner_point(0))
    }
}

/// Largest number of cells whose total length stays within the extent (up to rounding)
fn cells_fitting_extent<R: Real>(extent: R, cell_size: R) -> Option<usize> {
    let tolerance = extent * R::default_epsilon().times(CELL_COUNT_ULPS);
    let fits = |n: usize| cell_size.times(n) <= extent + tolerance;

    let mut n_cells = (extent / cell_size).floor().to_usize()?;
    while n_cells > 0 && !fits(n_cells) {
        n_cells -= 1;
    }
    if fits(n_cells.checked_add(1)?) {
        n_cells += 1;
    }
    Some(n_cells)
}
