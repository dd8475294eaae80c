//!
//! Library for isosurface extraction from scalar fields using marching cubes, with welding of the
//! per-cell triangle soup into a shared-vertex mesh. Entry point is the [extract_surface] function.
//!
//! The pipeline samples a [`ScalarField`](scalar_field::ScalarField) on a regular grid centered at
//! the origin, classifies every cell against the isovalue, interpolates the crossings on the cell
//! edges, emits triangles from the marching cubes lookup tables and finally merges duplicate
//! vertices using one of the strategies in [`WeldingStrategy`]:
//!  - [`WeldingStrategy::SpatialHash`]: post-processing of the raw triangle soup, vertices closer than
//!    a squared distance threshold are merged using a sparse bucket grid, followed by a flat normal
//!    recomputation
//!  - [`WeldingStrategy::GridPoint`]: vertices are keyed by the grid point nearest to their edge
//!    crossing during triangle emission and placed at the mean of all crossings mapped to the key
//!
//! Extraction is single-threaded and deterministic: for a fixed configuration and field, repeated
//! runs produce identical vertex and index buffers.
//!

/// Re-export the version of nalgebra used by this crate
pub use nalgebra;
/// Re-export the version of vtkio used by this crate, if IO support is enabled
#[cfg(feature = "io")]
pub use vtkio;

#[macro_use]
mod profiling_macro;

mod aabb;
/// Orchestration of the grid walk and the welding pass
pub mod extraction;
/// Writers for the extracted meshes (OBJ, VTK, JSON)
#[cfg(feature = "io")]
pub mod io;
/// Marching cubes building blocks: corner sampling, case classification, edge interpolation and triangulation
pub mod marching_cubes;
/// Triangle mesh types produced by the extraction
pub mod mesh;
mod numeric_types;
#[cfg(feature = "profiling")]
#[doc(hidden)]
pub mod profiling;
/// Scalar field trait and analytic fields
pub mod scalar_field;
/// Regular background grid that is walked by marching cubes
pub mod uniform_grid;
/// Strategies to merge duplicate vertices of the raw marching cubes output
pub mod welding;

use nalgebra::Vector3;
use thiserror::Error as ThisError;

pub use aabb::Aabb3d;
pub use extraction::{ExtractionStats, SurfaceExtraction, extract_raw_mesh, extract_surface};
pub use numeric_types::{Real, ThreadSafe};
pub use scalar_field::ScalarField;
pub use uniform_grid::{GridConstructionError, UniformGrid};
pub use welding::{SpatialHashParameters, WeldingStrategy};

pub(crate) type HashState = fxhash::FxBuildHasher;
pub(crate) type MapType<K, V> = std::collections::HashMap<K, V, HashState>;
pub(crate) fn new_map<K, V>() -> MapType<K, V> {
    MapType::with_hasher(HashState::default())
}

/// Smallest cell size accepted by the extraction
pub const MIN_CELL_SIZE: f64 = 0.01;

/// Parameters for the surface extraction
#[derive(Clone, Debug)]
pub struct Parameters<R: Real> {
    /// Extents of the sampled region, centered at the coordinate origin
    pub mesh_size: Vector3<R>,
    /// Edge length of the cubic cells of the marching cubes grid
    pub cell_size: R,
    /// Isovalue of the extracted surface, corners with values strictly below it count as "inside"
    pub iso_surface_threshold: R,
    /// Strategy used to merge the duplicate vertices produced by the per-cell triangulation
    pub welding: WeldingStrategy<R>,
    /// Whether the unwelded triangle soup is kept in the [SurfaceExtraction] (recorded during the same grid walk)
    pub keep_raw_mesh: bool,
}

impl<R: Real> Default for Parameters<R> {
    /// A 5x5x5 region with unit cells, isovalue zero and spatial hash welding
    fn default() -> Self {
        Self::new(Vector3::repeat(R::from_f64_unchecked(5.0)), R::one())
    }
}

impl<R: Real> Parameters<R> {
    /// Parameters with isovalue zero and default spatial hash welding
    pub fn new(mesh_size: Vector3<R>, cell_size: R) -> Self {
        Self {
            mesh_size,
            cell_size,
            iso_surface_threshold: R::zero(),
            welding: WeldingStrategy::SpatialHash(SpatialHashParameters::default()),
            keep_raw_mesh: false,
        }
    }

    /// Replaces the welding strategy
    pub fn with_welding(mut self, welding: WeldingStrategy<R>) -> Self {
        self.welding = welding;
        self
    }

    /// Sets whether the raw triangle soup is kept in the extraction result
    pub fn with_raw_mesh(mut self, keep_raw_mesh: bool) -> Self {
        self.keep_raw_mesh = keep_raw_mesh;
        self
    }

    /// Replaces the isovalue
    pub fn with_iso_surface_threshold(mut self, iso_surface_threshold: R) -> Self {
        self.iso_surface_threshold = iso_surface_threshold;
        self
    }

    /// Tries to convert the parameters from one [Real] type to another [Real] type, returns `None` if conversion fails
    pub fn try_convert<T: Real>(&self) -> Option<Parameters<T>> {
        Some(Parameters {
            mesh_size: T::try_convert_vec_from(&self.mesh_size)?,
            cell_size: self.cell_size.try_convert()?,
            iso_surface_threshold: self.iso_surface_threshold.try_convert()?,
            welding: self.welding.try_convert()?,
            keep_raw_mesh: self.keep_raw_mesh,
        })
    }

    /// Checks that the parameters describe a valid extraction, nothing is clamped
    pub fn validate(&self) -> Result<(), ParameterError<R>> {
        let min_cell_size = R::from_f64_unchecked(MIN_CELL_SIZE);
        if !self.cell_size.is_finite() || self.cell_size < min_cell_size {
            return Err(ParameterError::InvalidCellSize(self.cell_size));
        }

        if self
            .mesh_size
            .iter()
            .any(|extent| !extent.is_finite() || *extent <= R::zero())
        {
            return Err(ParameterError::InvalidMeshSize(self.mesh_size));
        }

        if !self.iso_surface_threshold.is_finite() {
            return Err(ParameterError::InvalidIsoSurfaceThreshold(
                self.iso_surface_threshold,
            ));
        }

        if let WeldingStrategy::SpatialHash(spatial_hash) = &self.welding {
            spatial_hash.validate()?;
        }

        Ok(())
    }
}

/// Error type returned when the extraction parameters are invalid
#[rustfmt::skip]
#[derive(Copy, Clone, PartialEq, Debug, ThisError)]
pub enum ParameterError<R: Real> {
    /// The cell size is not finite or smaller than [MIN_CELL_SIZE]
    #[error("invalid cell size `{0}` supplied, cell size has to be at least {MIN_CELL_SIZE}")]
    InvalidCellSize(R),
    /// Some component of the mesh size is not finite or not larger than zero
    #[error("invalid mesh size `{0:?}` supplied, every component has to be larger than zero")]
    InvalidMeshSize(Vector3<R>),
    /// The isovalue is not finite
    #[error("invalid iso-surface threshold `{0}` supplied, it has to be finite")]
    InvalidIsoSurfaceThreshold(R),
    /// The squared distance threshold of the spatial hash welding is negative or not finite
    #[error("invalid welding threshold `{0}` supplied, it has to be finite and non-negative")]
    InvalidWeldThreshold(R),
    /// The bucket step of the spatial hash welding is not finite or not larger than zero
    #[error("invalid bucket step `{0}` supplied, it has to be larger than zero")]
    InvalidBucketStep(R),
}

/// Error type returned when the surface extraction fails
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum ExtractionError<R: Real> {
    /// The supplied parameters were rejected before the extraction started
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(ParameterError<R>),
    /// Errors that occur during the construction of the marching cubes grid
    #[error("grid construction: {0}")]
    GridConstruction(GridConstructionError<R>),
    /// The mesh has more vertices than can be addressed by `u32` indices
    #[error("mesh exceeds the maximum number of vertices addressable by u32 indices ({0} vertices)")]
    IndexOverflow(usize),
    /// A triangle passed to the welding references a vertex that does not exist
    #[error("triangle {0} references a vertex that does not exist")]
    InvalidTriangle(usize),
    /// Any error that is not represented by some other explicit variant
    #[error("unknown error")]
    Unknown(#[source] anyhow::Error),
}

impl<R: Real> From<ParameterError<R>> for ExtractionError<R> {
    /// Allows automatic conversion of a [ParameterError] to an [ExtractionError]
    fn from(error: ParameterError<R>) -> Self {
        ExtractionError::InvalidConfiguration(error)
    }
}

impl<R: Real> From<GridConstructionError<R>> for ExtractionError<R> {
    /// Allows automatic conversion of a [GridConstructionError] to an [ExtractionError]
    fn from(error: GridConstructionError<R>) -> Self {
        ExtractionError::GridConstruction(error)
    }
}

impl<R: Real> From<anyhow::Error> for ExtractionError<R> {
    /// Allows automatic conversion of an anyhow::Error to an [ExtractionError]
    fn from(error: anyhow::Error) -> Self {
        ExtractionError::Unknown(error)
    }
}
