//! Merging of the duplicate vertices produced by the per-cell triangulation
//!
//! Two alternative strategies are available, exactly one is used per extraction:
//!  - [spatial_hash]: post-processing of the complete raw triangle soup, vertices within a squared
//!    distance threshold of a previously kept vertex in the same bucket are merged
//!  - [grid_point]: fused into triangle emission, vertices are keyed by the grid point nearest to
//!    their edge crossing and placed at the mean of all crossings mapped to the key

use crate::{ParameterError, Real};

pub mod grid_point;
pub mod spatial_hash;

pub use grid_point::GridPointWelding;
pub use spatial_hash::{SpatialHashWelding, weld_by_spatial_hash};

/// Strategy used to merge duplicate vertices
#[derive(Clone, PartialEq, Debug)]
pub enum WeldingStrategy<R: Real> {
    /// Merge vertices closer than a squared distance threshold using a sparse bucket grid
    SpatialHash(SpatialHashParameters<R>),
    /// Merge vertices whose edge crossings are nearest to the same grid point
    GridPoint,
}

impl<R: Real> Default for WeldingStrategy<R> {
    fn default() -> Self {
        WeldingStrategy::SpatialHash(SpatialHashParameters::default())
    }
}

impl<R: Real> WeldingStrategy<R> {
    /// Tries to convert the parameters from one [Real] type to another [Real] type, returns `None` if conversion fails
    pub fn try_convert<T: Real>(&self) -> Option<WeldingStrategy<T>> {
        Some(match self {
            WeldingStrategy::SpatialHash(p) => WeldingStrategy::SpatialHash(p.try_convert()?),
            WeldingStrategy::GridPoint => WeldingStrategy::GridPoint,
        })
    }

    /// Short name of the strategy used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            WeldingStrategy::SpatialHash(_) => "spatial hash",
            WeldingStrategy::GridPoint => "grid point",
        }
    }
}

/// Parameters of the spatial hash welding
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpatialHashParameters<R: Real> {
    /// Vertices with a squared distance strictly below this value are merged
    pub threshold: R,
    /// Edge length of the cubic buckets, independent of the marching cubes cell size
    pub bucket_step: R,
}

impl<R: Real> Default for SpatialHashParameters<R> {
    /// Threshold of `1e-4` (squared distance) and bucket step of `0.03`
    fn default() -> Self {
        Self {
            threshold: R::from_f64_unchecked(1e-4),
            bucket_step: R::from_f64_unchecked(0.03),
        }
    }
}

impl<R: Real> SpatialHashParameters<R> {
    /// Tries to convert the parameters from one [Real] type to another [Real] type, returns `None` if conversion fails
    pub fn try_convert<T: Real>(&self) -> Option<SpatialHashParameters<T>> {
        Some(SpatialHashParameters {
            threshold: self.threshold.try_convert()?,
            bucket_step: self.bucket_step.try_convert()?,
        })
    }

    /// Checks that the threshold is non-negative and the bucket step positive
    pub fn validate(&self) -> Result<(), ParameterError<R>> {
        if !self.threshold.is_finite() || self.threshold < R::zero() {
            return Err(ParameterError::InvalidWeldThreshold(self.threshold));
        }
        if !self.bucket_step.is_finite() || self.bucket_step <= R::zero() {
            return Err(ParameterError::InvalidBucketStep(self.bucket_step));
        }
        Ok(())
    }

    /// Returns whether a bucket is large enough to contain all vertices within the threshold distance
    ///
    /// If this is not the case, vertices that should be merged may end up in neighboring buckets
    /// and are not merged.
    pub fn bucket_covers_threshold(&self) -> bool {
        self.bucket_step * self.bucket_step > self.threshold
    }
}
