//! Axis-aligned bounding boxes of vertex sets and grids

use std::fmt;
use std::fmt::Debug;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::Real;

/// Axis-aligned bounding box in three dimensions
#[derive(Clone, PartialEq)]
pub struct Aabb3d<R: Real> {
    min: Vector3<R>,
    max: Vector3<R>,
}

impl<R: Real> Aabb3d<R> {
    /// Constructs an AABB with the given min and max corners
    #[inline(always)]
    pub fn new(min: Vector3<R>, max: Vector3<R>) -> Self {
        Self { min, max }
    }

    /// Constructs a degenerate AABB with zero extents located at the given point
    #[inline(always)]
    pub fn from_point(point: Vector3<R>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Constructs the smallest AABB enclosing all given points, returns `None` for an empty slice
    /// ```
    /// use isosurf_lib::Aabb3d;
    /// use nalgebra::Vector3;
    ///
    /// assert!(Aabb3d::<f64>::from_points(&[]).is_none());
    ///
    /// let aabb = Aabb3d::<f64>::from_points(&[
    ///     Vector3::new(1.0, 1.0, 1.0),
    ///     Vector3::new(0.5, 3.0, 5.0),
    ///     Vector3::new(-1.0, 1.0, 1.0)
    /// ]).unwrap();
    /// assert_eq!(aabb.min(), &Vector3::new(-1.0, 1.0, 1.0));
    /// assert_eq!(aabb.max(), &Vector3::new(1.0, 3.0, 5.0));
    /// ```
    pub fn from_points(points: &[Vector3<R>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::from_point(*first);
        for point in rest {
            aabb.join_with_point(point);
        }
        Some(aabb)
    }

    /// Parallel version of [`from_points`](Aabb3d::from_points)
    pub fn par_from_points(points: &[Vector3<R>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let initial_aabb = Self::from_point(*first);
        Some(
            rest.par_iter()
                .fold(
                    || initial_aabb.clone(),
                    |mut aabb, point| {
                        aabb.join_with_point(point);
                        aabb
                    },
                )
                .reduce(
                    || initial_aabb.clone(),
                    |mut joined, aabb| {
                        joined.join(&aabb);
                        joined
                    },
                ),
        )
    }

    /// Returns the min corner of the bounding box
    #[inline(always)]
    pub fn min(&self) -> &Vector3<R> {
        &self.min
    }

    /// Returns the max corner of the bounding box
    #[inline(always)]
    pub fn max(&self) -> &Vector3<R> {
        &self.max
    }

    /// Checks whether the point lies inside of the closed box
    pub fn contains_point(&self, point: &Vector3<R>) -> bool {
        point >= &self.min && point <= &self.max
    }

    /// Enlarges this AABB to the smallest AABB enclosing both itself and the other AABB
    pub fn join(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Enlarges this AABB to the smallest AABB enclosing both itself and the point
    pub fn join_with_point(&mut self, point: &Vector3<R>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}

impl<R: Real> Debug for Aabb3d<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aabb3d {{ min: [{:.7}, {:.7}, {:.7}], max: [{:.7}, {:.7}, {:.7}] }}",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = Aabb3d::<f64>::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));

        assert!(aabb.contains_point(&Vector3::new(0.5, 0.5, 0.5)));
        assert!(aabb.contains_point(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(aabb.contains_point(&Vector3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains_point(&Vector3::new(1.5, 0.0, 0.0)));
        assert!(!aabb.contains_point(&Vector3::new(0.0, -0.1, 0.0)));
    }

    #[test]
    fn test_aabb_parallel_matches_sequential() {
        let points = (0..1000)
            .map(|i| {
                let t = i as f64 * 0.01;
                Vector3::new(t.sin() * 3.0, t.cos() - 2.0, t * 0.5)
            })
            .collect::<Vec<_>>();

        let seq = Aabb3d::from_points(&points).unwrap();
        let par = Aabb3d::par_from_points(&points).unwrap();
        assert_eq!(seq, par);
    }
}
