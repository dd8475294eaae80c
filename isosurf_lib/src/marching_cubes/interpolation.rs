use nalgebra::Vector3;

use crate::Real;
use crate::marching_cubes::marching_cubes_lut::CELL_EDGE_CORNERS;
use crate::marching_cubes::{CellCorners, MarchingCubesCase};

/// Tolerance used by [interpolate_edge] to snap crossings to edge endpoints
pub const EDGE_INTERPOLATION_EPSILON: f64 = 1e-5;

/// Linearly interpolates the position where the field crosses the isovalue on the edge from `a` to `b`
///
/// If the isovalue is within [EDGE_INTERPOLATION_EPSILON] of one of the endpoint samples (checked
/// for `a` first) that endpoint is returned. If both samples are within the tolerance of each
/// other the edge is considered flat and `a` is returned.
///
/// Non-finite samples (NaN or infinite) carry no position information, the crossing is snapped to
/// the endpoint with the finite sample (`a` if both are non-finite). The result is therefore
/// finite whenever `a` and `b` are.
#[inline(always)]
pub fn interpolate_edge<R: Real>(
    iso_value: R,
    a: &Vector3<R>,
    b: &Vector3<R>,
    value_a: R,
    value_b: R,
) -> Vector3<R> {
    if !value_a.is_finite() {
        return if value_b.is_finite() { *b } else { *a };
    }
    if !value_b.is_finite() {
        return *a;
    }

    let eps = R::from_f64_unchecked(EDGE_INTERPOLATION_EPSILON);

    if (iso_value - value_a).abs() < eps {
        return *a;
    }
    if (iso_value - value_b).abs() < eps {
        return *b;
    }
    if (value_a - value_b).abs() < eps {
        return *a;
    }

    let mu = (iso_value - value_a) / (value_b - value_a);
    a + (b - a) * mu
}

/// Returns the index of the corner of the edge that is nearer to the point, `0` for `a` and `1` for `b`
///
/// Ties are resolved in favor of `a`.
#[inline(always)]
pub fn nearest_corner<R: Real>(point: &Vector3<R>, a: &Vector3<R>, b: &Vector3<R>) -> usize {
    if (point - b).norm_squared() < (point - a).norm_squared() {
        1
    } else {
        0
    }
}

/// Surface crossing on a cell edge
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EdgePoint<R: Real> {
    /// Interpolated position of the crossing
    pub position: Vector3<R>,
    /// Local index (`0..8`) of the cell corner nearest to the crossing
    pub nearest_corner: usize,
}

/// The surface crossings on all twelve edges of a cell, `None` for edges not crossed by the surface
#[derive(Clone, Debug)]
pub struct CellEdgePoints<R: Real> {
    points: [Option<EdgePoint<R>>; 12],
}

impl<R: Real> CellEdgePoints<R> {
    /// Interpolates the crossings of all edges that are crossed by the surface in the given case
    pub fn compute(corners: &CellCorners<R>, case: MarchingCubesCase, iso_value: R) -> Self {
        let points = std::array::from_fn(|edge| {
            case.is_edge_crossed(edge).then(|| {
                let [ca, cb] = CELL_EDGE_CORNERS[edge];
                let a = &corners.positions[ca];
                let b = &corners.positions[cb];
                let position =
                    interpolate_edge(iso_value, a, b, corners.values[ca], corners.values[cb]);
                let nearest = [ca, cb][nearest_corner(&position, a, b)];
                EdgePoint {
                    position,
                    nearest_corner: nearest,
                }
            })
        });

        Self { points }
    }

    /// Returns the crossing on the given local edge, `None` if the edge is not crossed
    pub fn get(&self, edge: usize) -> Option<&EdgePoint<R>> {
        self.points.get(edge)?.as_ref()
    }

    /// Number of crossed edges
    pub fn len(&self) -> usize {
        self.points.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
