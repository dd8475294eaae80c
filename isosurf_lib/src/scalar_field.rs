//! Scalar fields that can be extracted as isosurfaces
//!
//! A [`ScalarField`] is a pure function mapping a point in space to a signed scalar value. Any
//! closure of the form `Fn(&Vector3<R>) -> R` is a scalar field, additionally this module provides
//! a few analytic fields that are used for validation and by the command line tool.

use nalgebra::Vector3;

use crate::Real;

/// A pure function mapping a point in 3D space to a scalar value
pub trait ScalarField<R: Real> {
    /// Returns the value of the field at the given coordinate
    fn evaluate(&self, coordinate: &Vector3<R>) -> R;
}

impl<R: Real, F> ScalarField<R> for F
where
    F: Fn(&Vector3<R>) -> R,
{
    #[inline(always)]
    fn evaluate(&self, coordinate: &Vector3<R>) -> R {
        self(coordinate)
    }
}

/// The field `sin(x*z) - y`, a wavy height field used to validate the extraction
#[derive(Copy, Clone, Debug, Default)]
pub struct SinXzField;

impl<R: Real> ScalarField<R> for SinXzField {
    #[inline(always)]
    fn evaluate(&self, p: &Vector3<R>) -> R {
        (p.x * p.z).sin() - p.y
    }
}

/// Signed distance to a plane `offset - dot(normal, p)`, positive on the side opposite to the normal
#[derive(Clone, Debug)]
pub struct PlaneField<R: Real> {
    pub normal: Vector3<R>,
    pub offset: R,
}

impl<R: Real> PlaneField<R> {
    /// The field `-y`, i.e. values below the isovalue `0` for all points above the xz-plane
    pub fn y_up() -> Self {
        Self {
            normal: Vector3::y(),
            offset: R::zero(),
        }
    }
}

impl<R: Real> ScalarField<R> for PlaneField<R> {
    #[inline(always)]
    fn evaluate(&self, p: &Vector3<R>) -> R {
        self.offset - self.normal.dot(p)
    }
}

/// The field `radius - |p - center|`, positive inside of the sphere
#[derive(Clone, Debug)]
pub struct SphereField<R: Real> {
    pub center: Vector3<R>,
    pub radius: R,
}

impl<R: Real> ScalarField<R> for SphereField<R> {
    #[inline(always)]
    fn evaluate(&self, p: &Vector3<R>) -> R {
        self.radius - (p - self.center).norm()
    }
}

/// A field with the same value everywhere
#[derive(Copy, Clone, Debug)]
pub struct ConstantField<R: Real>(pub R);

impl<R: Real> ScalarField<R> for ConstantField<R> {
    #[inline(always)]
    fn evaluate(&self, _: &Vector3<R>) -> R {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_scalar_field() {
        let field = |p: &Vector3<f64>| p.x + 2.0 * p.y;
        assert_eq!(field.evaluate(&Vector3::new(1.0, 2.0, 3.0)), 5.0);
    }

    #[test]
    fn test_builtin_fields() {
        let p = Vector3::new(0.5f64, 0.25, 2.0);
        assert_eq!(SinXzField.evaluate(&p), (1.0f64).sin() - 0.25);
        assert_eq!(PlaneField::y_up().evaluate(&p), -0.25);
        assert_eq!(ConstantField(1.0).evaluate(&p), 1.0);

        let sphere = SphereField {
            center: Vector3::new(0.5, 0.25, 0.0),
            radius: 1.5,
        };
        assert!((sphere.evaluate(&p) - (-0.5)).abs() < 1e-12);
    }
}
