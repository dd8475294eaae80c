use std::fmt::Debug;

use nalgebra::{RealField, Vector3};
use num_traits::{FromPrimitive, ToPrimitive};

/// Trait that has to be implemented by types that are shared across threads
pub trait ThreadSafe: Sync + Send + 'static {}
impl<T> ThreadSafe for T where T: Sync + Send + 'static {}

/// Trait that has to be implemented by floating point types used for coordinates and field values
pub trait Real: RealField + Copy + FromPrimitive + ToPrimitive + Debug + ThreadSafe {
    /// Tries to convert this value to another [Real] type, returns `None` if the conversion fails
    fn try_convert<T: Real>(self) -> Option<T> {
        T::from_f64(self.to_f64()?)
    }

    /// Tries to convert all components of the vector to another [Real] type
    fn try_convert_vec_from<T: Real>(vec: &Vector3<T>) -> Option<Vector3<Self>> {
        Some(Vector3::new(
            vec.x.try_convert()?,
            vec.y.try_convert()?,
            vec.z.try_convert()?,
        ))
    }

    /// Converts an `f64` constant into this type, panics if the value cannot be represented
    fn from_f64_unchecked(value: f64) -> Self {
        Self::from_f64(value).unwrap()
    }

    /// Multiplies the real value by the specified integer coefficient
    fn times(self, n: usize) -> Self {
        self * Self::from_usize(n).unwrap()
    }
}

impl<T: RealField + Copy + FromPrimitive + ToPrimitive + Debug + ThreadSafe> Real for T {}
