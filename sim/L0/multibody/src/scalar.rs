//! Scalar bound shared by every generic element and algorithm.
//!
//! [`Real`] asks only for field arithmetic plus the few transcendental
//! functions the kinematics need. That is enough for nalgebra's fixed-size
//! products (`Matrix3 * Vector3`, `cross`, `dot`) while staying implementable
//! by forward-mode dual numbers.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use nalgebra::Scalar;
use num_traits::{One, Zero};

/// Numeric scalar a [`MultibodyTree`](crate::MultibodyTree) can be built over.
pub trait Real:
    Scalar
    + Copy
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Lift a plain constant.
    fn from_f64(value: f64) -> Self;

    /// Value part of the scalar, dropping any derivative information.
    fn to_f64(self) -> f64;

    /// Sine.
    fn sin(self) -> Self;

    /// Cosine.
    fn cos(self) -> Self;

    /// Square root.
    fn sqrt(self) -> Self;
}

impl Real for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn sin(self) -> Self {
        Self::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        Self::cos(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        Self::sqrt(self)
    }
}

/// Converts between scalar types through the value part.
///
/// Derivative information is dropped; the result is a constant in `U`.
#[inline]
pub(crate) fn cast<T: Real, U: Real>(value: T) -> U {
    U::from_f64(value.to_f64())
}
