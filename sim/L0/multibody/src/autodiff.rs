//! Forward-mode automatic differentiation scalar.
//!
//! A [`Dual<N>`] carries a value and `N` partial derivatives with respect to
//! seeded inputs. Arithmetic propagates the partials by the chain rule, so any
//! algorithm generic over [`Real`] yields exact first derivatives when run on
//! a tree cloned with [`MultibodyTree::to_autodiff`](crate::MultibodyTree::to_autodiff).
//!
//! ```
//! use sim_multibody::{Dual, Real};
//!
//! let x = Dual::<1>::variable(0.5, 0);
//! let y = x.sin() * x;
//! let expected = 0.5_f64.cos() * 0.5 + 0.5_f64.sin();
//! assert!((y.derivative(0) - expected).abs() < 1e-15);
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::{One, Zero};

use crate::scalar::Real;

/// Value plus `N` seeded partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual<const N: usize> {
    value: f64,
    derivatives: [f64; N],
}

impl<const N: usize> Dual<N> {
    /// Constant with all partials zero.
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self {
            value,
            derivatives: [0.0; N],
        }
    }

    /// Independent variable with a unit partial in slot `index`.
    ///
    /// An `index` outside `0..N` yields a constant.
    #[must_use]
    pub fn variable(value: f64, index: usize) -> Self {
        let mut dual = Self::constant(value);
        if let Some(d) = dual.derivatives.get_mut(index) {
            *d = 1.0;
        }
        dual
    }

    /// Scalar with explicit partials.
    #[must_use]
    pub const fn with_derivatives(value: f64, derivatives: [f64; N]) -> Self {
        Self { value, derivatives }
    }

    /// Value part.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// All partial derivatives.
    #[must_use]
    pub const fn derivatives(&self) -> &[f64; N] {
        &self.derivatives
    }

    /// Partial derivative in slot `index`, zero when out of range.
    #[must_use]
    pub fn derivative(&self, index: usize) -> f64 {
        self.derivatives.get(index).copied().unwrap_or(0.0)
    }

    #[inline]
    fn chain(self, value: f64, slope: f64) -> Self {
        Self {
            value,
            derivatives: self.derivatives.map(|d| d * slope),
        }
    }
}

impl<const N: usize> Default for Dual<N> {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl<const N: usize> fmt::Display for Dual<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {:?}ε", self.value, self.derivatives)
    }
}

impl<const N: usize> From<f64> for Dual<N> {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

// ========== Arithmetic ==========

impl<const N: usize> Add for Dual<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut derivatives = self.derivatives;
        for (d, r) in derivatives.iter_mut().zip(rhs.derivatives) {
            *d += r;
        }
        Self {
            value: self.value + rhs.value,
            derivatives,
        }
    }
}

impl<const N: usize> Sub for Dual<N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl<const N: usize> Mul for Dual<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut derivatives = self.derivatives;
        for (d, r) in derivatives.iter_mut().zip(rhs.derivatives) {
            *d = *d * rhs.value + self.value * r;
        }
        Self {
            value: self.value * rhs.value,
            derivatives,
        }
    }
}

impl<const N: usize> Div for Dual<N> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.value;
        let value = self.value * inv;
        let mut derivatives = self.derivatives;
        for (d, r) in derivatives.iter_mut().zip(rhs.derivatives) {
            *d = (*d - value * r) * inv;
        }
        Self { value, derivatives }
    }
}

impl<const N: usize> Neg for Dual<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            value: -self.value,
            derivatives: self.derivatives.map(|d| -d),
        }
    }
}

impl<const N: usize> AddAssign for Dual<N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> SubAssign for Dual<N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const N: usize> MulAssign for Dual<N> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const N: usize> DivAssign for Dual<N> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<const N: usize> Zero for Dual<N> {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.value == 0.0 && self.derivatives.iter().all(|d| *d == 0.0)
    }
}

impl<const N: usize> One for Dual<N> {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl<const N: usize> Real for Dual<N> {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self::constant(value)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self.value
    }

    #[inline]
    fn sin(self) -> Self {
        self.chain(self.value.sin(), self.value.cos())
    }

    #[inline]
    fn cos(self) -> Self {
        self.chain(self.value.cos(), -self.value.sin())
    }

    #[inline]
    fn sqrt(self) -> Self {
        let root = self.value.sqrt();
        self.chain(root, 0.5 / root)
    }
}
