//! Spatial force.

use std::ops::{Add, AddAssign, Neg, Sub};

use nalgebra::{Matrix3, Vector3, Vector6};

use super::motion::{SpatialVelocity, stack};
use crate::scalar::Real;

/// Spatial force `F_Bp = [τ; f]` applied on a body at point P.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialForce<T: Real> {
    /// Torque about the point of application.
    pub torque: Vector3<T>,
    /// Force.
    pub force: Vector3<T>,
}

impl<T: Real> SpatialForce<T> {
    /// Create from torque and force parts.
    #[must_use]
    pub fn new(torque: Vector3<T>, force: Vector3<T>) -> Self {
        Self { torque, force }
    }

    /// Zero force.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Same force applied at Q instead of P, given `p_PQ`.
    ///
    /// `τ_Q = τ_P − p_PQ × f`.
    #[must_use]
    #[inline]
    pub fn shift(&self, p_pq: &Vector3<T>) -> Self {
        Self::new(self.torque - p_pq.cross(&self.force), self.force)
    }

    /// Re-express with rotation `R_EF` (self expressed in F).
    #[must_use]
    #[inline]
    pub fn re_express(&self, r_ef: &Matrix3<T>) -> Self {
        Self::new(r_ef * self.torque, r_ef * self.force)
    }

    /// Power `τ·ω + f·v` delivered on a body moving with `velocity`.
    ///
    /// Both operands must share the point and the expressed-in frame.
    #[must_use]
    #[inline]
    pub fn dot(&self, velocity: &SpatialVelocity<T>) -> T {
        self.torque.dot(&velocity.rotational) + self.force.dot(&velocity.translational)
    }

    /// Stacked `[τ; f]`.
    #[must_use]
    pub fn to_vector6(&self) -> Vector6<T> {
        stack(&self.torque, &self.force)
    }
}

impl<T: Real> Default for SpatialForce<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Real> Add for SpatialForce<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.torque + rhs.torque, self.force + rhs.force)
    }
}

impl<T: Real> AddAssign for SpatialForce<T> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.torque += rhs.torque;
        self.force += rhs.force;
    }
}

impl<T: Real> Sub for SpatialForce<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.torque - rhs.torque, self.force - rhs.force)
    }
}

impl<T: Real> Neg for SpatialForce<T> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.torque, -self.force)
    }
}
