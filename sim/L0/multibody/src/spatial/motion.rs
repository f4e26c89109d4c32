//! Spatial velocity and spatial acceleration.

use std::ops::{Add, AddAssign, Neg, Sub};

use nalgebra::{Matrix3, Vector3, Vector6};
use num_traits::Zero;

use crate::scalar::Real;

/// Spatial velocity `V_AB = [ω_AB; v_ABo]` of frame B measured in A.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialVelocity<T: Real> {
    /// Angular velocity `ω`.
    pub rotational: Vector3<T>,
    /// Translational velocity of the frame origin.
    pub translational: Vector3<T>,
}

impl<T: Real> SpatialVelocity<T> {
    /// Create from angular and translational parts.
    #[must_use]
    pub fn new(rotational: Vector3<T>, translational: Vector3<T>) -> Self {
        Self {
            rotational,
            translational,
        }
    }

    /// Zero velocity.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Velocity of a point Q rigidly attached to B, given `p_BoQ` expressed in
    /// the same frame as `self`.
    ///
    /// `v_Q = v_Bo + ω × p_BoQ`.
    #[must_use]
    #[inline]
    pub fn shift(&self, p_boq: &Vector3<T>) -> Self {
        Self::new(
            self.rotational,
            self.translational + self.rotational.cross(p_boq),
        )
    }

    /// Re-express with rotation `R_EF` (self expressed in F).
    #[must_use]
    #[inline]
    pub fn re_express(&self, r_ef: &Matrix3<T>) -> Self {
        Self::new(r_ef * self.rotational, r_ef * self.translational)
    }

    /// Stacked `[ω; v]`.
    #[must_use]
    pub fn to_vector6(&self) -> Vector6<T> {
        stack(&self.rotational, &self.translational)
    }
}

impl<T: Real> Default for SpatialVelocity<T> {
    fn default() -> Self {
        Self::zero()
    }
}

/// Spatial acceleration `A_AB = [α_AB; a_ABo]` of frame B measured in A.
///
/// The translational part is the classical acceleration of the origin Bo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialAcceleration<T: Real> {
    /// Angular acceleration `α`.
    pub rotational: Vector3<T>,
    /// Translational acceleration of the frame origin.
    pub translational: Vector3<T>,
}

impl<T: Real> SpatialAcceleration<T> {
    /// Create from angular and translational parts.
    #[must_use]
    pub fn new(rotational: Vector3<T>, translational: Vector3<T>) -> Self {
        Self {
            rotational,
            translational,
        }
    }

    /// Zero acceleration.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Acceleration of a point Q rigidly attached to B.
    ///
    /// `a_Q = a_Bo + α × p + ω × (ω × p)` with `ω` the angular velocity of B
    /// in the same measuring frame.
    #[must_use]
    #[inline]
    pub fn shift(&self, p_boq: &Vector3<T>, w_ab: &Vector3<T>) -> Self {
        Self::new(
            self.rotational,
            self.translational + self.rotational.cross(p_boq) + w_ab.cross(&w_ab.cross(p_boq)),
        )
    }

    /// Compose `A_WB` from `A_WP` (self) and the motion of B relative to a
    /// frame P that itself moves in W.
    ///
    /// ```text
    /// α_WB = α_WP + α_PB + ω_WP × ω_PB
    /// a_WB = a_WPo + α_WP × p + ω_WP × (ω_WP × p) + 2 ω_WP × v_PB + a_PB
    /// ```
    ///
    /// `p_pobo` is `p_PoBo`; every argument is expressed in W.
    #[must_use]
    pub fn compose_with_moving_frame(
        &self,
        p_pobo: &Vector3<T>,
        w_wp: &Vector3<T>,
        v_pb: &SpatialVelocity<T>,
        a_pb: &Self,
    ) -> Self {
        let two = T::one() + T::one();
        let rotational = self.rotational + a_pb.rotational + w_wp.cross(&v_pb.rotational);
        let translational = self.translational
            + self.rotational.cross(p_pobo)
            + w_wp.cross(&w_wp.cross(p_pobo))
            + w_wp.cross(&v_pb.translational) * two
            + a_pb.translational;
        Self::new(rotational, translational)
    }

    /// Re-express with rotation `R_EF` (self expressed in F).
    #[must_use]
    #[inline]
    pub fn re_express(&self, r_ef: &Matrix3<T>) -> Self {
        Self::new(r_ef * self.rotational, r_ef * self.translational)
    }

    /// Stacked `[α; a]`.
    #[must_use]
    pub fn to_vector6(&self) -> Vector6<T> {
        stack(&self.rotational, &self.translational)
    }
}

impl<T: Real> Default for SpatialAcceleration<T> {
    fn default() -> Self {
        Self::zero()
    }
}

// ========== Operators ==========

macro_rules! impl_motion_ops {
    ($ty:ident) => {
        impl<T: Real> Add for $ty<T> {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::new(
                    self.rotational + rhs.rotational,
                    self.translational + rhs.translational,
                )
            }
        }

        impl<T: Real> AddAssign for $ty<T> {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.rotational += rhs.rotational;
                self.translational += rhs.translational;
            }
        }

        impl<T: Real> Sub for $ty<T> {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::new(
                    self.rotational - rhs.rotational,
                    self.translational - rhs.translational,
                )
            }
        }

        impl<T: Real> Neg for $ty<T> {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self::new(-self.rotational, -self.translational)
            }
        }

        impl<T: Real> $ty<T> {
            /// Check whether both parts are exactly zero.
            #[must_use]
            pub fn is_exact_zero(&self) -> bool {
                self.rotational.iter().chain(self.translational.iter()).all(Zero::is_zero)
            }
        }
    };
}

impl_motion_ops!(SpatialVelocity);
impl_motion_ops!(SpatialAcceleration);

pub(crate) fn stack<T: Real>(top: &Vector3<T>, bottom: &Vector3<T>) -> Vector6<T> {
    Vector6::new(top.x, top.y, top.z, bottom.x, bottom.y, bottom.z)
}
