//! Rigid transforms.

use std::ops::Mul;

use nalgebra::{Matrix3, Matrix4, Vector3};
use num_traits::Zero;

use crate::scalar::{Real, cast};

/// Rotation matrix for a rotation of `angle` about the unit vector `axis`.
///
/// Rodrigues' formula `R = I + sin θ [k]× + (1 − cos θ) [k]×²`.
#[must_use]
pub fn rotation_about_axis<T: Real>(axis: &Vector3<T>, angle: T) -> Matrix3<T> {
    let z = T::zero();
    let k = Matrix3::new(z, -axis.z, axis.y, axis.z, z, -axis.x, -axis.y, axis.x, z);
    let one_minus_cos = T::one() - angle.cos();
    Matrix3::identity() + k * angle.sin() + (k * k) * one_minus_cos
}

/// Rigid transform `X_AB`: orientation and origin of frame B in frame A.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use sim_multibody::Pose;
///
/// let x_ab = Pose::from_translation(Vector3::new(1.0, 0.0, 0.0));
/// let x_bc = Pose::from_translation(Vector3::new(0.0, 2.0, 0.0));
/// let x_ac = x_ab * x_bc;
/// assert_eq!(x_ac.translation, Vector3::new(1.0, 2.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose<T: Real> {
    /// Rotation matrix `R_AB`.
    pub rotation: Matrix3<T>,
    /// Position `p_AoBo_A`.
    pub translation: Vector3<T>,
}

impl<T: Real> Default for Pose<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Real> Pose<T> {
    /// Create a pose from its rotation and translation.
    #[must_use]
    pub fn new(rotation: Matrix3<T>, translation: Vector3<T>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<T>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// Pure rotation.
    #[must_use]
    pub fn from_rotation(rotation: Matrix3<T>) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    /// Compose `X_AC = X_AB * X_BC`.
    #[must_use]
    #[inline]
    pub fn compose(&self, x_bc: &Self) -> Self {
        Self::new(
            self.rotation * x_bc.rotation,
            self.translation + self.rotation * x_bc.translation,
        )
    }

    /// Inverse `X_BA`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let r_ba = self.rotation.transpose();
        Self::new(r_ba, -(r_ba * self.translation))
    }

    /// Map a point measured in B to A.
    #[must_use]
    #[inline]
    pub fn transform_point(&self, p_bq: &Vector3<T>) -> Vector3<T> {
        self.translation + self.rotation * p_bq
    }

    /// Re-express a free vector from B to A.
    #[must_use]
    #[inline]
    pub fn rotate(&self, v_b: &Vector3<T>) -> Vector3<T> {
        self.rotation * v_b
    }

    /// 4×4 homogeneous matrix.
    #[must_use]
    pub fn to_homogeneous(&self) -> Matrix4<T> {
        let mut m = Matrix4::zeros();
        for i in 0..3 {
            for j in 0..3 {
                m[(i, j)] = self.rotation[(i, j)];
            }
            m[(i, 3)] = self.translation[i];
        }
        m[(3, 3)] = T::one();
        m
    }

    /// Convert to another scalar type through the value part.
    #[must_use]
    pub fn cast<U: Real>(&self) -> Pose<U> {
        Pose::new(
            self.rotation.map(cast::<T, U>),
            self.translation.map(cast::<T, U>),
        )
    }

    /// Check whether the rotation block is exactly the identity and the
    /// translation exactly zero.
    #[must_use]
    pub fn is_exact_identity(&self) -> bool {
        self.translation.iter().all(Zero::is_zero) && self.rotation == Matrix3::identity()
    }
}

impl<T: Real> Mul for Pose<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

impl<T: Real> Mul<&Pose<T>> for &Pose<T> {
    type Output = Pose<T>;

    #[inline]
    fn mul(self, rhs: &Pose<T>) -> Pose<T> {
        self.compose(rhs)
    }
}
