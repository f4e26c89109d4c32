//! Unit inertia and spatial inertia.

use nalgebra::{Matrix3, Vector3};

use super::force::SpatialForce;
use super::motion::SpatialAcceleration;
use crate::error::{MultibodyError, Result};
use crate::scalar::{Real, cast};

/// Rotational inertia of a unit-mass body, `G = I / m`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitInertia<T: Real> {
    matrix: Matrix3<T>,
}

impl<T: Real> UnitInertia<T> {
    /// Unit inertia from a symmetric 3×3 matrix.
    #[must_use]
    pub fn from_matrix(matrix: Matrix3<T>) -> Self {
        Self { matrix }
    }

    /// Principal moments along the frame axes.
    #[must_use]
    pub fn from_diagonal(ixx: T, iyy: T, izz: T) -> Self {
        Self::from_matrix(Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz)))
    }

    /// Unit-mass solid sphere of the given radius about its center.
    #[must_use]
    pub fn solid_sphere(radius: T) -> Self {
        let i = T::from_f64(0.4) * radius * radius;
        Self::from_diagonal(i, i, i)
    }

    /// Unit-mass thin rod along the unit direction `b`, with moment `moment`
    /// about any axis perpendicular to it: `G = K (1 − b bᵀ)`.
    #[must_use]
    pub fn straight_line(moment: T, direction: &Vector3<T>) -> Self {
        let projector = Matrix3::identity() - direction * direction.transpose();
        Self::from_matrix(projector * moment)
    }

    /// Unit inertia of a unit point mass at `p`: `|p|² 1 − p pᵀ`.
    #[must_use]
    pub fn point_mass(p: &Vector3<T>) -> Self {
        Self::from_matrix(Matrix3::identity() * p.dot(p) - p * p.transpose())
    }

    /// The 3×3 matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3<T> {
        &self.matrix
    }

    /// Re-express with rotation `R_EF`: `R G Rᵀ`.
    #[must_use]
    pub fn re_express(&self, r_ef: &Matrix3<T>) -> Self {
        Self::from_matrix(r_ef * self.matrix * r_ef.transpose())
    }

    /// Convert to another scalar type through the value part.
    #[must_use]
    pub fn cast<U: Real>(&self) -> UnitInertia<U> {
        UnitInertia::from_matrix(self.matrix.map(cast::<T, U>))
    }
}

/// Spatial inertia `M_BP` of body B about point P.
///
/// Stored as mass, the center of mass position `p_PBcm`, and the unit inertia
/// `G_BP` about P, all expressed in the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialInertia<T: Real> {
    mass: T,
    p_com: Vector3<T>,
    unit_inertia: UnitInertia<T>,
}

impl<T: Real> SpatialInertia<T> {
    /// Spatial inertia about P from mass, `p_PBcm` and unit inertia about P.
    #[must_use]
    pub fn new(mass: T, p_com: Vector3<T>, unit_inertia: UnitInertia<T>) -> Self {
        Self {
            mass,
            p_com,
            unit_inertia,
        }
    }

    /// Spatial inertia about P from the unit inertia about the center of mass.
    #[must_use]
    pub fn from_com_inertia(mass: T, p_com: Vector3<T>, unit_inertia_com: UnitInertia<T>) -> Self {
        let g_p = *unit_inertia_com.matrix() + *UnitInertia::point_mass(&p_com).matrix();
        Self::new(mass, p_com, UnitInertia::from_matrix(g_p))
    }

    /// Zero mass and inertia. Used for the world body.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(T::zero(), Vector3::zeros(), UnitInertia::from_matrix(Matrix3::zeros()))
    }

    /// Body mass.
    #[must_use]
    pub fn mass(&self) -> T {
        self.mass
    }

    /// Center of mass position from the about-point.
    #[must_use]
    pub fn com(&self) -> &Vector3<T> {
        &self.p_com
    }

    /// Unit inertia about the about-point.
    #[must_use]
    pub fn unit_inertia(&self) -> &UnitInertia<T> {
        &self.unit_inertia
    }

    /// Rotational inertia `I = m G` about the about-point.
    #[must_use]
    pub fn rotational_inertia(&self) -> Matrix3<T> {
        *self.unit_inertia.matrix() * self.mass
    }

    /// Move the about-point from P to Q, given `p_PQ`.
    ///
    /// Goes through the center of mass: `G_Q = G_P − G(p_PBcm) + G(p_QBcm)`.
    #[must_use]
    pub fn shift(&self, p_pq: &Vector3<T>) -> Self {
        let p_qcom = self.p_com - p_pq;
        let g_q = *self.unit_inertia.matrix() - *UnitInertia::point_mass(&self.p_com).matrix()
            + *UnitInertia::point_mass(&p_qcom).matrix();
        Self::new(self.mass, p_qcom, UnitInertia::from_matrix(g_q))
    }

    /// Re-express with rotation `R_EF` (self expressed in F).
    #[must_use]
    pub fn re_express(&self, r_ef: &Matrix3<T>) -> Self {
        Self::new(self.mass, r_ef * self.p_com, self.unit_inertia.re_express(r_ef))
    }

    /// Product `M · A`.
    ///
    /// `τ = I α + m p × a`, `f = m (a + α × p)` with `p = p_PBcm`.
    #[must_use]
    pub fn mul_acceleration(&self, a: &SpatialAcceleration<T>) -> SpatialForce<T> {
        let torque = self.rotational_inertia() * a.rotational
            + self.p_com.cross(&a.translational) * self.mass;
        let force = (a.translational + a.rotational.cross(&self.p_com)) * self.mass;
        SpatialForce::new(torque, force)
    }

    /// Velocity-dependent inertial force for a body spinning at `w`:
    /// `[ω × I ω; m ω × (ω × p)]`.
    #[must_use]
    pub fn gyroscopic_force(&self, w: &Vector3<T>) -> SpatialForce<T> {
        let torque = w.cross(&(self.rotational_inertia() * w));
        let force = w.cross(&w.cross(&self.p_com)) * self.mass;
        SpatialForce::new(torque, force)
    }

    /// Validate the mass is non-negative.
    pub fn validate(&self) -> Result<()> {
        let mass = self.mass.to_f64();
        if !mass.is_finite() || mass < 0.0 {
            return Err(MultibodyError::invalid_parameter(format!(
                "mass must be finite and non-negative, got {mass}"
            )));
        }
        Ok(())
    }

    /// Convert to another scalar type through the value part.
    #[must_use]
    pub fn cast<U: Real>(&self) -> SpatialInertia<U> {
        SpatialInertia::new(
            cast(self.mass),
            self.p_com.map(cast::<T, U>),
            self.unit_inertia.cast(),
        )
    }
}
