//! Mobilizers: joints relating an inboard frame F to an outboard frame M.
//!
//! A mobilizer stores only its fixed parameters and its [`MobilizerTopology`]
//! (coordinate offsets). All generalized state lives in the
//! [`MultibodyContext`]; the typed setters and getters read and write the
//! context slice at the mobilizer's own offset.
//!
//! # Conventions
//!
//! Across-mobilizer quantities are measured and expressed in F with M's
//! origin as the reference point:
//!
//! | Quantity | Revolute (axis `â`) | Prismatic (axis `â`) |
//! |----------|---------------------|----------------------|
//! | `X_FM`   | rotation `θ` about `â` | translation `x â` |
//! | `V_FM`   | `[θ̇ â; 0]`          | `[0; ẋ â]`           |
//! | `A_FM`   | `[θ̈ â; 0]`          | `[0; ẍ â]`           |
//! | `τ`      | `â · τ_Mo`          | `â · f`              |

use nalgebra::Vector3;
use tracing::warn;

use super::index::{FrameIndex, MobilizerIndex};
use super::topology::MobilizerTopology;
use crate::context::MultibodyContext;
use crate::error::{MultibodyError, Result};
use crate::scalar::Real;
use crate::spatial::{
    Pose, SpatialAcceleration, SpatialForce, SpatialVelocity, rotation_about_axis,
};

/// Axis norms this close to one are accepted as unit.
const UNIT_AXIS_TOLERANCE: f64 = 1e-12;

/// Axis norms below this are rejected as degenerate.
const MIN_AXIS_NORM: f64 = 1e-10;

/// Local kinematics of a mobilizer, evaluated from its own coordinate slices.
///
/// Slices passed in have exactly `num_positions()` / `num_velocities()`
/// entries.
pub trait MobilizerModel<T: Real> {
    /// Number of generalized positions.
    fn num_positions(&self) -> usize;

    /// Number of generalized velocities.
    fn num_velocities(&self) -> usize;

    /// Across-mobilizer pose `X_FM(q)`.
    fn calc_x_fm(&self, q: &[T]) -> Pose<T>;

    /// Across-mobilizer spatial velocity `V_FM(q, v)`, expressed in F.
    fn calc_v_fm(&self, q: &[T], v: &[T]) -> SpatialVelocity<T>;

    /// Across-mobilizer spatial acceleration `A_FM(q, v, v̇)`, expressed in F.
    fn calc_a_fm(&self, q: &[T], v: &[T], vdot: &[T]) -> SpatialAcceleration<T>;

    /// Generalized forces `τ = Hᵀ F` from the spatial force `F_BMo_F` that the
    /// mobilizer applies on its outboard body at Mo, expressed in F.
    fn project_spatial_force(&self, q: &[T], f_bmo_f: &SpatialForce<T>, tau: &mut [T]);

    /// Write the zero configuration into `q`.
    fn zero_configuration(&self, q: &mut [T]);
}

fn normalize_axis<T: Real>(axis: Vector3<T>) -> Result<Vector3<T>> {
    let norm_squared = axis.dot(&axis);
    let norm = norm_squared.to_f64().sqrt();
    if !norm.is_finite() || norm < MIN_AXIS_NORM {
        return Err(MultibodyError::invalid_parameter(format!(
            "mobilizer axis must be non-zero and finite, got norm {norm}"
        )));
    }
    if (norm - 1.0).abs() <= UNIT_AXIS_TOLERANCE {
        return Ok(axis);
    }
    warn!(norm, "mobilizer axis is not unit length, normalizing");
    Ok(axis / norm_squared.sqrt())
}

// ========== Revolute ==========

/// One rotational degree of freedom about an axis fixed in both F and M.
///
/// Generalized position is the angle, generalized velocity the angular rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RevoluteMobilizer<T: Real> {
    topology: MobilizerTopology,
    axis_f: Vector3<T>,
}

impl<T: Real> RevoluteMobilizer<T> {
    pub(crate) fn new(topology: MobilizerTopology, axis_f: Vector3<T>) -> Result<Self> {
        Ok(Self {
            topology,
            axis_f: normalize_axis(axis_f)?,
        })
    }

    /// Unit rotation axis, expressed in F (equal in M).
    #[must_use]
    pub fn axis(&self) -> &Vector3<T> {
        &self.axis_f
    }

    /// Topology descriptor.
    #[must_use]
    pub fn topology(&self) -> &MobilizerTopology {
        &self.topology
    }

    /// Rotation angle stored in `context`.
    pub fn angle(&self, context: &MultibodyContext<T>) -> Result<T> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        Ok(context.position_segment::<1>(self.topology.positions_start)?[0])
    }

    /// Set the rotation angle in `context`.
    pub fn set_angle(&self, context: &mut MultibodyContext<T>, angle: T) -> Result<&Self> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        context.position_segment_mut::<1>(self.topology.positions_start)?[0] = angle;
        Ok(self)
    }

    /// Angular rate stored in `context`.
    pub fn angular_rate(&self, context: &MultibodyContext<T>) -> Result<T> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        Ok(context.velocity_segment::<1>(self.topology.velocities_start)?[0])
    }

    /// Set the angular rate in `context`.
    pub fn set_angular_rate(&self, context: &mut MultibodyContext<T>, rate: T) -> Result<&Self> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        context.velocity_segment_mut::<1>(self.topology.velocities_start)?[0] = rate;
        Ok(self)
    }

    /// Set the angle to zero.
    pub fn set_zero_configuration(&self, context: &mut MultibodyContext<T>) -> Result<&Self> {
        self.set_angle(context, T::zero())
    }
}

impl<T: Real> MobilizerModel<T> for RevoluteMobilizer<T> {
    fn num_positions(&self) -> usize {
        1
    }

    fn num_velocities(&self) -> usize {
        1
    }

    fn calc_x_fm(&self, q: &[T]) -> Pose<T> {
        Pose::from_rotation(rotation_about_axis(&self.axis_f, q[0]))
    }

    fn calc_v_fm(&self, _q: &[T], v: &[T]) -> SpatialVelocity<T> {
        SpatialVelocity::new(self.axis_f * v[0], Vector3::zeros())
    }

    fn calc_a_fm(&self, _q: &[T], _v: &[T], vdot: &[T]) -> SpatialAcceleration<T> {
        SpatialAcceleration::new(self.axis_f * vdot[0], Vector3::zeros())
    }

    fn project_spatial_force(&self, _q: &[T], f_bmo_f: &SpatialForce<T>, tau: &mut [T]) {
        tau[0] = self.axis_f.dot(&f_bmo_f.torque);
    }

    fn zero_configuration(&self, q: &mut [T]) {
        q[0] = T::zero();
    }
}

// ========== Prismatic ==========

/// One translational degree of freedom along an axis fixed in both F and M.
///
/// Generalized position is the translation, generalized velocity its rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PrismaticMobilizer<T: Real> {
    topology: MobilizerTopology,
    axis_f: Vector3<T>,
}

impl<T: Real> PrismaticMobilizer<T> {
    pub(crate) fn new(topology: MobilizerTopology, axis_f: Vector3<T>) -> Result<Self> {
        Ok(Self {
            topology,
            axis_f: normalize_axis(axis_f)?,
        })
    }

    /// Unit translation axis, expressed in F.
    #[must_use]
    pub fn axis(&self) -> &Vector3<T> {
        &self.axis_f
    }

    /// Topology descriptor.
    #[must_use]
    pub fn topology(&self) -> &MobilizerTopology {
        &self.topology
    }

    /// Translation stored in `context`.
    pub fn translation(&self, context: &MultibodyContext<T>) -> Result<T> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        Ok(context.position_segment::<1>(self.topology.positions_start)?[0])
    }

    /// Set the translation in `context`.
    pub fn set_translation(&self, context: &mut MultibodyContext<T>, x: T) -> Result<&Self> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        context.position_segment_mut::<1>(self.topology.positions_start)?[0] = x;
        Ok(self)
    }

    /// Translation rate stored in `context`.
    pub fn translation_rate(&self, context: &MultibodyContext<T>) -> Result<T> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        Ok(context.velocity_segment::<1>(self.topology.velocities_start)?[0])
    }

    /// Set the translation rate in `context`.
    pub fn set_translation_rate(&self, context: &mut MultibodyContext<T>, rate: T) -> Result<&Self> {
        context.ensure_tree(self.topology.tree_id, "context")?;
        context.velocity_segment_mut::<1>(self.topology.velocities_start)?[0] = rate;
        Ok(self)
    }

    /// Set the translation to zero.
    pub fn set_zero_configuration(&self, context: &mut MultibodyContext<T>) -> Result<&Self> {
        self.set_translation(context, T::zero())
    }
}

impl<T: Real> MobilizerModel<T> for PrismaticMobilizer<T> {
    fn num_positions(&self) -> usize {
        1
    }

    fn num_velocities(&self) -> usize {
        1
    }

    fn calc_x_fm(&self, q: &[T]) -> Pose<T> {
        Pose::from_translation(self.axis_f * q[0])
    }

    fn calc_v_fm(&self, _q: &[T], v: &[T]) -> SpatialVelocity<T> {
        SpatialVelocity::new(Vector3::zeros(), self.axis_f * v[0])
    }

    fn calc_a_fm(&self, _q: &[T], _v: &[T], vdot: &[T]) -> SpatialAcceleration<T> {
        SpatialAcceleration::new(Vector3::zeros(), self.axis_f * vdot[0])
    }

    fn project_spatial_force(&self, _q: &[T], f_bmo_f: &SpatialForce<T>, tau: &mut [T]) {
        tau[0] = self.axis_f.dot(&f_bmo_f.force);
    }

    fn zero_configuration(&self, q: &mut [T]) {
        q[0] = T::zero();
    }
}

fn segment<'a, T>(data: &'a [T], start: usize, len: usize, what: &'static str) -> Result<&'a [T]> {
    data.get(start..start + len)
        .ok_or_else(|| MultibodyError::dimension(what, start + len, data.len()))
}

// ========== Tagged Variant ==========

/// A mobilizer of any supported layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Mobilizer<T: Real> {
    /// One rotational degree of freedom.
    Revolute(RevoluteMobilizer<T>),
    /// One translational degree of freedom.
    Prismatic(PrismaticMobilizer<T>),
}

impl<T: Real> Mobilizer<T> {
    /// Local kinematics of this mobilizer.
    #[must_use]
    pub fn model(&self) -> &dyn MobilizerModel<T> {
        match self {
            Self::Revolute(m) => m,
            Self::Prismatic(m) => m,
        }
    }

    /// Topology descriptor.
    #[must_use]
    pub fn topology(&self) -> &MobilizerTopology {
        match self {
            Self::Revolute(m) => &m.topology,
            Self::Prismatic(m) => &m.topology,
        }
    }

    pub(crate) fn set_topology(&mut self, topology: MobilizerTopology) {
        match self {
            Self::Revolute(m) => m.topology = topology,
            Self::Prismatic(m) => m.topology = topology,
        }
    }

    /// Variant name.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Revolute(_) => "revolute",
            Self::Prismatic(_) => "prismatic",
        }
    }

    /// This mobilizer's index.
    #[must_use]
    pub fn index(&self) -> MobilizerIndex {
        self.topology().index
    }

    /// Inboard frame F.
    #[must_use]
    pub fn inboard_frame(&self) -> FrameIndex {
        self.topology().inboard_frame
    }

    /// Outboard frame M.
    #[must_use]
    pub fn outboard_frame(&self) -> FrameIndex {
        self.topology().outboard_frame
    }

    /// Position slice of this mobilizer in a full generalized position vector.
    pub fn positions_from_array<'a>(&self, q: &'a [T]) -> Result<&'a [T]> {
        let t = self.topology();
        segment(q, t.positions_start, t.num_positions, "generalized positions")
    }

    /// Velocity slice of this mobilizer in a full generalized velocity vector.
    pub fn velocities_from_array<'a>(&self, v: &'a [T]) -> Result<&'a [T]> {
        let t = self.topology();
        segment(v, t.velocities_start, t.num_velocities, "generalized velocities")
    }

    /// Acceleration slice of this mobilizer in a full generalized
    /// acceleration vector.
    pub fn accelerations_from_array<'a>(&self, vdot: &'a [T]) -> Result<&'a [T]> {
        let t = self.topology();
        segment(vdot, t.velocities_start, t.num_velocities, "generalized accelerations")
    }

    /// Mutable acceleration slice of this mobilizer.
    pub fn accelerations_from_array_mut<'a>(&self, vdot: &'a mut [T]) -> Result<&'a mut [T]> {
        let t = self.topology();
        let end = t.velocities_start + t.num_velocities;
        let len = vdot.len();
        vdot.get_mut(t.velocities_start..end)
            .ok_or_else(|| MultibodyError::dimension("generalized accelerations", end, len))
    }

    /// Write the zero configuration and zero velocity into `context`.
    pub fn set_zero_state(&self, context: &mut MultibodyContext<T>) -> Result<()> {
        let t = *self.topology();
        context.ensure_tree(t.tree_id, "context")?;
        let q = context.positions_range_mut(t.positions_start, t.num_positions)?;
        self.model().zero_configuration(q);
        context
            .velocities_range_mut(t.velocities_start, t.num_velocities)?
            .fill(T::zero());
        Ok(())
    }
}
