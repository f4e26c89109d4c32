//! Recursive Newton-Euler inverse dynamics.
//!
//! Two passes over the body nodes:
//!
//! 1. Forward (root → leaves): body spatial accelerations `A_WB` from `v̇`.
//! 2. Backward (leaves → root): at each node, the spatial force the inboard
//!    mobilizer must apply is the body's inertial force, minus the applied
//!    force, plus the forces already transmitted to its children. Projecting
//!    it on the mobilizer's motion subspace gives that mobilizer's `τ`.
//!
//! The backward pass reads each node's applied force and applied `τ` before
//! writing the node's outputs into the same slots, so the in-place variant
//! is safe when the caller reuses input arrays as outputs.

use nalgebra::DVector;

use super::MAX_MOBILIZER_VELOCITIES;
use crate::context::MultibodyContext;
use crate::error::{MultibodyError, Result};
use crate::kinematics::{PositionKinematicsCache, VelocityKinematicsCache};
use crate::scalar::Real;
use crate::spatial::{SpatialAcceleration, SpatialForce};
use crate::tree::{BodyNodeIndex, MultibodyTree, MultibodyTreeTopology};

/// Output buffers of [`MultibodyTree::calc_inverse_dynamics`].
#[derive(Debug, Clone, PartialEq)]
pub struct InverseDynamicsOutput<T: Real> {
    /// Spatial acceleration `A_WB` of each body node, expressed in world.
    pub body_accelerations: Vec<SpatialAcceleration<T>>,
    /// Spatial force `F_BMo_W` each inboard mobilizer applies on its body at
    /// Mo, expressed in world. Zero for the world node.
    pub transmitted_forces: Vec<SpatialForce<T>>,
    /// Generalized forces `τ`.
    pub generalized_forces: DVector<T>,
}

impl<T: Real> InverseDynamicsOutput<T> {
    /// Zeroed buffers sized for `topology`.
    #[must_use]
    pub fn new(topology: &MultibodyTreeTopology) -> Self {
        let n = topology.num_body_nodes();
        Self {
            body_accelerations: vec![SpatialAcceleration::zero(); n],
            transmitted_forces: vec![SpatialForce::zero(); n],
            generalized_forces: DVector::zeros(topology.num_velocities()),
        }
    }
}

fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MultibodyError::dimension(what, expected, actual));
    }
    Ok(())
}

/// Empty means "none"; otherwise the length must match.
fn ensure_optional_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual == 0 {
        return Ok(());
    }
    ensure_len(what, expected, actual)
}

impl<T: Real> MultibodyTree<T> {
    /// Compute generalized forces for generalized accelerations `vdot`.
    ///
    /// `applied_body_forces` holds `F_Bo_W` per body node, applied at each
    /// body origin and expressed in world. `applied_generalized_forces` has
    /// one entry per generalized velocity. Either may be empty, meaning zero.
    ///
    /// Results go to `output`; the inputs are not modified.
    pub fn calc_inverse_dynamics(
        &self,
        context: &MultibodyContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        vdot: &[T],
        applied_body_forces: &[SpatialForce<T>],
        applied_generalized_forces: &[T],
        output: &mut InverseDynamicsOutput<T>,
    ) -> Result<()> {
        let num_nodes = self.topology.num_body_nodes();
        let nv = self.num_velocities();
        ensure_optional_len("applied body forces", num_nodes, applied_body_forces.len())?;
        ensure_optional_len(
            "applied generalized forces",
            nv,
            applied_generalized_forces.len(),
        )?;
        ensure_len("body accelerations", num_nodes, output.body_accelerations.len())?;
        ensure_len("transmitted forces", num_nodes, output.transmitted_forces.len())?;
        ensure_len("generalized forces", nv, output.generalized_forces.len())?;

        if applied_body_forces.is_empty() {
            output.transmitted_forces.fill(SpatialForce::zero());
        } else {
            output.transmitted_forces.copy_from_slice(applied_body_forces);
        }
        if applied_generalized_forces.is_empty() {
            output.generalized_forces.fill(T::zero());
        } else {
            output
                .generalized_forces
                .as_mut_slice()
                .copy_from_slice(applied_generalized_forces);
        }

        self.calc_inverse_dynamics_in_place(
            context,
            pc,
            vc,
            vdot,
            &mut output.transmitted_forces,
            output.generalized_forces.as_mut_slice(),
            &mut output.body_accelerations,
        )
    }

    /// Inverse dynamics with input arrays reused as outputs.
    ///
    /// On entry `forces` holds the applied `F_Bo_W` per body node and `tau`
    /// the applied generalized forces. On return `forces` holds the
    /// transmitted `F_BMo_W` and `tau` the generalized forces. Both must be
    /// full length.
    pub fn calc_inverse_dynamics_in_place(
        &self,
        context: &MultibodyContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        vdot: &[T],
        forces: &mut [SpatialForce<T>],
        tau: &mut [T],
        body_accelerations: &mut [SpatialAcceleration<T>],
    ) -> Result<()> {
        self.check_kinematics_inputs(context, pc, vc, vdot)?;
        let num_nodes = self.topology.num_body_nodes();
        ensure_len("body forces", num_nodes, forces.len())?;
        ensure_len("generalized forces", self.num_velocities(), tau.len())?;
        ensure_len("body accelerations", num_nodes, body_accelerations.len())?;

        // ========== Forward Pass ==========
        self.calc_spatial_accelerations(context, pc, vc, vdot, body_accelerations)?;

        // ========== Backward Pass ==========
        let q = context.positions().as_slice();
        for &node in self.topology.evaluation_order().iter().rev() {
            let node_topology = &self.topology.body_nodes()[node.0];
            let Some(mobilizer) = node_topology.mobilizer else {
                continue;
            };
            let mobilizer = &self.mobilizers[mobilizer.0];
            let n = node.0;
            let x_wb = &pc.x_wb[n];

            // Newton-Euler about Bo, in world.
            let m_bo_w = self.bodies[node_topology.body.0]
                .spatial_inertia()
                .re_express(&x_wb.rotation);
            let f_inertial = m_bo_w.mul_acceleration(&body_accelerations[n])
                + m_bo_w.gyroscopic_force(&vc.v_wb[n].rotational);

            let mut f_bo_w = f_inertial - forces[n];
            for child in &node_topology.children {
                let c = child.0;
                let p_bomc_w = (pc.x_wb[c].translation - x_wb.translation) - pc.p_mobo_w[c];
                f_bo_w += forces[c].shift(&-p_bomc_w);
            }

            let f_bmo_w = f_bo_w.shift(&-pc.p_mobo_w[n]);
            forces[n] = f_bmo_w;

            let t = mobilizer.topology();
            if t.num_velocities > MAX_MOBILIZER_VELOCITIES {
                return Err(MultibodyError::dimension(
                    "mobilizer velocities",
                    MAX_MOBILIZER_VELOCITIES,
                    t.num_velocities,
                ));
            }
            let mut projected = [T::zero(); MAX_MOBILIZER_VELOCITIES];
            let projected = &mut projected[..t.num_velocities];
            let f_bmo_f = f_bmo_w.re_express(&pc.x_wf[n].rotation.transpose());
            mobilizer.model().project_spatial_force(
                mobilizer.positions_from_array(q)?,
                &f_bmo_f,
                projected,
            );
            let slots = &mut tau[t.velocities_start..t.velocities_start + t.num_velocities];
            for (slot, value) in slots.iter_mut().zip(projected.iter()) {
                *slot = *value - *slot;
            }
        }
        forces[BodyNodeIndex::WORLD.0] = SpatialForce::zero();
        Ok(())
    }
}
