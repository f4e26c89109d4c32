//! Mass matrix, bias and gravity terms obtained by probing inverse dynamics.
//!
//! Each probe zeroes the pieces of `ID(q, v, v̇, F_app)` it does not want:
//!
//! | Term            | v        | v̇     | F_app  |
//! |-----------------|----------|-------|--------|
//! | `M` column `j`  | 0        | `e_j` | 0      |
//! | `C(q, v) v`     | context  | 0     | 0      |
//! | `G(q)`          | 0        | 0     | `W`    |

use nalgebra::{DMatrix, DVector};
use tracing::trace;

use super::inverse::InverseDynamicsOutput;
use crate::context::MultibodyContext;
use crate::error::Result;
use crate::kinematics::{PositionKinematicsCache, VelocityKinematicsCache};
use crate::scalar::Real;
use crate::spatial::SpatialForce;
use crate::tree::MultibodyTree;

impl<T: Real> MultibodyTree<T> {
    /// Mass matrix `M(q)` at the positions in `context`, one inverse dynamics
    /// call per column. Velocities in `context` are ignored.
    pub fn calc_mass_matrix_via_inverse_dynamics(
        &self,
        context: &MultibodyContext<T>,
    ) -> Result<DMatrix<T>> {
        let (rest, pc, vc) = self.at_rest(context)?;
        let nv = self.num_velocities();
        trace!(columns = nv, "mass matrix probe");

        let mut mass_matrix = DMatrix::zeros(nv, nv);
        let mut output = InverseDynamicsOutput::new(&self.topology);
        let mut vdot = DVector::zeros(nv);
        for j in 0..nv {
            vdot[j] = T::one();
            self.calc_inverse_dynamics(&rest, &pc, &vc, vdot.as_slice(), &[], &[], &mut output)?;
            mass_matrix.set_column(j, &output.generalized_forces);
            vdot[j] = T::zero();
        }
        Ok(mass_matrix)
    }

    /// Coriolis, centrifugal and gyroscopic term `C(q, v) v` at the state in
    /// `context`.
    pub fn calc_bias_term(&self, context: &MultibodyContext<T>) -> Result<DVector<T>> {
        self.ensure_finalized("calc bias term")?;
        self.ensure_context(context)?;
        let mut pc = self.create_position_kinematics_cache()?;
        self.calc_position_kinematics_cache(context, &mut pc)?;
        let mut vc = self.create_velocity_kinematics_cache()?;
        self.calc_velocity_kinematics_cache(context, &pc, &mut vc)?;

        let vdot = DVector::zeros(self.num_velocities());
        let mut output = InverseDynamicsOutput::new(&self.topology);
        self.calc_inverse_dynamics(context, &pc, &vc, vdot.as_slice(), &[], &[], &mut output)?;
        Ok(output.generalized_forces)
    }

    /// Gravity term `G(q) = ∂V/∂q` at the positions in `context`.
    ///
    /// This is the generalized force the mobilizers must exert to hold the
    /// tree still against the configured gravity. Velocities in `context`
    /// are ignored.
    pub fn calc_gravity_generalized_forces(
        &self,
        context: &MultibodyContext<T>,
    ) -> Result<DVector<T>> {
        let (rest, pc, vc) = self.at_rest(context)?;
        let weights = self.calc_body_weights(&pc)?;
        let vdot = DVector::zeros(self.num_velocities());
        let mut output = InverseDynamicsOutput::new(&self.topology);
        self.calc_inverse_dynamics(&rest, &pc, &vc, vdot.as_slice(), &weights, &[], &mut output)?;
        Ok(output.generalized_forces)
    }

    /// Weight of every body, applied at its body origin and expressed in
    /// world: `[p_BoBcm_W × m g; m g]`. The world entry is zero.
    pub fn calc_body_weights(
        &self,
        pc: &PositionKinematicsCache<T>,
    ) -> Result<Vec<SpatialForce<T>>> {
        self.ensure_finalized("calc body weights")?;
        self.ensure_position_cache(pc)?;
        let g = self.gravity().acceleration.map(T::from_f64);

        let mut weights = vec![SpatialForce::zero(); self.topology.num_body_nodes()];
        for (node, weight) in weights.iter_mut().enumerate().skip(1) {
            let body = &self.bodies[self.topology.body_nodes()[node].body.0];
            let p_bobcm_w = pc.x_wb[node].rotation * body.com();
            let force = g * body.mass();
            *weight = SpatialForce::new(p_bobcm_w.cross(&force), force);
        }
        Ok(weights)
    }

    /// Copy of `context` with zero velocities, plus its position cache and a
    /// zeroed velocity cache.
    fn at_rest(
        &self,
        context: &MultibodyContext<T>,
    ) -> Result<(
        MultibodyContext<T>,
        PositionKinematicsCache<T>,
        VelocityKinematicsCache<T>,
    )> {
        self.ensure_finalized("probe inverse dynamics")?;
        self.ensure_context(context)?;
        let mut rest = context.clone();
        rest.velocities_mut().fill(T::zero());

        let mut pc = self.create_position_kinematics_cache()?;
        self.calc_position_kinematics_cache(&rest, &mut pc)?;
        let mut vc = self.create_velocity_kinematics_cache()?;
        vc.initialize_to_zero();
        Ok((rest, pc, vc))
    }
}
