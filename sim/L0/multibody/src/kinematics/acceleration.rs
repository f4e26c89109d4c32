//! Acceleration kinematics: body spatial accelerations from `v̇`.
//!
//! The same forward pass feeds inverse dynamics, which runs it into its own
//! output array.

use tracing::trace;

use super::ensure_cache;
use super::position::{PositionKinematicsCache, entry};
use super::velocity::VelocityKinematicsCache;
use crate::context::MultibodyContext;
use crate::error::{MultibodyError, Result};
use crate::scalar::Real;
use crate::spatial::SpatialAcceleration;
use crate::tree::{BodyNodeIndex, MultibodyTree, MultibodyTreeTopology, TreeId};

/// Spatial accelerations of every body node for one `(q, v, v̇)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccelerationKinematicsCache<T: Real> {
    tree_id: TreeId,
    pub(crate) a_wb: Vec<SpatialAcceleration<T>>,
}

impl<T: Real> AccelerationKinematicsCache<T> {
    /// Cache sized for `topology`, every acceleration zero.
    #[must_use]
    pub fn new(topology: &MultibodyTreeTopology) -> Self {
        Self {
            tree_id: topology.tree_id(),
            a_wb: vec![SpatialAcceleration::zero(); topology.num_body_nodes()],
        }
    }

    /// Identity of the tree this cache was sized for.
    #[must_use]
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// Number of body nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.a_wb.len()
    }

    /// Spatial acceleration `A_WB` of the node's body origin, expressed in world.
    pub fn a_wb(&self, node: BodyNodeIndex) -> Result<&SpatialAcceleration<T>> {
        entry(&self.a_wb, node)
    }

    /// All accelerations, indexed by body node.
    #[must_use]
    pub fn a_wb_array(&self) -> &[SpatialAcceleration<T>] {
        &self.a_wb
    }
}

impl<T: Real> MultibodyTree<T> {
    /// Allocate an acceleration cache for this finalized tree.
    pub fn create_acceleration_kinematics_cache(
        &self,
    ) -> Result<AccelerationKinematicsCache<T>> {
        self.ensure_finalized("create acceleration cache")?;
        Ok(AccelerationKinematicsCache::new(&self.topology))
    }

    /// Compute every body spatial acceleration for generalized accelerations
    /// `vdot`.
    pub fn calc_acceleration_kinematics_cache(
        &self,
        context: &MultibodyContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        vdot: &[T],
        ac: &mut AccelerationKinematicsCache<T>,
    ) -> Result<()> {
        ensure_cache(
            ac.tree_id,
            ac.num_nodes(),
            self.tree_id(),
            self.topology.num_body_nodes(),
            "acceleration kinematics cache",
        )?;
        self.check_kinematics_inputs(context, pc, vc, vdot)?;
        self.calc_spatial_accelerations(context, pc, vc, vdot, &mut ac.a_wb)
    }

    pub(crate) fn check_kinematics_inputs(
        &self,
        context: &MultibodyContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        vdot: &[T],
    ) -> Result<()> {
        self.ensure_finalized("calc accelerations")?;
        self.ensure_context(context)?;
        self.ensure_position_cache(pc)?;
        self.ensure_velocity_cache(vc)?;
        if vdot.len() != self.num_velocities() {
            return Err(MultibodyError::dimension(
                "vdot",
                self.num_velocities(),
                vdot.len(),
            ));
        }
        Ok(())
    }

    /// Forward pass. Inputs are already checked; `a_wb` has one entry per node.
    ///
    /// ```text
    /// A_PB = A_FM shifted from Mo to Bo (with ω_FM)
    /// A_WB = A_WP composed with the motion of B in the moving frame P
    /// ```
    pub(crate) fn calc_spatial_accelerations(
        &self,
        context: &MultibodyContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        vdot: &[T],
        a_wb: &mut [SpatialAcceleration<T>],
    ) -> Result<()> {
        trace!(nodes = a_wb.len(), "acceleration kinematics pass");
        let q = context.positions().as_slice();
        let v = context.velocities().as_slice();
        a_wb[BodyNodeIndex::WORLD.0] = SpatialAcceleration::zero();

        for &node in self.topology.evaluation_order() {
            let node_topology = &self.topology.body_nodes()[node.0];
            let (Some(mobilizer), Some(parent)) = (node_topology.mobilizer, node_topology.parent)
            else {
                continue;
            };
            let mobilizer = &self.mobilizers[mobilizer.0];
            let n = node.0;

            let a_fm = mobilizer.model().calc_a_fm(
                mobilizer.positions_from_array(q)?,
                mobilizer.velocities_from_array(v)?,
                mobilizer.accelerations_from_array(vdot)?,
            );
            let v_pb_w = &vc.v_pb_w[n];
            let a_pb_w = a_fm
                .re_express(&pc.x_wf[n].rotation)
                .shift(&pc.p_mobo_w[n], &v_pb_w.rotational);
            let w_wp = vc.v_wb[parent.0].rotational;

            a_wb[n] = a_wb[parent.0].compose_with_moving_frame(
                &pc.p_pobo_w[n],
                &w_wp,
                v_pb_w,
                &a_pb_w,
            );
        }
        Ok(())
    }
}
