//! Velocity kinematics: body spatial velocities from generalized velocities.

use tracing::trace;

use super::ensure_cache;
use super::position::{PositionKinematicsCache, entry};
use crate::context::MultibodyContext;
use crate::error::Result;
use crate::scalar::Real;
use crate::spatial::SpatialVelocity;
use crate::tree::{BodyNodeIndex, MultibodyTree, MultibodyTreeTopology, TreeId};

/// Spatial velocities of every body node for one state `(q, v)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityKinematicsCache<T: Real> {
    tree_id: TreeId,
    pub(crate) v_wb: Vec<SpatialVelocity<T>>,
    pub(crate) v_fm: Vec<SpatialVelocity<T>>,
    pub(crate) v_pb_w: Vec<SpatialVelocity<T>>,
}

impl<T: Real> VelocityKinematicsCache<T> {
    /// Cache sized for `topology`, every velocity zero.
    #[must_use]
    pub fn new(topology: &MultibodyTreeTopology) -> Self {
        let n = topology.num_body_nodes();
        Self {
            tree_id: topology.tree_id(),
            v_wb: vec![SpatialVelocity::zero(); n],
            v_fm: vec![SpatialVelocity::zero(); n],
            v_pb_w: vec![SpatialVelocity::zero(); n],
        }
    }

    /// Set every entry to zero, as for a system at rest.
    pub fn initialize_to_zero(&mut self) {
        for v in self
            .v_wb
            .iter_mut()
            .chain(self.v_fm.iter_mut())
            .chain(self.v_pb_w.iter_mut())
        {
            *v = SpatialVelocity::zero();
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
        self.v_wb.len()
    }

    /// Spatial velocity `V_WB` of the node's body origin, expressed in world.
    pub fn v_wb(&self, node: BodyNodeIndex) -> Result<&SpatialVelocity<T>> {
        entry(&self.v_wb, node)
    }

    /// Across-mobilizer velocity `V_FM`, expressed in F.
    pub fn v_fm(&self, node: BodyNodeIndex) -> Result<&SpatialVelocity<T>> {
        entry(&self.v_fm, node)
    }

    /// Velocity `V_PB` of the body in its parent body, at Bo, expressed in world.
    pub fn v_pb_w(&self, node: BodyNodeIndex) -> Result<&SpatialVelocity<T>> {
        entry(&self.v_pb_w, node)
    }
}

impl<T: Real> MultibodyTree<T> {
    /// Allocate a velocity cache for this finalized tree.
    pub fn create_velocity_kinematics_cache(&self) -> Result<VelocityKinematicsCache<T>> {
        self.ensure_finalized("create velocity cache")?;
        Ok(VelocityKinematicsCache::new(&self.topology))
    }

    pub(crate) fn ensure_velocity_cache(&self, vc: &VelocityKinematicsCache<T>) -> Result<()> {
        ensure_cache(
            vc.tree_id,
            vc.num_nodes(),
            self.tree_id(),
            self.topology.num_body_nodes(),
            "velocity kinematics cache",
        )
    }

    /// Compute every body spatial velocity from the state in `context`.
    ///
    /// `pc` must hold the poses for the same positions; this is not checked.
    ///
    /// ```text
    /// V_PB = V_FM shifted from Mo to Bo
    /// V_WB = V_WP shifted from Po to Bo + V_PB
    /// ```
    pub fn calc_velocity_kinematics_cache(
        &self,
        context: &MultibodyContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &mut VelocityKinematicsCache<T>,
    ) -> Result<()> {
        self.ensure_finalized("calc velocity kinematics")?;
        self.ensure_context(context)?;
        self.ensure_position_cache(pc)?;
        self.ensure_velocity_cache(vc)?;
        trace!(nodes = vc.num_nodes(), "velocity kinematics pass");

        let q = context.positions().as_slice();
        let v = context.velocities().as_slice();
        let world = BodyNodeIndex::WORLD.0;
        vc.v_wb[world] = SpatialVelocity::zero();
        vc.v_fm[world] = SpatialVelocity::zero();
        vc.v_pb_w[world] = SpatialVelocity::zero();

        for &node in self.topology.evaluation_order() {
            let node_topology = &self.topology.body_nodes()[node.0];
            let (Some(mobilizer), Some(parent)) = (node_topology.mobilizer, node_topology.parent)
            else {
                continue;
            };
            let mobilizer = &self.mobilizers[mobilizer.0];
            let n = node.0;

            let v_fm = mobilizer.model().calc_v_fm(
                mobilizer.positions_from_array(q)?,
                mobilizer.velocities_from_array(v)?,
            );
            let v_pb_w = v_fm.re_express(&pc.x_wf[n].rotation).shift(&pc.p_mobo_w[n]);
            let v_wp = vc.v_wb[parent.0];

            vc.v_wb[n] = v_wp.shift(&pc.p_pobo_w[n]) + v_pb_w;
            vc.v_fm[n] = v_fm;
            vc.v_pb_w[n] = v_pb_w;
        }
        Ok(())
    }
}
