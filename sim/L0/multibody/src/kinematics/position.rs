//! Position kinematics: body poses from generalized positions.

use nalgebra::Vector3;
use tracing::trace;

use super::ensure_cache;
use crate::context::MultibodyContext;
use crate::error::{MultibodyError, Result};
use crate::scalar::Real;
use crate::spatial::Pose;
use crate::tree::{BodyNodeIndex, MultibodyTree, MultibodyTreeTopology, TreeId};

/// Poses of every body node for one configuration `q`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionKinematicsCache<T: Real> {
    tree_id: TreeId,
    pub(crate) x_wb: Vec<Pose<T>>,
    pub(crate) x_pb: Vec<Pose<T>>,
    pub(crate) x_fm: Vec<Pose<T>>,
    pub(crate) x_wf: Vec<Pose<T>>,
    pub(crate) p_pobo_w: Vec<Vector3<T>>,
    pub(crate) p_mobo_w: Vec<Vector3<T>>,
}

impl<T: Real> PositionKinematicsCache<T> {
    /// Cache sized for `topology`, every pose the identity.
    #[must_use]
    pub fn new(topology: &MultibodyTreeTopology) -> Self {
        let n = topology.num_body_nodes();
        Self {
            tree_id: topology.tree_id(),
            x_wb: vec![Pose::identity(); n],
            x_pb: vec![Pose::identity(); n],
            x_fm: vec![Pose::identity(); n],
            x_wf: vec![Pose::identity(); n],
            p_pobo_w: vec![Vector3::zeros(); n],
            p_mobo_w: vec![Vector3::zeros(); n],
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
        self.x_wb.len()
    }

    /// Pose `X_WB` of the node's body in world.
    pub fn x_wb(&self, node: BodyNodeIndex) -> Result<&Pose<T>> {
        entry(&self.x_wb, node)
    }

    /// Pose `X_PB` of the node's body in its parent body.
    pub fn x_pb(&self, node: BodyNodeIndex) -> Result<&Pose<T>> {
        entry(&self.x_pb, node)
    }

    /// Across-mobilizer pose `X_FM` of the node's inboard mobilizer.
    pub fn x_fm(&self, node: BodyNodeIndex) -> Result<&Pose<T>> {
        entry(&self.x_fm, node)
    }

    /// Pose `X_WF` of the inboard frame F in world.
    pub fn x_wf(&self, node: BodyNodeIndex) -> Result<&Pose<T>> {
        entry(&self.x_wf, node)
    }

    /// Position `p_PoBo_W` of the body origin from the parent body origin.
    pub fn p_pobo_w(&self, node: BodyNodeIndex) -> Result<&Vector3<T>> {
        entry(&self.p_pobo_w, node)
    }

    /// Position `p_MoBo_W` of the body origin from the outboard frame origin.
    pub fn p_mobo_w(&self, node: BodyNodeIndex) -> Result<&Vector3<T>> {
        entry(&self.p_mobo_w, node)
    }
}

pub(crate) fn entry<V>(values: &[V], node: BodyNodeIndex) -> Result<&V> {
    values
        .get(node.0)
        .ok_or_else(|| MultibodyError::out_of_range("body node", node.0, values.len()))
}

impl<T: Real> MultibodyTree<T> {
    /// Allocate a position cache for this finalized tree.
    pub fn create_position_kinematics_cache(&self) -> Result<PositionKinematicsCache<T>> {
        self.ensure_finalized("create position cache")?;
        Ok(PositionKinematicsCache::new(&self.topology))
    }

    pub(crate) fn ensure_position_cache(&self, pc: &PositionKinematicsCache<T>) -> Result<()> {
        ensure_cache(
            pc.tree_id,
            pc.num_nodes(),
            self.tree_id(),
            self.topology.num_body_nodes(),
            "position kinematics cache",
        )
    }

    /// Compute every body pose from the positions in `context`.
    ///
    /// For each node, in evaluation order:
    ///
    /// ```text
    /// X_PB = X_PF · X_FM(q) · X_MB
    /// X_WB = X_WP · X_PB
    /// ```
    ///
    /// The world node is fixed at the identity.
    pub fn calc_position_kinematics_cache(
        &self,
        context: &MultibodyContext<T>,
        pc: &mut PositionKinematicsCache<T>,
    ) -> Result<()> {
        self.ensure_finalized("calc position kinematics")?;
        self.ensure_context(context)?;
        self.ensure_position_cache(pc)?;
        trace!(nodes = pc.num_nodes(), "position kinematics pass");

        let q = context.positions().as_slice();
        let world = BodyNodeIndex::WORLD.0;
        pc.x_wb[world] = Pose::identity();
        pc.x_pb[world] = Pose::identity();
        pc.x_fm[world] = Pose::identity();
        pc.x_wf[world] = Pose::identity();
        pc.p_pobo_w[world] = Vector3::zeros();
        pc.p_mobo_w[world] = Vector3::zeros();

        for &node in self.topology.evaluation_order() {
            let node_topology = &self.topology.body_nodes()[node.0];
            let (Some(mobilizer), Some(parent)) = (node_topology.mobilizer, node_topology.parent)
            else {
                continue;
            };
            let mobilizer = &self.mobilizers[mobilizer.0];
            let x_pf = *self.frames[mobilizer.inboard_frame().0].pose_in_body();
            let x_mb = self.frames[mobilizer.outboard_frame().0]
                .pose_in_body()
                .inverse();
            let x_fm = mobilizer
                .model()
                .calc_x_fm(mobilizer.positions_from_array(q)?);

            let x_wp = pc.x_wb[parent.0];
            let x_pb = x_pf * x_fm * x_mb;
            let x_wf = x_wp * x_pf;

            let n = node.0;
            pc.x_wb[n] = x_wp * x_pb;
            pc.x_pb[n] = x_pb;
            pc.x_fm[n] = x_fm;
            pc.x_wf[n] = x_wf;
            pc.p_pobo_w[n] = x_wp.rotation * x_pb.translation;
            pc.p_mobo_w[n] = x_wf.rotation * (x_fm.rotation * x_mb.translation);
        }
        Ok(())
    }
}
