//! The multibody tree: an arena of bodies, frames and mobilizers.
//!
//! # Lifecycle
//!
//! 1. Build: [`add_body`](MultibodyTree::add_body),
//!    [`add_frame`](MultibodyTree::add_frame) and the `add_*_mobilizer`
//!    operations append elements and return dense index handles.
//! 2. Freeze: [`finalize`](MultibodyTree::finalize) computes the evaluation
//!    order and coordinate layout. Every structural edit fails afterwards.
//! 3. Evaluate: [`create_default_context`](MultibodyTree::create_default_context),
//!    then the kinematics and dynamics passes, any number of times.
//!
//! Elements are owned by the tree; callers receive shared references obtained
//! through bounds-checked index lookups.

mod body;
mod frame;
mod index;
mod mobilizer;
mod topology;

pub use body::Body;
pub use frame::{Frame, FrameAnchor, FrameKind};
pub use index::{BodyIndex, BodyNodeIndex, FrameIndex, MobilizerIndex, TreeId};
pub use mobilizer::{Mobilizer, MobilizerModel, PrismaticMobilizer, RevoluteMobilizer};
pub use topology::{
    BodyNodeTopology, BodyTopology, FrameTopology, MobilizerTopology, MultibodyTreeTopology,
};

use nalgebra::Vector3;
use tracing::debug;

use crate::autodiff::Dual;
use crate::config::{Gravity, TreeConfig};
use crate::context::MultibodyContext;
use crate::dynamics::MAX_MOBILIZER_VELOCITIES;
use crate::error::{MultibodyError, Result};
use crate::scalar::{Real, cast};
use crate::spatial::{Pose, SpatialInertia};

/// A tree of rigid bodies connected by mobilizers, generic over the scalar.
///
/// Cloning yields an independent tree with a fresh [`TreeId`], so contexts
/// and caches of the source are rejected by the clone and vice versa.
#[derive(Debug)]
pub struct MultibodyTree<T: Real = f64> {
    config: TreeConfig,
    pub(crate) bodies: Vec<Body<T>>,
    pub(crate) frames: Vec<Frame<T>>,
    pub(crate) mobilizers: Vec<Mobilizer<T>>,
    pub(crate) topology: MultibodyTreeTopology,
}

impl<T: Real> Clone for MultibodyTree<T> {
    fn clone(&self) -> Self {
        let mut topology = self.topology.clone();
        topology.reassign_tree_id(TreeId::next());
        let mut mobilizers = self.mobilizers.clone();
        for (mobilizer, descriptor) in mobilizers.iter_mut().zip(topology.mobilizers()) {
            mobilizer.set_topology(*descriptor);
        }
        Self {
            config: self.config,
            bodies: self.bodies.clone(),
            frames: self.frames.clone(),
            mobilizers,
            topology,
        }
    }
}

impl<T: Real> Default for MultibodyTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> MultibodyTree<T> {
    /// Tree holding only the world body, with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Tree holding only the world body.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            config,
            bodies: vec![Body::new(
                BodyIndex::WORLD,
                FrameIndex::WORLD,
                SpatialInertia::zero(),
            )],
            frames: vec![Frame::body_frame(FrameIndex::WORLD, BodyIndex::WORLD)],
            mobilizers: Vec::new(),
            topology: MultibodyTreeTopology::new(),
        }
    }

    // ========== Structural Operations ==========

    /// Append a body with spatial inertia `M_Bo_B` and create its body frame.
    pub fn add_body(&mut self, spatial_inertia: SpatialInertia<T>) -> Result<BodyIndex> {
        if self.topology.is_valid() {
            return Err(MultibodyError::AlreadyFinalized {
                operation: "add body",
            });
        }
        spatial_inertia.validate()?;
        let (body, frame) = self.topology.add_body()?;
        self.bodies.push(Body::new(body, frame, spatial_inertia));
        self.frames.push(Frame::body_frame(frame, body));
        Ok(body)
    }

    /// Append a frame with constant pose `x_pf` relative to `anchor`.
    pub fn add_frame(
        &mut self,
        anchor: impl Into<FrameAnchor>,
        x_pf: Pose<T>,
    ) -> Result<FrameIndex> {
        if self.topology.is_valid() {
            return Err(MultibodyError::AlreadyFinalized {
                operation: "add frame",
            });
        }
        let parent = match anchor.into() {
            FrameAnchor::Body(body) => self.body(body)?.body_frame_index(),
            FrameAnchor::Frame(frame) => frame,
        };
        let parent_frame = self.frame(parent)?;
        let body = parent_frame.body();
        let x_bp = *parent_frame.pose_in_body();
        let index = self.topology.add_frame(body)?;
        self.frames
            .push(Frame::fixed_offset(index, body, parent, x_pf, &x_bp));
        Ok(index)
    }

    /// Append a revolute mobilizer rotating `outboard_frame` about `axis_f`
    /// (expressed in `inboard_frame`).
    pub fn add_revolute_mobilizer(
        &mut self,
        inboard_frame: FrameIndex,
        outboard_frame: FrameIndex,
        axis_f: Vector3<T>,
    ) -> Result<MobilizerIndex> {
        self.add_mobilizer(inboard_frame, outboard_frame, |topology| {
            RevoluteMobilizer::new(topology, axis_f).map(Mobilizer::Revolute)
        })
    }

    /// Append a prismatic mobilizer translating `outboard_frame` along
    /// `axis_f` (expressed in `inboard_frame`).
    pub fn add_prismatic_mobilizer(
        &mut self,
        inboard_frame: FrameIndex,
        outboard_frame: FrameIndex,
        axis_f: Vector3<T>,
    ) -> Result<MobilizerIndex> {
        self.add_mobilizer(inboard_frame, outboard_frame, |topology| {
            PrismaticMobilizer::new(topology, axis_f).map(Mobilizer::Prismatic)
        })
    }

    fn add_mobilizer(
        &mut self,
        inboard_frame: FrameIndex,
        outboard_frame: FrameIndex,
        build: impl FnOnce(MobilizerTopology) -> Result<Mobilizer<T>>,
    ) -> Result<MobilizerIndex> {
        if self.topology.is_valid() {
            return Err(MultibodyError::AlreadyFinalized {
                operation: "add mobilizer",
            });
        }
        let mut mobilizer = build(MobilizerTopology::unregistered(self.tree_id()))?;
        let model = mobilizer.model();
        let (num_positions, num_velocities) = (model.num_positions(), model.num_velocities());
        if num_velocities > MAX_MOBILIZER_VELOCITIES {
            return Err(MultibodyError::dimension(
                "mobilizer velocities",
                MAX_MOBILIZER_VELOCITIES,
                num_velocities,
            ));
        }
        let topology =
            self.topology
                .add_mobilizer(inboard_frame, outboard_frame, num_positions, num_velocities)?;
        mobilizer.set_topology(topology);
        self.mobilizers.push(mobilizer);
        Ok(topology.index)
    }

    /// Freeze the tree.
    ///
    /// Fails if already finalized or if some body has no inboard mobilizer.
    pub fn finalize(&mut self) -> Result<()> {
        self.topology.finalize()?;
        for (mobilizer, topology) in self.mobilizers.iter_mut().zip(self.topology.mobilizers()) {
            mobilizer.set_topology(*topology);
        }
        debug!(
            tree = %self.topology.tree_id(),
            bodies = self.num_bodies(),
            frames = self.num_frames(),
            mobilizers = self.num_mobilizers(),
            positions = self.num_positions(),
            velocities = self.num_velocities(),
            height = self.topology.tree_height(),
            "finalized multibody tree"
        );
        Ok(())
    }

    /// Whether the tree has been finalized.
    #[must_use]
    pub fn topology_is_valid(&self) -> bool {
        self.topology.is_valid()
    }

    // ========== Context ==========

    /// Allocate a context with every mobilizer in its zero state.
    pub fn create_default_context(&self) -> Result<MultibodyContext<T>> {
        self.ensure_finalized("create context")?;
        let mut context = MultibodyContext::zeros(
            self.topology.tree_id(),
            self.num_positions(),
            self.num_velocities(),
        );
        self.set_default_state(&mut context)?;
        debug!(
            tree = %self.topology.tree_id(),
            positions = context.num_positions(),
            velocities = context.num_velocities(),
            "created default context"
        );
        Ok(context)
    }

    /// Put every mobilizer of `context` in its zero state.
    pub fn set_default_state(&self, context: &mut MultibodyContext<T>) -> Result<()> {
        self.ensure_context(context)?;
        for mobilizer in &self.mobilizers {
            mobilizer.set_zero_state(context)?;
        }
        Ok(())
    }

    pub(crate) fn ensure_finalized(&self, operation: &'static str) -> Result<()> {
        if !self.topology.is_valid() {
            return Err(MultibodyError::NotFinalized { operation });
        }
        Ok(())
    }

    pub(crate) fn ensure_context(&self, context: &MultibodyContext<T>) -> Result<()> {
        context.ensure_tree(self.topology.tree_id(), "context")?;
        if context.num_positions() != self.num_positions() {
            return Err(MultibodyError::dimension(
                "context positions",
                self.num_positions(),
                context.num_positions(),
            ));
        }
        if context.num_velocities() != self.num_velocities() {
            return Err(MultibodyError::dimension(
                "context velocities",
                self.num_velocities(),
                context.num_velocities(),
            ));
        }
        Ok(())
    }

    // ========== Accessors ==========

    /// Tree configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Gravity field.
    #[must_use]
    pub fn gravity(&self) -> &Gravity {
        &self.config.gravity
    }

    /// Connectivity and coordinate layout.
    #[must_use]
    pub fn topology(&self) -> &MultibodyTreeTopology {
        &self.topology
    }

    /// Identity of this tree.
    #[must_use]
    pub fn tree_id(&self) -> TreeId {
        self.topology.tree_id()
    }

    /// Number of bodies, world included.
    #[must_use]
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Number of frames, body frames included.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of mobilizers.
    #[must_use]
    pub fn num_mobilizers(&self) -> usize {
        self.mobilizers.len()
    }

    /// Total generalized positions.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.topology.num_positions()
    }

    /// Total generalized velocities.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.topology.num_velocities()
    }

    /// Body by index.
    pub fn body(&self, index: BodyIndex) -> Result<&Body<T>> {
        self.bodies
            .get(index.0)
            .ok_or_else(|| MultibodyError::out_of_range("body", index.0, self.bodies.len()))
    }

    /// Frame by index.
    pub fn frame(&self, index: FrameIndex) -> Result<&Frame<T>> {
        self.frames
            .get(index.0)
            .ok_or_else(|| MultibodyError::out_of_range("frame", index.0, self.frames.len()))
    }

    /// Mobilizer by index.
    pub fn mobilizer(&self, index: MobilizerIndex) -> Result<&Mobilizer<T>> {
        self.mobilizers.get(index.0).ok_or_else(|| {
            MultibodyError::out_of_range("mobilizer", index.0, self.mobilizers.len())
        })
    }

    /// All bodies, indexed by [`BodyIndex`].
    #[must_use]
    pub fn bodies(&self) -> &[Body<T>] {
        &self.bodies
    }

    /// All mobilizers, indexed by [`MobilizerIndex`].
    #[must_use]
    pub fn mobilizers(&self) -> &[Mobilizer<T>] {
        &self.mobilizers
    }

    /// The world body.
    #[must_use]
    pub fn world_body(&self) -> &Body<T> {
        &self.bodies[BodyIndex::WORLD.0]
    }

    /// The world body frame.
    #[must_use]
    pub fn world_frame(&self) -> &Frame<T> {
        &self.frames[FrameIndex::WORLD.0]
    }

    /// Revolute mobilizer by index.
    pub fn revolute_mobilizer(&self, index: MobilizerIndex) -> Result<&RevoluteMobilizer<T>> {
        match self.mobilizer(index)? {
            Mobilizer::Revolute(m) => Ok(m),
            Mobilizer::Prismatic(_) => Err(MultibodyError::MobilizerKindMismatch {
                index: index.0,
                expected: "revolute",
            }),
        }
    }

    /// Prismatic mobilizer by index.
    pub fn prismatic_mobilizer(&self, index: MobilizerIndex) -> Result<&PrismaticMobilizer<T>> {
        match self.mobilizer(index)? {
            Mobilizer::Prismatic(m) => Ok(m),
            Mobilizer::Revolute(_) => Err(MultibodyError::MobilizerKindMismatch {
                index: index.0,
                expected: "prismatic",
            }),
        }
    }

    /// Body node of `body`. Assigned to a body together with its inboard
    /// mobilizer; the world body is always node 0.
    pub fn body_node_index(&self, body: BodyIndex) -> Result<BodyNodeIndex> {
        self.topology.body(body)?.body_node.ok_or_else(|| {
            MultibodyError::DisconnectedBody { body: body.0 }
        })
    }

    // ========== Scalar Conversion ==========

    /// Rebuild this tree over scalar `U`.
    ///
    /// Elements are replayed in creation order, so every index of the clone
    /// equals the index of its source element. Parameters become constants in
    /// `U`. The clone gets a fresh [`TreeId`]; contexts are not shared.
    pub fn clone_to_scalar<U: Real>(&self) -> Result<ScalarConversion<U>> {
        let mut tree = MultibodyTree::<U>::with_config(self.config);
        let mut correspondence = ElementCorrespondence::default();
        correspondence.bodies.push(BodyIndex::WORLD);
        correspondence.frames.push(FrameIndex::WORLD);

        for frame in self.frames.iter().skip(1) {
            match frame.kind() {
                FrameKind::Body => {
                    let source = self.body(frame.body())?;
                    let body = tree.add_body(source.spatial_inertia().cast())?;
                    correspondence.bodies.push(body);
                    correspondence.frames.push(tree.body(body)?.body_frame_index());
                }
                FrameKind::FixedOffset { parent, x_pf } => {
                    let parent = correspondence.frame(*parent)?;
                    correspondence.frames.push(tree.add_frame(parent, x_pf.cast())?);
                }
            }
        }

        for mobilizer in &self.mobilizers {
            let inboard = correspondence.frame(mobilizer.inboard_frame())?;
            let outboard = correspondence.frame(mobilizer.outboard_frame())?;
            let index = match mobilizer {
                Mobilizer::Revolute(m) => {
                    tree.add_revolute_mobilizer(inboard, outboard, m.axis().map(cast::<T, U>))?
                }
                Mobilizer::Prismatic(m) => {
                    tree.add_prismatic_mobilizer(inboard, outboard, m.axis().map(cast::<T, U>))?
                }
            };
            correspondence.mobilizers.push(index);
        }

        if self.topology_is_valid() {
            tree.finalize()?;
        }
        correspondence.body_nodes = (0..self.topology.num_body_nodes())
            .map(BodyNodeIndex)
            .collect();

        debug!(
            source = %self.tree_id(),
            clone = %tree.tree_id(),
            "cloned multibody tree to new scalar type"
        );
        Ok(ScalarConversion {
            tree,
            correspondence,
        })
    }

    /// Rebuild this tree over a dual number with `N` partials.
    pub fn to_autodiff<const N: usize>(&self) -> Result<ScalarConversion<Dual<N>>> {
        self.clone_to_scalar()
    }
}

/// Result of [`MultibodyTree::clone_to_scalar`].
#[derive(Debug, Clone)]
pub struct ScalarConversion<U: Real> {
    /// The rebuilt tree.
    pub tree: MultibodyTree<U>,
    /// Map from source element indices to clone element indices.
    pub correspondence: ElementCorrespondence,
}

/// Index map from a source tree to its scalar-converted clone, per element kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCorrespondence {
    bodies: Vec<BodyIndex>,
    frames: Vec<FrameIndex>,
    mobilizers: Vec<MobilizerIndex>,
    body_nodes: Vec<BodyNodeIndex>,
}

impl ElementCorrespondence {
    /// Clone body for a source body.
    pub fn body(&self, source: BodyIndex) -> Result<BodyIndex> {
        lookup(&self.bodies, source.0, "body")
    }

    /// Clone frame for a source frame.
    pub fn frame(&self, source: FrameIndex) -> Result<FrameIndex> {
        lookup(&self.frames, source.0, "frame")
    }

    /// Clone mobilizer for a source mobilizer.
    pub fn mobilizer(&self, source: MobilizerIndex) -> Result<MobilizerIndex> {
        lookup(&self.mobilizers, source.0, "mobilizer")
    }

    /// Clone body node for a source body node.
    pub fn body_node(&self, source: BodyNodeIndex) -> Result<BodyNodeIndex> {
        lookup(&self.body_nodes, source.0, "body node")
    }

    /// Whether every element maps onto the index it came from.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.bodies.iter().enumerate().all(|(i, b)| b.0 == i)
            && self.frames.iter().enumerate().all(|(i, f)| f.0 == i)
            && self.mobilizers.iter().enumerate().all(|(i, m)| m.0 == i)
            && self.body_nodes.iter().enumerate().all(|(i, n)| n.0 == i)
    }
}

fn lookup<I: Copy>(table: &[I], index: usize, kind: &'static str) -> Result<I> {
    table
        .get(index)
        .copied()
        .ok_or_else(|| MultibodyError::out_of_range(kind, index, table.len()))
}
