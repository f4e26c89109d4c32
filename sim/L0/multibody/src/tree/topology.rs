//! Tree topology: plain-data connectivity records and the finalize pass.
//!
//! The topology knows nothing about mass properties, poses or joint axes. It
//! tracks which frame belongs to which body, which mobilizer connects which
//! bodies, and, once finalized, the body-node evaluation order and the
//! generalized coordinate offsets of every mobilizer.
//!
//! # Invariants
//!
//! - The world body is `BodyIndex(0)`, its frame `FrameIndex(0)`, its node
//!   `BodyNodeIndex(0)`.
//! - Every non-world body has at most one inboard mobilizer; following
//!   inboard mobilizers from any body never revisits a body.
//! - After [`finalize`](MultibodyTreeTopology::finalize), every node's parent
//!   appears before it in [`evaluation_order`](MultibodyTreeTopology::evaluation_order).

use std::collections::VecDeque;

use super::index::{BodyIndex, BodyNodeIndex, FrameIndex, MobilizerIndex, TreeId};
use crate::error::{MultibodyError, Result};

/// Connectivity of one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyTopology {
    /// This body.
    pub index: BodyIndex,
    /// The body's own frame.
    pub body_frame: FrameIndex,
    /// Mobilizer connecting this body to its parent.
    pub inboard_mobilizer: Option<MobilizerIndex>,
    /// Parent body.
    pub parent_body: Option<BodyIndex>,
    /// Child bodies, in mobilizer creation order.
    pub child_bodies: Vec<BodyIndex>,
    /// Body node, assigned together with the inboard mobilizer.
    pub body_node: Option<BodyNodeIndex>,
    /// Depth in the tree (world is 0). Valid after finalize.
    pub level: usize,
}

/// Connectivity of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTopology {
    /// This frame.
    pub index: FrameIndex,
    /// Body the frame is attached to.
    pub body: BodyIndex,
}

/// Connectivity and coordinate layout of one mobilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobilizerTopology {
    /// Identity of the owning tree.
    pub tree_id: TreeId,
    /// This mobilizer.
    pub index: MobilizerIndex,
    /// Inboard frame F.
    pub inboard_frame: FrameIndex,
    /// Outboard frame M.
    pub outboard_frame: FrameIndex,
    /// Body of F.
    pub inboard_body: BodyIndex,
    /// Body of M.
    pub outboard_body: BodyIndex,
    /// Body node of the outboard body.
    pub body_node: BodyNodeIndex,
    /// Number of generalized positions.
    pub num_positions: usize,
    /// Offset into the generalized position vector. Valid after finalize.
    pub positions_start: usize,
    /// Number of generalized velocities.
    pub num_velocities: usize,
    /// Offset into the generalized velocity vector. Valid after finalize.
    pub velocities_start: usize,
}

impl MobilizerTopology {
    /// Descriptor for a mobilizer not yet registered with its tree.
    pub(crate) fn unregistered(tree_id: TreeId) -> Self {
        Self {
            tree_id,
            index: MobilizerIndex(0),
            inboard_frame: FrameIndex::WORLD,
            outboard_frame: FrameIndex::WORLD,
            inboard_body: BodyIndex::WORLD,
            outboard_body: BodyIndex::WORLD,
            body_node: BodyNodeIndex::WORLD,
            num_positions: 0,
            positions_start: 0,
            num_velocities: 0,
            velocities_start: 0,
        }
    }
}

/// A body paired with its inboard mobilizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyNodeTopology {
    /// This node.
    pub index: BodyNodeIndex,
    /// The node's body.
    pub body: BodyIndex,
    /// Inboard mobilizer (`None` for the world node).
    pub mobilizer: Option<MobilizerIndex>,
    /// Parent node. Valid after finalize.
    pub parent: Option<BodyNodeIndex>,
    /// Child nodes. Valid after finalize.
    pub children: Vec<BodyNodeIndex>,
    /// Depth in the tree. Valid after finalize.
    pub level: usize,
    /// Position offset of the inboard mobilizer.
    pub positions_start: usize,
    /// Number of positions of the inboard mobilizer.
    pub num_positions: usize,
    /// Velocity offset of the inboard mobilizer.
    pub velocities_start: usize,
    /// Number of velocities of the inboard mobilizer.
    pub num_velocities: usize,
}

/// Complete topology of a multibody tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultibodyTreeTopology {
    tree_id: TreeId,
    bodies: Vec<BodyTopology>,
    frames: Vec<FrameTopology>,
    mobilizers: Vec<MobilizerTopology>,
    body_nodes: Vec<BodyNodeTopology>,
    evaluation_order: Vec<BodyNodeIndex>,
    num_positions: usize,
    num_velocities: usize,
    tree_height: usize,
    finalized: bool,
}

impl MultibodyTreeTopology {
    /// Topology holding only the world body, its frame and its node.
    #[must_use]
    pub fn new() -> Self {
        let world = BodyTopology {
            index: BodyIndex::WORLD,
            body_frame: FrameIndex::WORLD,
            inboard_mobilizer: None,
            parent_body: None,
            child_bodies: Vec::new(),
            body_node: Some(BodyNodeIndex::WORLD),
            level: 0,
        };
        let world_node = BodyNodeTopology {
            index: BodyNodeIndex::WORLD,
            body: BodyIndex::WORLD,
            mobilizer: None,
            parent: None,
            children: Vec::new(),
            level: 0,
            positions_start: 0,
            num_positions: 0,
            velocities_start: 0,
            num_velocities: 0,
        };
        Self {
            tree_id: TreeId::next(),
            bodies: vec![world],
            frames: vec![FrameTopology {
                index: FrameIndex::WORLD,
                body: BodyIndex::WORLD,
            }],
            mobilizers: Vec::new(),
            body_nodes: vec![world_node],
            evaluation_order: Vec::new(),
            num_positions: 0,
            num_velocities: 0,
            tree_height: 0,
            finalized: false,
        }
    }

    // ========== Accessors ==========

    /// Identity of the owning tree.
    #[must_use]
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// Whether [`finalize`](Self::finalize) has succeeded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.finalized
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

    /// Number of body nodes. Equals the number of bodies once finalized.
    #[must_use]
    pub fn num_body_nodes(&self) -> usize {
        self.body_nodes.len()
    }

    /// Total generalized positions declared so far.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.num_positions
    }

    /// Total generalized velocities declared so far.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.num_velocities
    }

    /// Number of levels in the tree (world alone has height 1). Valid after finalize.
    #[must_use]
    pub fn tree_height(&self) -> usize {
        self.tree_height
    }

    /// Body nodes, root to leaves. Empty before finalize.
    #[must_use]
    pub fn evaluation_order(&self) -> &[BodyNodeIndex] {
        &self.evaluation_order
    }

    /// Body topology by index.
    pub fn body(&self, index: BodyIndex) -> Result<&BodyTopology> {
        self.bodies
            .get(index.0)
            .ok_or_else(|| MultibodyError::out_of_range("body", index.0, self.bodies.len()))
    }

    /// Frame topology by index.
    pub fn frame(&self, index: FrameIndex) -> Result<&FrameTopology> {
        self.frames
            .get(index.0)
            .ok_or_else(|| MultibodyError::out_of_range("frame", index.0, self.frames.len()))
    }

    /// Mobilizer topology by index.
    pub fn mobilizer(&self, index: MobilizerIndex) -> Result<&MobilizerTopology> {
        self.mobilizers.get(index.0).ok_or_else(|| {
            MultibodyError::out_of_range("mobilizer", index.0, self.mobilizers.len())
        })
    }

    /// Body node topology by index.
    pub fn body_node(&self, index: BodyNodeIndex) -> Result<&BodyNodeTopology> {
        self.body_nodes.get(index.0).ok_or_else(|| {
            MultibodyError::out_of_range("body node", index.0, self.body_nodes.len())
        })
    }

    /// All body nodes, indexed by [`BodyNodeIndex`].
    #[must_use]
    pub fn body_nodes(&self) -> &[BodyNodeTopology] {
        &self.body_nodes
    }

    /// All mobilizers, indexed by [`MobilizerIndex`].
    #[must_use]
    pub fn mobilizers(&self) -> &[MobilizerTopology] {
        &self.mobilizers
    }

    // ========== Structural Edits ==========

    /// Give this topology, and every mobilizer in it, a new identity.
    pub(crate) fn reassign_tree_id(&mut self, tree_id: TreeId) {
        self.tree_id = tree_id;
        for mobilizer in &mut self.mobilizers {
            mobilizer.tree_id = tree_id;
        }
    }

    fn ensure_mutable(&self, operation: &'static str) -> Result<()> {
        if self.finalized {
            return Err(MultibodyError::AlreadyFinalized { operation });
        }
        Ok(())
    }

    /// Register a body and its body frame.
    pub fn add_body(&mut self) -> Result<(BodyIndex, FrameIndex)> {
        self.ensure_mutable("add body")?;
        let body = BodyIndex(self.bodies.len());
        let frame = FrameIndex(self.frames.len());
        self.frames.push(FrameTopology { index: frame, body });
        self.bodies.push(BodyTopology {
            index: body,
            body_frame: frame,
            inboard_mobilizer: None,
            parent_body: None,
            child_bodies: Vec::new(),
            body_node: None,
            level: 0,
        });
        Ok((body, frame))
    }

    /// Register a frame attached to `body`.
    pub fn add_frame(&mut self, body: BodyIndex) -> Result<FrameIndex> {
        self.ensure_mutable("add frame")?;
        self.body(body)?;
        let frame = FrameIndex(self.frames.len());
        self.frames.push(FrameTopology { index: frame, body });
        Ok(frame)
    }

    /// Register a mobilizer from `inboard_frame` to `outboard_frame`.
    ///
    /// All checks run before any mutation, so a rejected mobilizer leaves the
    /// topology unchanged.
    pub fn add_mobilizer(
        &mut self,
        inboard_frame: FrameIndex,
        outboard_frame: FrameIndex,
        num_positions: usize,
        num_velocities: usize,
    ) -> Result<MobilizerTopology> {
        self.ensure_mutable("add mobilizer")?;
        let inboard_body = self.frame(inboard_frame)?.body;
        let outboard_body = self.frame(outboard_frame)?.body;

        if outboard_body == BodyIndex::WORLD {
            return Err(MultibodyError::WorldAsOutboard);
        }
        if inboard_body == outboard_body {
            return Err(MultibodyError::SelfConnection {
                body: outboard_body.0,
            });
        }
        if self.bodies[outboard_body.0].inboard_mobilizer.is_some() {
            return Err(MultibodyError::MultipleInboardMobilizers {
                body: outboard_body.0,
            });
        }
        if self.is_ancestor_or_self(outboard_body, inboard_body) {
            return Err(MultibodyError::CycleDetected {
                inboard: inboard_body.0,
                outboard: outboard_body.0,
            });
        }

        let index = MobilizerIndex(self.mobilizers.len());
        let body_node = BodyNodeIndex(self.body_nodes.len());
        let topology = MobilizerTopology {
            tree_id: self.tree_id,
            index,
            inboard_frame,
            outboard_frame,
            inboard_body,
            outboard_body,
            body_node,
            num_positions,
            positions_start: 0,
            num_velocities,
            velocities_start: 0,
        };

        let outboard = &mut self.bodies[outboard_body.0];
        outboard.inboard_mobilizer = Some(index);
        outboard.parent_body = Some(inboard_body);
        outboard.body_node = Some(body_node);
        self.bodies[inboard_body.0].child_bodies.push(outboard_body);
        self.body_nodes.push(BodyNodeTopology {
            index: body_node,
            body: outboard_body,
            mobilizer: Some(index),
            parent: None,
            children: Vec::new(),
            level: 0,
            positions_start: 0,
            num_positions,
            velocities_start: 0,
            num_velocities,
        });
        self.mobilizers.push(topology);
        self.num_positions += num_positions;
        self.num_velocities += num_velocities;
        Ok(topology)
    }

    /// Whether `ancestor` lies on the inboard path from `body` to world,
    /// `body` itself included.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: BodyIndex, body: BodyIndex) -> bool {
        let mut current = Some(body);
        // Bounded by the body count; the graph is acyclic by construction.
        for _ in 0..=self.bodies.len() {
            match current {
                Some(b) if b == ancestor => return true,
                Some(b) => current = self.bodies.get(b.0).and_then(|t| t.parent_body),
                None => return false,
            }
        }
        false
    }

    // ========== Finalize ==========

    /// Freeze the topology.
    ///
    /// Computes node parents, levels and a breadth-first evaluation order in
    /// which every node's parent strictly precedes it, then assigns each
    /// mobilizer its position and velocity offsets in that order.
    pub fn finalize(&mut self) -> Result<()> {
        self.ensure_mutable("finalize")?;
        if let Some(body) = self
            .bodies
            .iter()
            .skip(1)
            .find(|b| b.inboard_mobilizer.is_none())
        {
            return Err(MultibodyError::DisconnectedBody { body: body.index.0 });
        }

        // Node parents and children from the body graph.
        for node in 1..self.body_nodes.len() {
            let body = self.body_nodes[node].body;
            let parent_body = self.bodies[body.0].parent_body.unwrap_or(BodyIndex::WORLD);
            let parent_node = self.bodies[parent_body.0]
                .body_node
                .unwrap_or(BodyNodeIndex::WORLD);
            self.body_nodes[node].parent = Some(parent_node);
            self.body_nodes[parent_node.0]
                .children
                .push(BodyNodeIndex(node));
        }

        // Breadth-first from world.
        let mut order = Vec::with_capacity(self.body_nodes.len());
        let mut queue = VecDeque::from([BodyNodeIndex::WORLD]);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            let level = self.body_nodes[node.0].level;
            for child in self.body_nodes[node.0].children.clone() {
                self.body_nodes[child.0].level = level + 1;
                queue.push_back(child);
            }
        }

        let mut positions_start = 0;
        let mut velocities_start = 0;
        for node in &order {
            let node = &mut self.body_nodes[node.0];
            let body = &mut self.bodies[node.body.0];
            body.level = node.level;
            self.tree_height = self.tree_height.max(node.level + 1);
            let Some(mobilizer) = node.mobilizer else {
                continue;
            };
            node.positions_start = positions_start;
            node.velocities_start = velocities_start;
            let mobilizer = &mut self.mobilizers[mobilizer.0];
            mobilizer.positions_start = positions_start;
            mobilizer.velocities_start = velocities_start;
            positions_start += mobilizer.num_positions;
            velocities_start += mobilizer.num_velocities;
        }

        self.evaluation_order = order;
        self.finalized = true;
        Ok(())
    }
}

impl Default for MultibodyTreeTopology {
    fn default() -> Self {
        Self::new()
    }
}
