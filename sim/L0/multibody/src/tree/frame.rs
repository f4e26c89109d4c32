//! Frames attached to bodies.

use super::index::{BodyIndex, FrameIndex};
use crate::scalar::Real;
use crate::spatial::Pose;

/// Where a new frame is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAnchor {
    /// A body's own frame.
    Body(BodyIndex),
    /// Any existing frame.
    Frame(FrameIndex),
}

impl From<BodyIndex> for FrameAnchor {
    fn from(body: BodyIndex) -> Self {
        Self::Body(body)
    }
}

impl From<FrameIndex> for FrameAnchor {
    fn from(frame: FrameIndex) -> Self {
        Self::Frame(frame)
    }
}

/// Frame variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameKind<T: Real> {
    /// The implicit frame of a body (identity pose).
    Body,
    /// Constant offset `X_PF` from a parent frame P.
    FixedOffset {
        /// The parent frame.
        parent: FrameIndex,
        /// Pose of this frame in the parent frame.
        x_pf: Pose<T>,
    },
}

/// A frame rigidly attached to a body. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T: Real> {
    index: FrameIndex,
    body: BodyIndex,
    kind: FrameKind<T>,
    x_bf: Pose<T>,
}

impl<T: Real> Frame<T> {
    pub(crate) fn body_frame(index: FrameIndex, body: BodyIndex) -> Self {
        Self {
            index,
            body,
            kind: FrameKind::Body,
            x_bf: Pose::identity(),
        }
    }

    pub(crate) fn fixed_offset(
        index: FrameIndex,
        body: BodyIndex,
        parent: FrameIndex,
        x_pf: Pose<T>,
        x_bp: &Pose<T>,
    ) -> Self {
        Self {
            index,
            body,
            kind: FrameKind::FixedOffset { parent, x_pf },
            x_bf: x_bp.compose(&x_pf),
        }
    }

    /// This frame's index.
    #[must_use]
    pub fn index(&self) -> FrameIndex {
        self.index
    }

    /// Body the frame is attached to.
    #[must_use]
    pub fn body(&self) -> BodyIndex {
        self.body
    }

    /// Frame variant.
    #[must_use]
    pub fn kind(&self) -> &FrameKind<T> {
        &self.kind
    }

    /// Pose `X_BF` of this frame in its body frame.
    #[must_use]
    pub fn pose_in_body(&self) -> &Pose<T> {
        &self.x_bf
    }
}
