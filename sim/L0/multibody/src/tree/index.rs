//! Typed index handles.
//!
//! Indices are dense, assigned monotonically at creation time, and never
//! reused or reordered. Each kind has its own counter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub usize);

        impl $name {
            /// Create a new index.
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[must_use]
            pub const fn raw(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_index!(
    /// Index of a body. The world body is `BodyIndex(0)`.
    BodyIndex,
    "Body"
);
define_index!(
    /// Index of a frame. The world body frame is `FrameIndex(0)`.
    FrameIndex,
    "Frame"
);
define_index!(
    /// Index of a mobilizer.
    MobilizerIndex,
    "Mobilizer"
);
define_index!(
    /// Index of a body node (a body together with its inboard mobilizer).
    ///
    /// The world node is `BodyNodeIndex(0)`. Kinematics caches and per-body
    /// force arrays are indexed by body node.
    BodyNodeIndex,
    "BodyNode"
);

impl BodyIndex {
    /// The world body.
    pub const WORLD: Self = Self(0);
}

impl FrameIndex {
    /// The world body frame.
    pub const WORLD: Self = Self(0);
}

impl BodyNodeIndex {
    /// The world body node.
    pub const WORLD: Self = Self(0);
}

/// Identity of a tree instance.
///
/// Contexts and caches record the id of the tree that sized them and are
/// rejected by any other tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

impl TreeId {
    /// Allocate a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tree({})", self.0)
    }
}
