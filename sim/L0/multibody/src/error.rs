//! Error types for multibody tree operations.
//!
//! Every failure is a usage error surfaced at the call boundary. Errors fall
//! into three classes:
//!
//! - **Structural**: invalid graph edits (after finalize, cycles, second parents)
//! - **Precondition**: operating on a tree or cache in the wrong state
//! - **Dimension**: index or vector-length mismatches

use thiserror::Error;

/// Errors that can occur while building or evaluating a multibody tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MultibodyError {
    /// Structural edit attempted on a finalized tree.
    #[error("cannot {operation}: the tree is already finalized")]
    AlreadyFinalized {
        /// The rejected operation.
        operation: &'static str,
    },

    /// Connecting the two bodies would close a loop.
    #[error("mobilizer from {inboard} to {outboard} would create a cycle")]
    CycleDetected {
        /// Inboard body of the rejected mobilizer.
        inboard: usize,
        /// Outboard body of the rejected mobilizer.
        outboard: usize,
    },

    /// The outboard body already has a path to world.
    #[error("body {body} already has an inboard mobilizer")]
    MultipleInboardMobilizers {
        /// The body that would get a second parent.
        body: usize,
    },

    /// Inboard and outboard frames belong to the same body.
    #[error("mobilizer connects body {body} to itself")]
    SelfConnection {
        /// The body on both sides.
        body: usize,
    },

    /// The world body cannot be the outboard body of a mobilizer.
    #[error("the world body cannot be the outboard body of a mobilizer")]
    WorldAsOutboard,

    /// A body has no inboard mobilizer at finalize time.
    #[error("body {body} is not connected to the world")]
    DisconnectedBody {
        /// The disconnected body.
        body: usize,
    },

    /// Operation requires a finalized tree.
    #[error("cannot {operation}: the tree is not finalized")]
    NotFinalized {
        /// The rejected operation.
        operation: &'static str,
    },

    /// A context or cache was built against a different tree.
    #[error("{what} does not belong to this tree")]
    TopologyMismatch {
        /// The object that failed the identity check.
        what: &'static str,
    },

    /// Element index past the end of its arena.
    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Element kind ("body", "frame", ...).
        kind: &'static str,
        /// The offending index.
        index: usize,
        /// Number of elements of that kind.
        len: usize,
    },

    /// Input or output array has the wrong length.
    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        /// The array that failed the check.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// Typed mobilizer accessor used on a different variant.
    #[error("mobilizer {index} is not a {expected} mobilizer")]
    MobilizerKindMismatch {
        /// The mobilizer index.
        index: usize,
        /// The requested variant.
        expected: &'static str,
    },

    /// Invalid element parameter (degenerate axis, negative mass).
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of what's wrong.
        reason: String,
    },
}

impl MultibodyError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Create an index out of range error.
    #[must_use]
    pub fn out_of_range(kind: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { kind, index, len }
    }

    /// Check if this is a structural error (invalid graph edit).
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AlreadyFinalized { .. }
                | Self::CycleDetected { .. }
                | Self::MultipleInboardMobilizers { .. }
                | Self::SelfConnection { .. }
                | Self::WorldAsOutboard
                | Self::DisconnectedBody { .. }
        )
    }

    /// Check if this is a precondition error (wrong tree state or identity).
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotFinalized { .. } | Self::TopologyMismatch { .. }
        )
    }

    /// Check if this is a bounds or dimension error.
    #[must_use]
    pub fn is_dimension(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::DimensionMismatch { .. }
                | Self::MobilizerKindMismatch { .. }
        )
    }
}

/// Result type for multibody operations.
pub type Result<T> = std::result::Result<T, MultibodyError>;
