//! Generalized state of a finalized tree.
//!
//! A [`MultibodyContext`] owns the generalized positions `q` and velocities `v`
//! and nothing else. It is created by
//! [`MultibodyTree::create_default_context`](crate::MultibodyTree::create_default_context),
//! sized from the finalized topology, and remembers the [`TreeId`] of the tree
//! that created it so that no other tree accepts it.

use nalgebra::DVector;

use crate::error::{MultibodyError, Result};
use crate::scalar::Real;
use crate::tree::TreeId;

/// Generalized positions and velocities.
#[derive(Debug, Clone, PartialEq)]
pub struct MultibodyContext<T: Real = f64> {
    tree_id: TreeId,
    positions: DVector<T>,
    velocities: DVector<T>,
}

impl<T: Real> MultibodyContext<T> {
    /// Zero-filled state for a tree with the given coordinate counts.
    pub(crate) fn zeros(tree_id: TreeId, num_positions: usize, num_velocities: usize) -> Self {
        Self {
            tree_id,
            positions: DVector::zeros(num_positions),
            velocities: DVector::zeros(num_velocities),
        }
    }

    /// Identity of the tree this context belongs to.
    #[must_use]
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    pub(crate) fn ensure_tree(&self, tree_id: TreeId, what: &'static str) -> Result<()> {
        if self.tree_id != tree_id {
            return Err(MultibodyError::TopologyMismatch { what });
        }
        Ok(())
    }

    // ========== Full Vectors ==========

    /// Number of generalized positions.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Number of generalized velocities.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.velocities.len()
    }

    /// Generalized positions `q`.
    #[must_use]
    pub fn positions(&self) -> &DVector<T> {
        &self.positions
    }

    /// Mutable generalized positions. The length is fixed.
    #[must_use]
    pub fn positions_mut(&mut self) -> &mut [T] {
        self.positions.as_mut_slice()
    }

    /// Generalized velocities `v`.
    #[must_use]
    pub fn velocities(&self) -> &DVector<T> {
        &self.velocities
    }

    /// Mutable generalized velocities. The length is fixed.
    #[must_use]
    pub fn velocities_mut(&mut self) -> &mut [T] {
        self.velocities.as_mut_slice()
    }

    /// Overwrite all positions.
    pub fn set_positions(&mut self, q: &[T]) -> Result<()> {
        if q.len() != self.positions.len() {
            return Err(MultibodyError::dimension("positions", self.positions.len(), q.len()));
        }
        self.positions.as_mut_slice().copy_from_slice(q);
        Ok(())
    }

    /// Overwrite all velocities.
    pub fn set_velocities(&mut self, v: &[T]) -> Result<()> {
        if v.len() != self.velocities.len() {
            return Err(MultibodyError::dimension("velocities", self.velocities.len(), v.len()));
        }
        self.velocities.as_mut_slice().copy_from_slice(v);
        Ok(())
    }

    // ========== Segments ==========

    /// Fixed-length position segment starting at `start`.
    pub fn position_segment<const N: usize>(&self, start: usize) -> Result<&[T; N]> {
        segment(self.positions.as_slice(), start, "positions")
    }

    /// Mutable fixed-length position segment starting at `start`.
    pub fn position_segment_mut<const N: usize>(&mut self, start: usize) -> Result<&mut [T; N]> {
        segment_mut(self.positions.as_mut_slice(), start, "positions")
    }

    /// Fixed-length velocity segment starting at `start`.
    pub fn velocity_segment<const N: usize>(&self, start: usize) -> Result<&[T; N]> {
        segment(self.velocities.as_slice(), start, "velocities")
    }

    /// Mutable fixed-length velocity segment starting at `start`.
    pub fn velocity_segment_mut<const N: usize>(&mut self, start: usize) -> Result<&mut [T; N]> {
        segment_mut(self.velocities.as_mut_slice(), start, "velocities")
    }

    /// Position slice `start..start + len`.
    pub fn positions_range(&self, start: usize, len: usize) -> Result<&[T]> {
        range(self.positions.as_slice(), start, len, "positions")
    }

    /// Velocity slice `start..start + len`.
    pub fn velocities_range(&self, start: usize, len: usize) -> Result<&[T]> {
        range(self.velocities.as_slice(), start, len, "velocities")
    }

    pub(crate) fn positions_range_mut(&mut self, start: usize, len: usize) -> Result<&mut [T]> {
        range_mut(self.positions.as_mut_slice(), start, len, "positions")
    }

    pub(crate) fn velocities_range_mut(&mut self, start: usize, len: usize) -> Result<&mut [T]> {
        range_mut(self.velocities.as_mut_slice(), start, len, "velocities")
    }
}

fn range<'a, T>(data: &'a [T], start: usize, len: usize, what: &'static str) -> Result<&'a [T]> {
    let total = data.len();
    data.get(start..start + len)
        .ok_or_else(|| MultibodyError::dimension(what, start + len, total))
}

fn range_mut<'a, T>(
    data: &'a mut [T],
    start: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a mut [T]> {
    let total = data.len();
    data.get_mut(start..start + len)
        .ok_or_else(|| MultibodyError::dimension(what, start + len, total))
}

fn segment<'a, T, const N: usize>(data: &'a [T], start: usize, what: &'static str) -> Result<&'a [T; N]> {
    range(data, start, N, what)?
        .try_into()
        .map_err(|_| MultibodyError::dimension(what, N, 0))
}

fn segment_mut<'a, T, const N: usize>(
    data: &'a mut [T],
    start: usize,
    what: &'static str,
) -> Result<&'a mut [T; N]> {
    range_mut(data, start, N, what)?
        .try_into()
        .map_err(|_| MultibodyError::dimension(what, N, 0))
}
