//! Kinematics caches and the recursive passes that fill them.
//!
//! Each cache holds one entry per [`BodyNodeIndex`](crate::BodyNodeIndex) and
//! is computed by a single root-to-leaf pass over the finalized evaluation
//! order:
//!
//! ```text
//! q        → PositionKinematicsCache      X_WB, X_FM, X_PB, X_WF
//! q, v     → VelocityKinematicsCache      V_WB, V_FM, V_PB
//! q, v, v̇  → AccelerationKinematicsCache  A_WB
//! ```
//!
//! Caches remember the tree that sized them. Passing a cache to another tree
//! fails with a precondition error; passing a velocity cache computed from a
//! different state of the same tree is not detected.

mod acceleration;
mod position;
mod velocity;

pub use acceleration::AccelerationKinematicsCache;
pub use position::PositionKinematicsCache;
pub use velocity::VelocityKinematicsCache;

use crate::error::{MultibodyError, Result};
use crate::tree::TreeId;

/// Identity and size check shared by every cache.
pub(crate) fn ensure_cache(
    cache_tree: TreeId,
    cache_len: usize,
    tree: TreeId,
    num_nodes: usize,
    what: &'static str,
) -> Result<()> {
    if cache_tree != tree || cache_len != num_nodes {
        return Err(MultibodyError::TopologyMismatch { what });
    }
    Ok(())
}
