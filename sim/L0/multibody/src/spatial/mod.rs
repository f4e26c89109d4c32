//! Spatial algebra over a generic scalar.
//!
//! Spatial quantities are stored as typed pairs of 3-vectors, ordered
//! `[rotational; translational]`:
//!
//! - [`SpatialVelocity`]: `[ω; v]`
//! - [`SpatialAcceleration`]: `[α; a]` (classical, not spatial, acceleration)
//! - [`SpatialForce`]: `[τ; f]`
//!
//! The monogram convention is used throughout: `X_AB` is the pose of frame B
//! in frame A, `p_PoQo_W` the position of Qo from Po expressed in W, `V_WB` the
//! spatial velocity of B measured in W.

mod force;
mod inertia;
mod motion;
mod transform;

pub use force::SpatialForce;
pub use inertia::{SpatialInertia, UnitInertia};
pub use motion::{SpatialAcceleration, SpatialVelocity};
pub use transform::{Pose, rotation_about_axis};
