//! Recursive inverse dynamics and the terms derived from it by probing.
//!
//! # Sign Convention
//!
//! Inverse dynamics returns the generalized forces `τ` the mobilizers must
//! exert, given applied spatial forces `F_app` and applied generalized forces
//! `τ_app`:
//!
//! ```text
//! τ = M(q) v̇ + C(q, v) v − Jᵀ F_app − τ_app
//! ```
//!
//! Gravity enters as applied body weights `W`, so the gravity term returned by
//! [`calc_gravity_generalized_forces`](crate::MultibodyTree::calc_gravity_generalized_forces)
//! is `G(q) = −Jᵀ W = ∂V/∂q`, and
//!
//! ```text
//! ID(q, v, v̇, W) = M(q) v̇ + C(q, v) v + G(q)
//! ```

mod inverse;
mod probes;

pub use inverse::InverseDynamicsOutput;

/// Largest number of generalized velocities a single mobilizer may declare.
pub const MAX_MOBILIZER_VELOCITIES: usize = 6;
