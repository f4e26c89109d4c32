//! Multibody tree engine for articulated rigid-body systems.
//!
//! This crate computes kinematics (poses, spatial velocities, spatial
//! accelerations) and dynamics (inverse dynamics, mass matrix, Coriolis and
//! gravity terms) for tree-structured mechanisms. It follows a build-then-freeze
//! design where:
//!
//! - [`MultibodyTree`] is built through structural operations, then finalized
//!   and read-only afterwards
//! - [`MultibodyContext`] holds the generalized positions and velocities
//! - Kinematics caches are transient, computed by single recursive passes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MultibodyTree<T>                       │
//! │  Arena: bodies, frames, mobilizers + finalized topology     │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ create_default_context()
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MultibodyContext<T>                      │
//! │  State: q, v  →  position cache → velocity cache            │
//! │                 → acceleration cache / inverse dynamics     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Scalar Genericity
//!
//! Every element and algorithm is generic over a [`Real`] scalar. The same
//! recursive passes run on `f64` and on the forward-mode [`Dual`] number, so
//! derivatives of any cached quantity come from seeding inputs of a tree
//! cloned with [`MultibodyTree::to_autodiff`].
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::Vector3;
//! use sim_multibody::{MultibodyTree, SpatialInertia, UnitInertia};
//!
//! let mut tree = MultibodyTree::<f64>::new();
//! let inertia = SpatialInertia::new(1.0, Vector3::zeros(), UnitInertia::solid_sphere(0.1));
//! let link = tree.add_body(inertia)?;
//! let link_frame = tree.body(link)?.body_frame_index();
//! let world_frame = tree.world_frame().index();
//! tree.add_revolute_mobilizer(world_frame, link_frame, Vector3::z())?;
//! tree.finalize()?;
//!
//! let mut context = tree.create_default_context()?;
//! context.positions_mut()[0] = 0.3;
//! let tau = tree.calc_bias_term(&context)?;
//! assert_eq!(tau.len(), 1);
//! # Ok::<(), sim_multibody::MultibodyError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/sim-multibody/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,       // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,           // mul_add isn't available on every scalar
    clippy::too_many_arguments,         // Recursive passes take the full state explicitly
    clippy::many_single_char_names,     // Physics notation (q, v, w, p)
    clippy::similar_names,              // x_wb / x_pb / x_fm are distinct quantities
    clippy::doc_markdown,               // Not all technical terms need backticks
)]

pub mod autodiff;
pub mod config;
pub mod context;
pub mod dynamics;
pub mod error;
pub mod kinematics;
pub mod scalar;
pub mod spatial;
pub mod tree;

pub use autodiff::Dual;
pub use config::{Gravity, TreeConfig};
pub use context::MultibodyContext;
pub use dynamics::InverseDynamicsOutput;
pub use error::{MultibodyError, Result};
pub use kinematics::{
    AccelerationKinematicsCache, PositionKinematicsCache, VelocityKinematicsCache,
};
pub use scalar::Real;
pub use spatial::{
    Pose, SpatialAcceleration, SpatialForce, SpatialInertia, SpatialVelocity, UnitInertia,
};
pub use tree::{
    Body, BodyIndex, BodyNodeIndex, ElementCorrespondence, Frame, FrameAnchor, FrameIndex,
    Mobilizer, MobilizerIndex, MultibodyTree, MultibodyTreeTopology, PrismaticMobilizer,
    RevoluteMobilizer, ScalarConversion, TreeId,
};

// Re-export nalgebra for downstream users
pub use nalgebra;
