//! Rigid bodies.

use nalgebra::Vector3;

use super::index::{BodyIndex, FrameIndex};
use crate::scalar::Real;
use crate::spatial::SpatialInertia;

/// A rigid body with constant mass properties.
///
/// Created only through [`MultibodyTree::add_body`](crate::MultibodyTree::add_body),
/// which also creates the body frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<T: Real> {
    index: BodyIndex,
    body_frame: FrameIndex,
    spatial_inertia: SpatialInertia<T>,
}

impl<T: Real> Body<T> {
    pub(crate) fn new(
        index: BodyIndex,
        body_frame: FrameIndex,
        spatial_inertia: SpatialInertia<T>,
    ) -> Self {
        Self {
            index,
            body_frame,
            spatial_inertia,
        }
    }

    /// This body's index.
    #[must_use]
    pub fn index(&self) -> BodyIndex {
        self.index
    }

    /// Index of the body frame B.
    #[must_use]
    pub fn body_frame_index(&self) -> FrameIndex {
        self.body_frame
    }

    /// Whether this is the world body.
    #[must_use]
    pub fn is_world(&self) -> bool {
        self.index == BodyIndex::WORLD
    }

    /// Spatial inertia `M_Bo_B` about the body origin, expressed in B.
    #[must_use]
    pub fn spatial_inertia(&self) -> &SpatialInertia<T> {
        &self.spatial_inertia
    }

    /// Body mass.
    #[must_use]
    pub fn mass(&self) -> T {
        self.spatial_inertia.mass()
    }

    /// Center of mass `p_BoBcm_B`.
    #[must_use]
    pub fn com(&self) -> &Vector3<T> {
        self.spatial_inertia.com()
    }
}
