//! # Saberduel Common
//!
//! Common types, utilities, and shared abstractions for Saberduel.
//!
//! This crate provides foundational types used across all Saberduel
//! subsystems:
//! - World-space pose (position + yaw) with safe direction math
//! - ID types (EntityId)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod pose;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::pose::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_pose_face_toward_ignores_height() {
        let mut pose = Pose::new(Vec3::ZERO);
        pose.face_toward(Vec3::new(0.0, 5.0, 3.0));

        let fwd = pose.forward();
        assert!(fwd.y.abs() < 1e-6);
        assert!((fwd - Vec3::Z).length() < 1e-5);
    }
}
