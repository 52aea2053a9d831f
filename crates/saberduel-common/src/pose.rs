//! World-space pose and direction math.
//!
//! Combat happens at constant altitude: every steering and facing
//! computation here works on the horizontal (XZ) plane. Degenerate
//! directions (zero-length or non-finite) never propagate — they are
//! replaced with the current forward vector.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Threshold below which a direction is considered degenerate.
pub const DIRECTION_EPSILON: f32 = 1e-4;

/// World-space pose of a combatant: position plus facing yaw.
///
/// Yaw is the rotation about the +Y axis in radians; yaw 0 faces +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world space.
    pub position: Vec3,
    /// Facing angle around +Y, in radians.
    pub yaw: f32,
}

impl Pose {
    /// Creates a pose at the given position facing +Z.
    #[must_use]
    pub const fn new(position: Vec3) -> Self {
        Self { position, yaw: 0.0 }
    }

    /// Sets the facing yaw.
    #[must_use]
    pub const fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Returns the forward unit vector on the horizontal plane.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Returns the rightward unit vector on the horizontal plane.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        let f = self.forward();
        Vec3::new(f.z, 0.0, -f.x)
    }

    /// Horizontal distance to a world position.
    #[must_use]
    pub fn distance_to(&self, target: Vec3) -> f32 {
        let d = target - self.position;
        Vec3::new(d.x, 0.0, d.z).length()
    }

    /// Normalized horizontal direction toward a target position.
    ///
    /// Falls back to the current forward vector when the target is at
    /// (or numerically indistinguishable from) this pose's position.
    #[must_use]
    pub fn direction_to(&self, target: Vec3) -> Vec3 {
        let d = target - self.position;
        safe_direction(Vec3::new(d.x, 0.0, d.z), self.forward())
    }

    /// Re-orients on the horizontal plane to face a world position.
    ///
    /// A target directly above or below leaves the yaw unchanged.
    pub fn face_toward(&mut self, target: Vec3) {
        let d = target - self.position;
        let flat = Vec3::new(d.x, 0.0, d.z);
        if flat.length_squared() > DIRECTION_EPSILON * DIRECTION_EPSILON && flat.is_finite() {
            self.yaw = flat.x.atan2(flat.z);
        }
    }

    /// Moves along a horizontal direction, leaving altitude untouched.
    pub fn translate(&mut self, direction: Vec3, distance: f32) {
        let dir = safe_direction(Vec3::new(direction.x, 0.0, direction.z), self.forward());
        self.position += dir * distance;
    }
}

/// Normalizes a direction, substituting `fallback` for degenerate input.
#[must_use]
pub fn safe_direction(direction: Vec3, fallback: Vec3) -> Vec3 {
    if !direction.is_finite() {
        return fallback;
    }
    let len = direction.length();
    if len < DIRECTION_EPSILON {
        fallback
    } else {
        direction / len
    }
}

/// Linear interpolation between two positions.
#[must_use]
pub fn lerp_position(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Interpolates between two yaw angles along the shortest arc.
#[must_use]
pub fn lerp_yaw(a: f32, b: f32, t: f32) -> f32 {
    let mut delta = (b - a) % std::f32::consts::TAU;
    if delta > std::f32::consts::PI {
        delta -= std::f32::consts::TAU;
    } else if delta < -std::f32::consts::PI {
        delta += std::f32::consts::TAU;
    }
    a + delta * t.clamp(0.0, 1.0)
}
