//! Lightsaber weapon model.
//!
//! The saber owns its activation state and transient clash flash. It
//! knows nothing about damage: hit detection and damage application
//! live in the arena's resolution pass. The blade tip is a pure
//! function of the owner's current pose and is recomputed on every
//! call — the owner may have moved since the last frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use saberduel_common::Pose;

use crate::feedback::{FeedbackHub, SoundCue};

/// How long a clash flash lasts before auto-reverting (seconds).
pub const CLASH_FLASH_DURATION: f32 = 0.15;

/// Blade color of a lightsaber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaberColor {
    /// Blue blade
    Blue,
    /// Green blade
    Green,
    /// Red blade
    Red,
    /// Purple blade
    Purple,
}

impl SaberColor {
    /// RGB value for VFX tinting.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Blue => (64, 128, 255),
            Self::Green => (64, 255, 96),
            Self::Red => (255, 48, 48),
            Self::Purple => (178, 64, 255),
        }
    }
}

/// A combatant's lightsaber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lightsaber {
    /// Whether the blade is extended.
    active: bool,
    /// Blade color.
    color: SaberColor,
    /// Remaining clash flash time; zero means no flash.
    clash_flash: f32,
    /// Grip position relative to the owner: right, up, forward.
    grip_offset: Vec3,
    /// Blade length from grip to tip.
    blade_length: f32,
}

impl Lightsaber {
    /// Creates an inactive saber with the given blade color.
    #[must_use]
    pub fn new(color: SaberColor) -> Self {
        Self {
            active: false,
            color,
            clash_flash: 0.0,
            grip_offset: Vec3::new(0.25, 1.0, 0.35),
            blade_length: 1.2,
        }
    }

    /// Sets the grip offset (right, up, forward relative to owner).
    #[must_use]
    pub fn with_grip_offset(mut self, offset: Vec3) -> Self {
        self.grip_offset = offset;
        self
    }

    /// Sets the blade length.
    #[must_use]
    pub fn with_blade_length(mut self, length: f32) -> Self {
        self.blade_length = length.max(0.1);
        self
    }

    /// Whether the blade is extended.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Blade color.
    #[must_use]
    pub const fn color(&self) -> SaberColor {
        self.color
    }

    /// Whether a clash flash is currently showing.
    #[must_use]
    pub fn is_flashing(&self) -> bool {
        self.clash_flash > 0.0
    }

    /// Extends the blade. Idempotent: feedback fires only on an actual
    /// state change.
    pub fn activate(&mut self, feedback: &mut FeedbackHub) {
        if !self.active {
            self.active = true;
            feedback.play(SoundCue::SaberIgnite);
        }
    }

    /// Retracts the blade. Idempotent, as `activate`.
    pub fn deactivate(&mut self, feedback: &mut FeedbackHub) {
        if self.active {
            self.active = false;
            self.clash_flash = 0.0;
            feedback.play(SoundCue::SaberRetract);
        }
    }

    /// Plays the swing cue. Valid only while active; an inactive saber
    /// swing is a silent no-op.
    pub fn swing(&mut self, feedback: &mut FeedbackHub) {
        if self.active {
            feedback.play(SoundCue::SaberSwing);
        }
    }

    /// Starts the transient clash flash.
    pub fn begin_clash(&mut self) {
        if self.active {
            self.clash_flash = CLASH_FLASH_DURATION;
        }
    }

    /// Advances the clash flash countdown.
    pub fn tick(&mut self, dt: f32) {
        self.clash_flash = (self.clash_flash - dt).max(0.0);
    }

    /// World position of the grip for the given owner pose.
    #[must_use]
    pub fn grip_position(&self, owner: &Pose) -> Vec3 {
        owner.position
            + owner.right() * self.grip_offset.x
            + Vec3::Y * self.grip_offset.y
            + owner.forward() * self.grip_offset.z
    }

    /// World position of the blade tip for the given owner pose.
    ///
    /// Always derived from the pose passed in — never cached.
    #[must_use]
    pub fn blade_tip(&self, owner: &Pose) -> Vec3 {
        self.grip_position(owner) + owner.forward() * self.blade_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackRecord, RecordingFeedback};

    #[test]
    fn test_activate_deactivate_round_trip() {
        let recorder = RecordingFeedback::new();
        let mut hub = recorder.clone().into_hub();
        let mut saber = Lightsaber::new(SaberColor::Green);

        saber.activate(&mut hub);
        assert!(saber.is_active());
        saber.deactivate(&mut hub);
        assert!(!saber.is_active());

        // Repeated toggles in the same state emit no extra feedback.
        saber.deactivate(&mut hub);
        saber.deactivate(&mut hub);

        assert_eq!(recorder.cue_count(SoundCue::SaberIgnite), 1);
        assert_eq!(recorder.cue_count(SoundCue::SaberRetract), 1);
    }

    #[test]
    fn test_swing_requires_active_blade() {
        let recorder = RecordingFeedback::new();
        let mut hub = recorder.clone().into_hub();
        let mut saber = Lightsaber::new(SaberColor::Blue);

        saber.swing(&mut hub);
        assert_eq!(recorder.cue_count(SoundCue::SaberSwing), 0);

        saber.activate(&mut hub);
        saber.swing(&mut hub);
        assert_eq!(recorder.cue_count(SoundCue::SaberSwing), 1);
    }

    #[test]
    fn test_blade_tip_follows_owner() {
        let mut hub = FeedbackHub::null();
        let mut saber = Lightsaber::new(SaberColor::Red);
        saber.activate(&mut hub);

        let pose_a = Pose::new(Vec3::ZERO);
        let pose_b = Pose::new(Vec3::new(5.0, 0.0, 0.0));

        let tip_a = saber.blade_tip(&pose_a);
        let tip_b = saber.blade_tip(&pose_b);

        // Same offset from each owner position, nothing cached.
        assert!(((tip_b - tip_a) - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);

        // Facing +Z with default grip, the tip sits in front of the owner.
        assert!(tip_a.z > 1.0);
        assert!((tip_a.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clash_flash_auto_reverts() {
        let mut hub = FeedbackHub::null();
        let mut saber = Lightsaber::new(SaberColor::Purple);
        saber.activate(&mut hub);

        saber.begin_clash();
        assert!(saber.is_flashing());

        saber.tick(CLASH_FLASH_DURATION / 2.0);
        assert!(saber.is_flashing());
        saber.tick(CLASH_FLASH_DURATION);
        assert!(!saber.is_flashing());
    }

    #[test]
    fn test_inactive_saber_does_not_flash() {
        let mut saber = Lightsaber::new(SaberColor::Blue);
        saber.begin_clash();
        assert!(!saber.is_flashing());
    }

    #[test]
    fn test_record_variants_compare() {
        // FeedbackRecord equality is relied on by arena tests.
        assert_eq!(FeedbackRecord::Shake(0.5), FeedbackRecord::Shake(0.5));
    }
}
