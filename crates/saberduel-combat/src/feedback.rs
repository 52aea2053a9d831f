//! Presentation-layer collaborator contracts and the feedback hub.
//!
//! Audio, particle, and camera-shake services are owned by the
//! presentation layer and injected at arena construction. The combat
//! core only ever talks to them through [`FeedbackHub`], which:
//! - throttles spammy cues with per-cue cooldowns
//! - catches every collaborator error, logs it, and moves on
//!
//! Game-logic correctness never depends on a feedback call succeeding.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::saber::SaberColor;

/// Errors a presentation collaborator may report.
#[derive(Debug, Clone, Error)]
pub enum FeedbackError {
    /// A referenced asset could not be found or loaded
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// The backend rejected or failed the request
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for collaborator calls.
pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// Sound cues the combat core can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Saber blade extending
    SaberIgnite,
    /// Saber blade retracting
    SaberRetract,
    /// Saber swing whoosh
    SaberSwing,
    /// Blade-on-blade contact
    SaberClash,
    /// Blade hit an unguarded body
    BodyHit,
    /// A combatant died
    Death,
    /// A dead combatant came back
    Respawn,
}

impl SoundCue {
    /// Get the asset path for this cue.
    #[must_use]
    pub fn asset_path(self) -> &'static str {
        match self {
            Self::SaberIgnite => "sounds/sfx/saber_ignite.ogg",
            Self::SaberRetract => "sounds/sfx/saber_retract.ogg",
            Self::SaberSwing => "sounds/sfx/saber_swing.ogg",
            Self::SaberClash => "sounds/sfx/saber_clash.ogg",
            Self::BodyHit => "sounds/sfx/saber_hit.ogg",
            Self::Death => "sounds/sfx/death.ogg",
            Self::Respawn => "sounds/sfx/respawn.ogg",
        }
    }

    /// Get default cooldown in seconds (0 = no cooldown).
    ///
    /// Cues that fire from proximity checks can trigger on consecutive
    /// frames; the cooldown keeps them from stacking audibly.
    #[must_use]
    pub fn default_cooldown(self) -> f32 {
        match self {
            Self::SaberClash => 0.15,
            Self::BodyHit => 0.1,
            _ => 0.0,
        }
    }
}

/// Options for a sound playback request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundOptions {
    /// Whether the sound loops until stopped
    pub looped: bool,
    /// Volume multiplier (0.0-1.0)
    pub volume: f32,
}

impl Default for SoundOptions {
    fn default() -> Self {
        Self {
            looped: false,
            volume: 1.0,
        }
    }
}

impl SoundOptions {
    /// Sets the volume multiplier.
    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Marks the sound as looping.
    #[must_use]
    pub const fn looping(mut self) -> Self {
        self.looped = true;
        self
    }
}

/// Handle to a playing sound, for later stop/adjust by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

/// Audio playback collaborator.
pub trait AudioService {
    /// Plays a sound cue. `None` means the backend declined quietly
    /// (e.g. voice limit reached), which is not an error.
    fn play_sound(&mut self, cue: SoundCue, options: SoundOptions)
        -> FeedbackResult<Option<SoundHandle>>;
}

/// Particle/VFX collaborator. Fire-and-forget.
pub trait VfxService {
    /// Spawns a hit spark at a world position.
    fn spawn_hit_effect(&mut self, position: Vec3, color: SaberColor) -> FeedbackResult<()>;

    /// Spawns a clash flash at a world position.
    fn spawn_clash_effect(
        &mut self,
        position: Vec3,
        color: SaberColor,
        intensity: f32,
    ) -> FeedbackResult<()>;
}

/// Camera-shake collaborator. Fire-and-forget.
pub trait CameraShake {
    /// Kicks the camera with the given intensity.
    fn apply_shake(&mut self, intensity: f32) -> FeedbackResult<()>;
}

/// Aggregates the presentation collaborators behind a failure-absorbing,
/// cooldown-throttled facade.
pub struct FeedbackHub {
    audio: Box<dyn AudioService>,
    vfx: Box<dyn VfxService>,
    camera: Box<dyn CameraShake>,
    /// Last play time per cue, for cooldown throttling.
    cue_cooldowns: HashMap<SoundCue, f64>,
    /// Current game time in seconds.
    current_time: f64,
}

impl std::fmt::Debug for FeedbackHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackHub")
            .field("current_time", &self.current_time)
            .finish_non_exhaustive()
    }
}

impl FeedbackHub {
    /// Creates a hub from injected collaborators.
    #[must_use]
    pub fn new(
        audio: Box<dyn AudioService>,
        vfx: Box<dyn VfxService>,
        camera: Box<dyn CameraShake>,
    ) -> Self {
        Self {
            audio,
            vfx,
            camera,
            cue_cooldowns: HashMap::new(),
            current_time: 0.0,
        }
    }

    /// Creates a hub that discards everything (headless runs, tests).
    #[must_use]
    pub fn null() -> Self {
        Self::new(
            Box::new(NullFeedback),
            Box::new(NullFeedback),
            Box::new(NullFeedback),
        )
    }

    /// Advances the hub's notion of game time.
    pub fn set_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Plays a sound cue with default options.
    pub fn play(&mut self, cue: SoundCue) {
        self.play_with(cue, SoundOptions::default());
    }

    /// Plays a sound cue with explicit options.
    pub fn play_with(&mut self, cue: SoundCue, options: SoundOptions) {
        let cooldown = f64::from(cue.default_cooldown());
        if cooldown > 0.0 {
            if let Some(last) = self.cue_cooldowns.get(&cue) {
                if self.current_time - last < cooldown {
                    return;
                }
            }
            self.cue_cooldowns.insert(cue, self.current_time);
        }

        if let Err(err) = self.audio.play_sound(cue, options) {
            warn!(cue = ?cue, error = %err, "audio cue failed, continuing");
        }
    }

    /// Spawns a hit spark.
    pub fn hit_effect(&mut self, position: Vec3, color: SaberColor) {
        if let Err(err) = self.vfx.spawn_hit_effect(position, color) {
            warn!(error = %err, "hit effect failed, continuing");
        }
    }

    /// Spawns a clash flash.
    pub fn clash_effect(&mut self, position: Vec3, color: SaberColor, intensity: f32) {
        if let Err(err) = self.vfx.spawn_clash_effect(position, color, intensity) {
            warn!(error = %err, "clash effect failed, continuing");
        }
    }

    /// Kicks the camera.
    pub fn shake(&mut self, intensity: f32) {
        if let Err(err) = self.camera.apply_shake(intensity) {
            warn!(error = %err, "camera shake failed, continuing");
        }
    }
}

/// No-op collaborator for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl AudioService for NullFeedback {
    fn play_sound(
        &mut self,
        _cue: SoundCue,
        _options: SoundOptions,
    ) -> FeedbackResult<Option<SoundHandle>> {
        Ok(None)
    }
}

impl VfxService for NullFeedback {
    fn spawn_hit_effect(&mut self, _position: Vec3, _color: SaberColor) -> FeedbackResult<()> {
        Ok(())
    }

    fn spawn_clash_effect(
        &mut self,
        _position: Vec3,
        _color: SaberColor,
        _intensity: f32,
    ) -> FeedbackResult<()> {
        Ok(())
    }
}

impl CameraShake for NullFeedback {
    fn apply_shake(&mut self, _intensity: f32) -> FeedbackResult<()> {
        Ok(())
    }
}

/// A feedback call captured by [`RecordingFeedback`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackRecord {
    /// A sound cue fired
    Sound(SoundCue),
    /// A hit spark spawned
    Hit(Vec3),
    /// A clash flash spawned
    Clash(Vec3, f32),
    /// The camera was shaken
    Shake(f32),
}

/// Records every call for assertions in tests and integration harnesses.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    log: std::rc::Rc<std::cell::RefCell<Vec<FeedbackRecord>>>,
    /// When set, every call fails with this error message.
    pub fail_with: Option<String>,
}

impl RecordingFeedback {
    /// Creates a new recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose calls all fail, for failure-path tests.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            log: std::rc::Rc::default(),
            fail_with: Some(message.to_string()),
        }
    }

    /// Returns a snapshot of the recorded calls.
    #[must_use]
    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.log.borrow().clone()
    }

    /// Counts recorded occurrences of a specific cue.
    #[must_use]
    pub fn cue_count(&self, cue: SoundCue) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|r| matches!(r, FeedbackRecord::Sound(c) if *c == cue))
            .count()
    }

    /// Clears the record log.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    fn record(&self, record: FeedbackRecord) -> FeedbackResult<()> {
        if let Some(msg) = &self.fail_with {
            return Err(FeedbackError::Backend(msg.clone()));
        }
        self.log.borrow_mut().push(record);
        Ok(())
    }
}

impl AudioService for RecordingFeedback {
    fn play_sound(
        &mut self,
        cue: SoundCue,
        _options: SoundOptions,
    ) -> FeedbackResult<Option<SoundHandle>> {
        self.record(FeedbackRecord::Sound(cue))?;
        Ok(Some(SoundHandle(self.log.borrow().len() as u64)))
    }
}

impl VfxService for RecordingFeedback {
    fn spawn_hit_effect(&mut self, position: Vec3, _color: SaberColor) -> FeedbackResult<()> {
        self.record(FeedbackRecord::Hit(position))
    }

    fn spawn_clash_effect(
        &mut self,
        position: Vec3,
        _color: SaberColor,
        intensity: f32,
    ) -> FeedbackResult<()> {
        self.record(FeedbackRecord::Clash(position, intensity))
    }
}

impl CameraShake for RecordingFeedback {
    fn apply_shake(&mut self, intensity: f32) -> FeedbackResult<()> {
        self.record(FeedbackRecord::Shake(intensity))
    }
}

impl RecordingFeedback {
    /// Builds a hub whose three collaborators all share this recorder.
    #[must_use]
    pub fn into_hub(self) -> FeedbackHub {
        FeedbackHub::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self),
        )
    }
}
