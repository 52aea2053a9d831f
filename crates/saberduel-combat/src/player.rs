//! Player combatant variant.
//!
//! The player's intents arrive as an already-sampled [`PlayerInput`]
//! each tick; device handling lives outside the core. Movement is
//! straight steering on the horizontal plane.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use saberduel_common::{safe_direction, Pose};

use crate::combatant::{Combatant, CombatantCore, CombatState};
use crate::config::CombatantConfig;
use crate::events::EventBus;
use crate::feedback::FeedbackHub;
use crate::saber::SaberColor;

/// Speed multiplier while moving with the guard up.
const BLOCKING_MOVE_FACTOR: f32 = 0.5;

/// One tick's worth of player intent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Desired movement direction in world space (horizontal). Not
    /// required to be normalized; zero means no movement intent.
    pub movement: Vec3,
    /// Absolute facing yaw for this tick, if the look device moved.
    pub look_yaw: Option<f32>,
    /// Attack trigger pressed this tick.
    pub attack: bool,
    /// Block trigger currently held.
    pub block: bool,
}

impl PlayerInput {
    /// Input with an attack press and nothing else.
    #[must_use]
    pub fn attack() -> Self {
        Self {
            attack: true,
            ..Self::default()
        }
    }

    /// Input holding the block trigger and nothing else.
    #[must_use]
    pub fn block() -> Self {
        Self {
            block: true,
            ..Self::default()
        }
    }

    /// Input moving along a direction and nothing else.
    #[must_use]
    pub fn moving(direction: Vec3) -> Self {
        Self {
            movement: direction,
            ..Self::default()
        }
    }
}

/// The player-controlled combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    core: CombatantCore,
}

impl Player {
    /// Creates the player at a position, facing +Z.
    #[must_use]
    pub fn new(config: CombatantConfig, position: Vec3, color: SaberColor) -> Self {
        Self {
            core: CombatantCore::new(config, Pose::new(position), color),
        }
    }

    /// Advances the player by one tick of input.
    pub fn update(
        &mut self,
        input: &PlayerInput,
        dt: f32,
        now: f64,
        feedback: &mut FeedbackHub,
        _events: &EventBus,
    ) {
        if !self.core.is_alive() {
            return;
        }

        self.core.tick(dt);

        if let Some(yaw) = input.look_yaw {
            if yaw.is_finite() {
                self.core.pose_mut().yaw = yaw;
            }
        }

        // Block trigger is level-sensitive: held raises, released drops.
        self.core.set_blocking(input.block);

        if input.attack {
            self.core.try_attack(now, feedback);
        }

        let wants_move = input.movement.length_squared() > 1e-6;
        // Blocking is not left by movement; Idle/Pursuing track intent.
        if self.core.state() != CombatState::Blocking {
            self.core.set_moving(wants_move);
        }

        if wants_move && self.core.state().can_move() {
            let dir = safe_direction(
                Vec3::new(input.movement.x, 0.0, input.movement.z),
                self.core.pose().forward(),
            );
            let speed = if self.core.is_blocking() {
                self.core.config().move_speed * BLOCKING_MOVE_FACTOR
            } else {
                self.core.config().move_speed
            };
            self.core.pose_mut().translate(dir, speed * dt);
        }
    }

    /// Moves the player without physics (spawn seeding, teleports).
    pub fn teleport(&mut self, position: Vec3) {
        self.core.pose_mut().position = position;
    }
}

impl Combatant for Player {
    fn core(&self) -> &CombatantCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CombatantCore {
        &mut self.core
    }
}
