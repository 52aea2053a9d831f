//! Enemy combatant variant and its per-tick decision loop.
//!
//! Behavior by distance to the player: inside attack range, swing when
//! the attack interval allows, otherwise strafe sideways so the duel
//! never looks static; inside aggro range, pursue in a straight line on
//! the horizontal plane; beyond that, wander around a home point.
//! Blocking is probabilistic-reactive: one roll per incoming player
//! attack, held for a fixed duration on success.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use saberduel_common::Pose;

use crate::combatant::{Combatant, CombatantCore};
use crate::config::{CombatantConfig, SpawnBounds};
use crate::events::EventBus;
use crate::feedback::FeedbackHub;
use crate::saber::SaberColor;

/// Strafe direction flips with this period (seconds).
const STRAFE_PERIOD: f64 = 4.0;

/// Base seconds between wander retargets; jitter is added per roll.
const WANDER_RETARGET_BASE: f32 = 2.0;

/// Random extra seconds added to each wander retarget.
const WANDER_RETARGET_JITTER: f32 = 3.0;

/// Distance at which a wander target counts as reached.
const WANDER_ARRIVE_DISTANCE: f32 = 0.5;

/// Reactive blocks are considered out to this multiple of attack range.
const BLOCK_REACT_RANGE_FACTOR: f32 = 1.5;

/// What the enemy decision loop needs to know about its opponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentView {
    /// Opponent world position.
    pub position: Vec3,
    /// Whether the opponent is mid-attack.
    pub is_attacking: bool,
    /// Whether the opponent is alive.
    pub is_alive: bool,
}

impl OpponentView {
    /// Builds a view of any combatant.
    #[must_use]
    pub fn of(combatant: &impl Combatant) -> Self {
        Self {
            position: combatant.pose().position,
            is_attacking: combatant.is_attacking(),
            is_alive: combatant.is_alive(),
        }
    }
}

/// An autonomous enemy duelist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    core: CombatantCore,
    /// Anchor for wandering; reset on respawn.
    home: Vec3,
    /// Current wander destination.
    wander_target: Vec3,
    /// Counts down to the next wander retarget.
    wander_timer: f32,
    /// Counts down while holding a reactive block.
    block_timer: f32,
    /// One block roll per incoming attack.
    block_rolled: bool,
    /// Xorshift state for decisions; seedable for determinism.
    rng_state: u64,
}

impl Enemy {
    /// Creates an enemy at a position, facing +Z, with a decision seed.
    #[must_use]
    pub fn new(config: CombatantConfig, position: Vec3, color: SaberColor, seed: u64) -> Self {
        Self {
            core: CombatantCore::new(config, Pose::new(position), color),
            home: position,
            wander_target: position,
            wander_timer: 0.0,
            block_timer: 0.0,
            block_rolled: false,
            rng_state: seed.max(1),
        }
    }

    /// The wander anchor.
    #[must_use]
    pub const fn home(&self) -> Vec3 {
        self.home
    }

    /// Runs one tick of the decision loop.
    pub fn update(
        &mut self,
        dt: f32,
        now: f64,
        player: &OpponentView,
        feedback: &mut FeedbackHub,
        _events: &EventBus,
    ) {
        if !self.core.is_alive() {
            return;
        }

        self.core.tick(dt);

        // Reactive block bookkeeping runs before movement so a block
        // raised this tick still slows the same tick's steering.
        self.update_block(dt, player);

        if !player.is_alive {
            // Duel over; drift back to wandering.
            self.core.set_moving(false);
            self.wander(dt);
            return;
        }

        let distance = self.core.pose().distance_to(player.position);
        let config = self.core.config().clone();

        // Face the player whenever inside aggro range, whatever the
        // movement state. Staggering interrupts motion, not orientation.
        if distance <= config.aggro_range {
            self.core.pose_mut().face_toward(player.position);
        }

        if !self.core.state().can_move() && !self.core.state().can_start_attack() {
            // Attacking, staggered, or dead: no steering this tick.
            return;
        }

        if distance <= config.attack_range {
            let interval_ok = now - self.core.last_attack_time() >= config.attack_interval;
            if interval_ok && self.core.try_attack(now, feedback) {
                return;
            }
            // Between swings: circle the player instead of standing.
            if self.core.state().can_move() && !self.core.is_blocking() {
                self.strafe(dt, now, player.position);
            }
        } else if distance <= config.aggro_range {
            if self.core.is_blocking() {
                return; // guard up, hold position
            }
            self.core.set_moving(true);
            let dir = self.core.pose().direction_to(player.position);
            self.core.pose_mut().translate(dir, config.move_speed * dt);
        } else {
            self.core.set_moving(false);
            self.wander(dt);
        }
    }

    /// Respawns inside the given bounds, re-anchoring the wander home.
    pub fn respawn_within(
        &mut self,
        bounds: &SpawnBounds,
        feedback: &mut FeedbackHub,
        events: &EventBus,
    ) {
        if self.core.is_alive() {
            return;
        }

        let position = bounds.point_from_rolls(self.next_random(), self.next_random());
        self.home = position;
        self.wander_target = position;
        self.wander_timer = 0.0;
        self.block_timer = 0.0;
        self.block_rolled = false;
        self.core.respawn(position, feedback, events);
    }

    /// Reactive blocking: roll once per incoming attack, hold, release.
    fn update_block(&mut self, dt: f32, player: &OpponentView) {
        if self.core.is_blocking() {
            self.block_timer -= dt;
            if self.block_timer <= 0.0 {
                self.core.set_blocking(false);
            }
        }

        let config = self.core.config();
        let react_range = config.attack_range * BLOCK_REACT_RANGE_FACTOR;
        let threat = player.is_attacking
            && player.is_alive
            && self.core.pose().distance_to(player.position) <= react_range;

        if threat {
            if !self.block_rolled {
                self.block_rolled = true;
                let chance = config.block_chance;
                let hold = config.block_hold;
                if self.next_random() < chance {
                    self.core.set_blocking(true);
                    if self.core.is_blocking() {
                        self.block_timer = hold;
                    }
                }
            }
        } else {
            self.block_rolled = false;
        }
    }

    /// Sideways movement around a close opponent, sign from a slow
    /// oscillator so the direction flips every few seconds.
    fn strafe(&mut self, dt: f32, now: f64, player_position: Vec3) {
        let to_player = self.core.pose().direction_to(player_position);
        let lateral = Vec3::new(to_player.z, 0.0, -to_player.x);
        let phase = (now / STRAFE_PERIOD * std::f64::consts::TAU).sin();
        let sign = if phase >= 0.0 { 1.0 } else { -1.0 };
        let speed = self.core.config().strafe_speed;
        self.core.pose_mut().translate(lateral * sign, speed * dt);
    }

    /// Wander around the home point at reduced speed.
    fn wander(&mut self, dt: f32) {
        self.wander_timer -= dt;
        if self.wander_timer <= 0.0 {
            self.wander_timer = WANDER_RETARGET_BASE + self.next_random() * WANDER_RETARGET_JITTER;
            let angle = self.next_random() * std::f32::consts::TAU;
            let dist = self.next_random() * self.core.config().wander_radius;
            self.wander_target = self.home + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist);
        }

        if self.core.pose().distance_to(self.wander_target) > WANDER_ARRIVE_DISTANCE {
            let speed = self.core.config().wander_speed;
            let dir = self.core.pose().direction_to(self.wander_target);
            self.core.pose_mut().face_toward(self.wander_target);
            self.core.pose_mut().translate(dir, speed * dt);
        }
    }

    /// Generates a pseudo-random value in `[0, 1)`.
    fn next_random(&mut self) -> f32 {
        // Simple xorshift
        self.rng_state ^= self.rng_state << 13;
        self.rng_state ^= self.rng_state >> 17;
        self.rng_state ^= self.rng_state << 5;
        ((self.rng_state >> 40) & 0xff_ffff) as f32 / 16_777_216.0
    }
}

impl Combatant for Enemy {
    fn core(&self) -> &CombatantCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CombatantCore {
        &mut self.core
    }
}
