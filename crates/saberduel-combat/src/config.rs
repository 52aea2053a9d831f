//! Combatant and arena configuration.
//!
//! The source variants of this game disagreed on cooldowns and
//! mitigation percentages; this module pins one consistent policy set
//! as documented defaults. Everything is an explicit field — no loose
//! option bags.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use saberduel_common::{CoreError, CoreResult};

/// Tuning for a single combatant archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantConfig {
    /// Maximum (and starting) health.
    pub max_health: f32,
    /// Damage dealt by one landed swing.
    pub swing_damage: f32,
    /// Total duration of one attack animation (seconds).
    pub attack_duration: f32,
    /// Cooldown before another attack may start (seconds).
    pub attack_cooldown: f32,
    /// Minimum game-clock gap between AI attacks (seconds).
    pub attack_interval: f64,
    /// Start of the damage window, as a fraction of `attack_duration`.
    pub damage_window_start: f32,
    /// End of the damage window, as a fraction of `attack_duration`.
    pub damage_window_end: f32,
    /// Maximum distance at which a swing connects.
    pub hit_range: f32,
    /// Blocking arc threshold: dot of forward and to-attacker direction
    /// must exceed this for a hit to count as blocked. 0.5 covers
    /// roughly the front 120 degrees.
    pub block_arc_dot: f32,
    /// Fraction of incoming damage removed by an in-arc block.
    pub block_mitigation: f32,
    /// Cooldown after dropping a block (seconds).
    pub block_cooldown: f32,
    /// How long the AI holds a reactive block (seconds).
    pub block_hold: f32,
    /// Chance the AI blocks an incoming attack (rolled once per attack).
    pub block_chance: f32,
    /// Duration of the stagger after an unblocked hit (seconds).
    pub stagger_duration: f32,
    /// Movement speed while pursuing (units/second).
    pub move_speed: f32,
    /// Movement speed while wandering (units/second).
    pub wander_speed: f32,
    /// Lateral speed while strafing around a close opponent.
    pub strafe_speed: f32,
    /// Distance at which an enemy notices and pursues the player.
    pub aggro_range: f32,
    /// Distance at which an enemy starts swinging.
    pub attack_range: f32,
    /// Maximum wander distance from the home point.
    pub wander_radius: f32,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self::enemy()
    }
}

impl CombatantConfig {
    /// Defaults for the player duelist.
    #[must_use]
    pub fn player() -> Self {
        Self {
            max_health: 100.0,
            swing_damage: 25.0,
            attack_duration: 0.8,
            attack_cooldown: 0.6,
            attack_interval: 0.0,
            damage_window_start: 0.3,
            damage_window_end: 0.5,
            hit_range: 2.2,
            block_arc_dot: 0.5,
            block_mitigation: 0.75,
            block_cooldown: 0.2,
            block_hold: 0.0,
            block_chance: 0.0,
            stagger_duration: 0.4,
            move_speed: 4.0,
            wander_speed: 0.0,
            strafe_speed: 0.0,
            aggro_range: 0.0,
            attack_range: 2.0,
            wander_radius: 0.0,
        }
    }

    /// Defaults for an enemy duelist.
    #[must_use]
    pub fn enemy() -> Self {
        Self {
            max_health: 50.0,
            swing_damage: 10.0,
            attack_duration: 0.8,
            attack_cooldown: 0.6,
            attack_interval: 1.2,
            damage_window_start: 0.3,
            damage_window_end: 0.5,
            hit_range: 2.2,
            block_arc_dot: 0.5,
            block_mitigation: 0.75,
            block_cooldown: 0.8,
            block_hold: 0.6,
            block_chance: 0.35,
            stagger_duration: 0.4,
            move_speed: 3.0,
            wander_speed: 1.5,
            strafe_speed: 1.8,
            aggro_range: 10.0,
            attack_range: 2.0,
            wander_radius: 6.0,
        }
    }

    /// Sets the maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Sets the swing damage.
    #[must_use]
    pub fn with_swing_damage(mut self, damage: f32) -> Self {
        self.swing_damage = damage;
        self
    }

    /// Sets the block mitigation fraction.
    #[must_use]
    pub fn with_block_mitigation(mut self, mitigation: f32) -> Self {
        self.block_mitigation = mitigation.clamp(0.0, 1.0);
        self
    }

    /// Sets the AI block chance.
    #[must_use]
    pub fn with_block_chance(mut self, chance: f32) -> Self {
        self.block_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Sets the aggro and attack ranges.
    #[must_use]
    pub fn with_ranges(mut self, aggro: f32, attack: f32) -> Self {
        self.aggro_range = aggro;
        self.attack_range = attack;
        self
    }

    /// Sets the attack interval.
    #[must_use]
    pub fn with_attack_interval(mut self, interval: f64) -> Self {
        self.attack_interval = interval;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_health <= 0.0 || !self.max_health.is_finite() {
            return Err(CoreError::InvalidConfig {
                field: "max_health",
                value: self.max_health,
            });
        }
        if self.attack_duration <= 0.0 {
            return Err(CoreError::InvalidConfig {
                field: "attack_duration",
                value: self.attack_duration,
            });
        }
        if !(0.0..=1.0).contains(&self.damage_window_start)
            || self.damage_window_end < self.damage_window_start
            || self.damage_window_end > 1.0
        {
            return Err(CoreError::InvalidConfig {
                field: "damage_window_end",
                value: self.damage_window_end,
            });
        }
        if !(0.0..=1.0).contains(&self.block_mitigation) {
            return Err(CoreError::InvalidConfig {
                field: "block_mitigation",
                value: self.block_mitigation,
            });
        }
        Ok(())
    }
}

/// Bounded area used for enemy spawn and respawn positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    /// Half-extent of the square spawn area on X and Z.
    pub half_extent: f32,
    /// Altitude of spawned combatants.
    pub altitude: f32,
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self {
            half_extent: 12.0,
            altitude: 0.0,
        }
    }
}

impl SpawnBounds {
    /// Checks whether a position lies inside the bounds.
    #[must_use]
    pub fn contains(&self, position: Vec3) -> bool {
        position.x.abs() <= self.half_extent
            && position.z.abs() <= self.half_extent
            && (position.y - self.altitude).abs() < 1e-3
    }

    /// Maps two unit rolls onto a position inside the bounds.
    #[must_use]
    pub fn point_from_rolls(&self, roll_x: f32, roll_z: f32) -> Vec3 {
        Vec3::new(
            (roll_x.clamp(0.0, 1.0) * 2.0 - 1.0) * self.half_extent,
            self.altitude,
            (roll_z.clamp(0.0, 1.0) * 2.0 - 1.0) * self.half_extent,
        )
    }
}

/// Arena-level tuning for the resolution pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Minimum gap between successful player hits (seconds), so one
    /// swing cannot land on every frame it overlaps a target.
    pub player_hit_cooldown: f64,
    /// Blade-tip distance at which two sabers clash.
    pub clash_distance: f32,
    /// Minimum gap between saber-on-saber clash effects (seconds).
    pub clash_throttle: f64,
    /// Spawn/respawn area for enemies.
    pub spawn_bounds: SpawnBounds,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            player_hit_cooldown: 0.4,
            clash_distance: 0.4,
            clash_throttle: 0.5,
            spawn_bounds: SpawnBounds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_validate() {
        assert!(CombatantConfig::player().validate().is_ok());
        assert!(CombatantConfig::enemy().validate().is_ok());
    }

    #[test]
    fn test_invalid_damage_window_rejected() {
        let mut config = CombatantConfig::enemy();
        config.damage_window_end = 0.2;
        config.damage_window_start = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spawn_bounds_roll_mapping() {
        let bounds = SpawnBounds {
            half_extent: 10.0,
            altitude: 0.0,
        };

        assert!(bounds.contains(bounds.point_from_rolls(0.0, 0.0)));
        assert!(bounds.contains(bounds.point_from_rolls(1.0, 1.0)));
        assert!(bounds.contains(bounds.point_from_rolls(0.5, 0.25)));

        let corner = bounds.point_from_rolls(0.0, 0.0);
        assert!((corner.x + 10.0).abs() < 1e-5);
        assert!((corner.z + 10.0).abs() < 1e-5);
    }
}
