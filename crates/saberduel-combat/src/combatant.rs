//! Combatant state machine shared by the player and enemy variants.
//!
//! Player and enemy differ entirely in where their intents come from
//! (input device vs. decision loop), so they are independent types
//! satisfying the [`Combatant`] contract rather than a class hierarchy.
//! Both embed a [`CombatantCore`] that owns the lifecycle mechanics:
//! health, the single-active state, attack/block/stagger timers, and
//! the one mutating entry point [`CombatantCore::take_damage`].
//!
//! All timers are simulation-time countdowns advanced by dt — deferred
//! transitions (attack completion, stagger recovery) are checked against
//! the current state when they fire, so a stagger or death entered
//! mid-window is never clobbered.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use saberduel_common::{EntityId, Pose};

use crate::config::CombatantConfig;
use crate::events::{EventBus, GameEvent};
use crate::feedback::{FeedbackHub, SoundCue};
use crate::saber::{Lightsaber, SaberColor};

/// Lifecycle state of a combatant. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    /// Standing by, no intent.
    Idle,
    /// Closing distance on an opponent (or moving, for the player).
    Pursuing,
    /// Mid-swing; `attack_timer` tracks progress.
    Attacking,
    /// Guard up; in-arc hits are mitigated.
    Blocking,
    /// Reeling from an unblocked hit; cannot act.
    Staggered,
    /// Health reached zero. Terminal until an explicit respawn.
    Dead,
}

impl CombatState {
    /// Whether a new attack may start from this state.
    #[must_use]
    pub fn can_start_attack(self) -> bool {
        matches!(self, Self::Idle | Self::Pursuing)
    }

    /// Whether the combatant can move under its own power.
    #[must_use]
    pub fn can_move(self) -> bool {
        matches!(self, Self::Idle | Self::Pursuing | Self::Blocking)
    }
}

/// Outcome of a `take_damage` call, for scoring and telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Damage actually subtracted from health.
    pub applied: f32,
    /// Whether an in-arc block mitigated the hit.
    pub blocked: bool,
    /// Whether this hit was lethal.
    pub lethal: bool,
}

/// Shared combat state machine embedded in both combatant variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantCore {
    id: EntityId,
    config: CombatantConfig,
    health: f32,
    state: CombatState,
    /// Counts up from zero while `Attacking`.
    attack_timer: f32,
    /// Counts down; gates attack re-entry.
    attack_cooldown: f32,
    /// Counts down; gates block re-entry.
    block_cooldown: f32,
    /// Counts down while `Staggered`.
    stagger_timer: f32,
    /// Game-clock time of the last attack start.
    last_attack_time: f64,
    /// At most one damage application per attack cycle.
    damage_applied_this_attack: bool,
    pose: Pose,
    saber: Lightsaber,
}

impl CombatantCore {
    /// Creates a combatant at full health in `Idle`, saber lit.
    #[must_use]
    pub fn new(config: CombatantConfig, pose: Pose, color: SaberColor) -> Self {
        let mut saber = Lightsaber::new(color);
        // Construction happens before the presentation layer attaches;
        // the ignite cue for initial spawn comes from the arena.
        let mut silent = FeedbackHub::null();
        saber.activate(&mut silent);

        Self {
            id: EntityId::new(),
            health: config.max_health,
            state: CombatState::Idle,
            attack_timer: 0.0,
            attack_cooldown: 0.0,
            block_cooldown: 0.0,
            stagger_timer: 0.0,
            last_attack_time: f64::MIN,
            damage_applied_this_attack: false,
            pose,
            saber,
            config,
        }
    }

    /// Entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype configuration.
    #[must_use]
    pub const fn config(&self) -> &CombatantConfig {
        &self.config
    }

    /// Current health, always in `[0, max_health]`.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> CombatState {
        self.state
    }

    /// World pose.
    #[must_use]
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Mutable world pose. Position is owned exclusively by the
    /// combatant's own steering; only spawn seeding should reach here.
    pub fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }

    /// The owned saber.
    #[must_use]
    pub const fn saber(&self) -> &Lightsaber {
        &self.saber
    }

    /// Mutable access to the owned saber.
    pub fn saber_mut(&mut self) -> &mut Lightsaber {
        &mut self.saber
    }

    /// Whether the combatant is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != CombatState::Dead
    }

    /// Whether the combatant is mid-attack.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.state == CombatState::Attacking
    }

    /// Whether the combatant has its guard up.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.state == CombatState::Blocking
    }

    /// Progress through the current attack, seconds since swing start.
    #[must_use]
    pub const fn attack_timer(&self) -> f32 {
        self.attack_timer
    }

    /// Game-clock time of the last attack start.
    #[must_use]
    pub const fn last_attack_time(&self) -> f64 {
        self.last_attack_time
    }

    /// Whether damage was already applied during this attack cycle.
    #[must_use]
    pub const fn damage_applied_this_attack(&self) -> bool {
        self.damage_applied_this_attack
    }

    /// Marks the current attack as having applied its damage.
    pub fn mark_damage_applied(&mut self) {
        self.damage_applied_this_attack = true;
    }

    /// Whether the attack timer is inside the configured damage window.
    #[must_use]
    pub fn in_damage_window(&self) -> bool {
        if self.state != CombatState::Attacking {
            return false;
        }
        let start = self.config.damage_window_start * self.config.attack_duration;
        let end = self.config.damage_window_end * self.config.attack_duration;
        self.attack_timer >= start && self.attack_timer <= end
    }

    /// Advances all simulation timers by one tick.
    pub fn tick(&mut self, dt: f32) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.block_cooldown = (self.block_cooldown - dt).max(0.0);
        self.saber.tick(dt);

        match self.state {
            CombatState::Attacking => {
                self.attack_timer += dt;
                if self.attack_timer >= self.config.attack_duration {
                    // Attack ran its course, hit or not.
                    self.leave_attacking(CombatState::Idle);
                }
            },
            CombatState::Staggered => {
                self.stagger_timer -= dt;
                if self.stagger_timer <= 0.0 {
                    self.state = CombatState::Idle;
                }
            },
            _ => {},
        }
    }

    /// Attempts to start an attack. Returns whether the swing started.
    pub fn try_attack(&mut self, now: f64, feedback: &mut FeedbackHub) -> bool {
        if !self.state.can_start_attack() || self.attack_cooldown > 0.0 {
            return false;
        }

        self.state = CombatState::Attacking;
        self.attack_timer = 0.0;
        self.damage_applied_this_attack = false;
        self.last_attack_time = now;
        self.attack_cooldown = self.config.attack_cooldown;
        self.saber.swing(feedback);
        true
    }

    /// Raises or lowers the guard from a held trigger.
    pub fn set_blocking(&mut self, held: bool) {
        if held {
            if self.state.can_start_attack() && self.block_cooldown <= 0.0 {
                self.state = CombatState::Blocking;
            }
        } else if self.state == CombatState::Blocking {
            self.state = CombatState::Idle;
            self.block_cooldown = self.config.block_cooldown;
        }
    }

    /// Marks movement intent, for the `Idle`/`Pursuing` transition.
    pub fn set_moving(&mut self, moving: bool) {
        if moving && self.state == CombatState::Idle {
            self.state = CombatState::Pursuing;
        } else if !moving && self.state == CombatState::Pursuing {
            self.state = CombatState::Idle;
        }
    }

    /// Applies damage from a hit originating at `source_position`.
    ///
    /// No-op on a dead combatant: the resolution pass and state
    /// transitions can legitimately race within one frame, so this is
    /// not an error. Repeated calls within one attack are deduplicated
    /// by the caller's `damage_applied_this_attack` gate, not here.
    ///
    /// Returns the outcome, including the damage actually applied.
    pub fn take_damage(
        &mut self,
        amount: f32,
        source_position: Vec3,
        feedback: &mut FeedbackHub,
        events: &EventBus,
    ) -> DamageOutcome {
        if self.state == CombatState::Dead {
            return DamageOutcome {
                applied: 0.0,
                blocked: false,
                lethal: false,
            };
        }

        // Blocking only counts when the hit arrives from the front arc.
        let blocked = self.state == CombatState::Blocking && {
            let to_source = self.pose.direction_to(source_position);
            self.pose.forward().dot(to_source) > self.config.block_arc_dot
        };

        let applied = if blocked {
            amount * (1.0 - self.config.block_mitigation)
        } else {
            amount
        };

        self.health = (self.health - applied).max(0.0);
        events.publish(GameEvent::HealthChanged {
            entity_id: self.id,
            health: self.health,
            max_health: self.config.max_health,
        });

        if blocked {
            self.saber.begin_clash();
            feedback.play(SoundCue::SaberClash);
            let flash_at = self.saber.blade_tip(&self.pose);
            feedback.clash_effect(flash_at, self.saber.color(), 0.6);
        } else {
            feedback.play(SoundCue::BodyHit);
            feedback.hit_effect(self.pose.position + Vec3::Y, self.saber.color());
        }

        let lethal = self.health <= 0.0;
        if lethal {
            self.die(feedback, events);
        } else if !blocked {
            // Stagger interrupts whatever was in progress.
            if self.state == CombatState::Attacking {
                self.leave_attacking(CombatState::Staggered);
            } else {
                self.state = CombatState::Staggered;
            }
            self.stagger_timer = self.config.stagger_duration;
        }

        DamageOutcome {
            applied,
            blocked,
            lethal,
        }
    }

    /// Restores a dead combatant: full health, `Idle`, new position.
    ///
    /// No-op on a living combatant.
    pub fn respawn(
        &mut self,
        position: Vec3,
        feedback: &mut FeedbackHub,
        events: &EventBus,
    ) {
        if self.state != CombatState::Dead {
            return;
        }

        self.health = self.config.max_health;
        self.state = CombatState::Idle;
        self.attack_timer = 0.0;
        self.attack_cooldown = 0.0;
        self.block_cooldown = 0.0;
        self.stagger_timer = 0.0;
        self.damage_applied_this_attack = false;
        self.pose.position = position;
        self.saber.activate(feedback);
        feedback.play(SoundCue::Respawn);
        events.publish(GameEvent::Respawned { entity_id: self.id });
        debug!(entity = self.id.raw(), "combatant respawned");
    }

    /// Leaves `Attacking` for `next`, resetting the per-attack gate.
    fn leave_attacking(&mut self, next: CombatState) {
        self.state = next;
        self.damage_applied_this_attack = false;
    }

    /// Death transition. Runs exactly once per life: the `Dead` early
    /// return in `take_damage` keeps it from re-firing.
    fn die(&mut self, feedback: &mut FeedbackHub, events: &EventBus) {
        if self.state == CombatState::Attacking {
            self.damage_applied_this_attack = false;
        }
        self.state = CombatState::Dead;
        self.saber.deactivate(feedback);
        feedback.play(SoundCue::Death);
        events.publish(GameEvent::EntityDied { entity_id: self.id });
        debug!(entity = self.id.raw(), "combatant died");
    }
}

/// Capability contract shared by the player and enemy variants.
pub trait Combatant {
    /// The embedded state machine.
    fn core(&self) -> &CombatantCore;
    /// Mutable access to the embedded state machine.
    fn core_mut(&mut self) -> &mut CombatantCore;

    /// Entity ID.
    fn id(&self) -> EntityId {
        self.core().id()
    }

    /// World pose.
    fn pose(&self) -> &Pose {
        self.core().pose()
    }

    /// Current lifecycle state.
    fn state(&self) -> CombatState {
        self.core().state()
    }

    /// Whether the combatant is alive.
    fn is_alive(&self) -> bool {
        self.core().is_alive()
    }

    /// Whether the combatant is mid-attack.
    fn is_attacking(&self) -> bool {
        self.core().is_attacking()
    }

    /// Whether the combatant has its guard up.
    fn is_blocking(&self) -> bool {
        self.core().is_blocking()
    }

    /// Applies damage; see [`CombatantCore::take_damage`].
    fn take_damage(
        &mut self,
        amount: f32,
        source_position: Vec3,
        feedback: &mut FeedbackHub,
        events: &EventBus,
    ) -> DamageOutcome {
        self.core_mut()
            .take_damage(amount, source_position, feedback, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::RecordingFeedback;
    use proptest::prelude::*;

    fn test_core() -> CombatantCore {
        CombatantCore::new(
            CombatantConfig::player(),
            Pose::new(Vec3::ZERO),
            SaberColor::Blue,
        )
    }

    #[test]
    fn test_new_combatant_is_idle_at_full_health() {
        let core = test_core();
        assert_eq!(core.state(), CombatState::Idle);
        assert!((core.health() - 100.0).abs() < f32::EPSILON);
        assert!(core.saber().is_active());
    }

    #[test]
    fn test_attack_lifecycle() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();

        assert!(core.try_attack(1.0, &mut hub));
        assert_eq!(core.state(), CombatState::Attacking);
        assert!((core.last_attack_time() - 1.0).abs() < f64::EPSILON);

        // A second trigger mid-swing is refused.
        assert!(!core.try_attack(1.1, &mut hub));

        // Riding the timer past the duration returns to Idle.
        let duration = core.config().attack_duration;
        core.tick(duration + 0.01);
        assert_eq!(core.state(), CombatState::Idle);
        assert!(!core.damage_applied_this_attack());
    }

    #[test]
    fn test_attack_gated_by_cooldown() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();

        assert!(core.try_attack(0.0, &mut hub));
        core.tick(core.config().attack_duration + 0.01);

        // Attack finished but cooldown may still be running.
        let leftover = core.config().attack_cooldown - core.config().attack_duration - 0.01;
        if leftover > 0.0 {
            assert!(!core.try_attack(1.0, &mut hub));
            core.tick(leftover + 0.01);
        }
        assert!(core.try_attack(2.0, &mut hub));
    }

    #[test]
    fn test_damage_window_tracks_attack_timer() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();

        assert!(!core.in_damage_window());
        core.try_attack(0.0, &mut hub);
        assert!(!core.in_damage_window()); // 0% < 30%

        core.tick(core.config().attack_duration * 0.35);
        assert!(core.in_damage_window());

        core.tick(core.config().attack_duration * 0.3);
        assert!(!core.in_damage_window()); // past 50%
    }

    #[test]
    fn test_front_block_mitigates() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();

        core.set_blocking(true);
        assert!(core.is_blocking());

        // Attacker straight ahead (facing +Z, source at +Z).
        let outcome = core.take_damage(20.0, Vec3::new(0.0, 0.0, 3.0), &mut hub, &events);
        assert!(outcome.blocked);
        assert!((outcome.applied - 5.0).abs() < 1e-4); // 75% mitigated
        assert!((core.health() - 95.0).abs() < 1e-4);
        assert_eq!(core.state(), CombatState::Blocking); // no stagger
    }

    #[test]
    fn test_block_from_behind_is_full_damage() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();

        core.set_blocking(true);
        let outcome = core.take_damage(20.0, Vec3::new(0.0, 0.0, -3.0), &mut hub, &events);
        assert!(!outcome.blocked);
        assert!((outcome.applied - 20.0).abs() < 1e-4);
        assert_eq!(core.state(), CombatState::Staggered);
    }

    #[test]
    fn test_stagger_recovers_to_idle() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();

        core.take_damage(10.0, Vec3::Z, &mut hub, &events);
        assert_eq!(core.state(), CombatState::Staggered);

        core.tick(core.config().stagger_duration + 0.01);
        assert_eq!(core.state(), CombatState::Idle);
    }

    #[test]
    fn test_lethal_hit_fires_death_once() {
        let recorder = RecordingFeedback::new();
        let mut hub = recorder.clone().into_hub();
        let events = EventBus::default();

        let config = CombatantConfig::enemy().with_max_health(15.0);
        let mut core = CombatantCore::new(config, Pose::new(Vec3::ZERO), SaberColor::Red);

        let outcome = core.take_damage(20.0, Vec3::Z, &mut hub, &events);
        assert!(outcome.lethal);
        assert!((core.health() - 0.0).abs() < f32::EPSILON); // clamped
        assert_eq!(core.state(), CombatState::Dead);
        assert!(!core.saber().is_active());

        // A second hit on the corpse is a silent no-op.
        let again = core.take_damage(20.0, Vec3::Z, &mut hub, &events);
        assert!((again.applied - 0.0).abs() < f32::EPSILON);

        assert_eq!(recorder.cue_count(SoundCue::Death), 1);
        let deaths = events
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::EntityDied { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_stagger_interrupts_attack_and_resets_gate() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();

        core.try_attack(0.0, &mut hub);
        core.mark_damage_applied();
        assert!(core.damage_applied_this_attack());

        core.take_damage(10.0, Vec3::Z, &mut hub, &events);
        assert_eq!(core.state(), CombatState::Staggered);
        assert!(!core.damage_applied_this_attack());
    }

    #[test]
    fn test_block_refused_during_stagger() {
        let mut core = test_core();
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();

        core.take_damage(10.0, Vec3::Z, &mut hub, &events);
        core.set_blocking(true);
        assert_eq!(core.state(), CombatState::Staggered);
    }

    #[test]
    fn test_respawn_restores_everything() {
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();
        let mut core = CombatantCore::new(
            CombatantConfig::enemy().with_max_health(10.0),
            Pose::new(Vec3::ZERO),
            SaberColor::Red,
        );

        core.take_damage(50.0, Vec3::Z, &mut hub, &events);
        assert_eq!(core.state(), CombatState::Dead);

        // Respawn on a living combatant must be refused.
        let mut living = test_core();
        living.respawn(Vec3::new(1.0, 0.0, 1.0), &mut hub, &events);
        assert_eq!(living.pose().position, Vec3::ZERO);

        core.respawn(Vec3::new(3.0, 0.0, -2.0), &mut hub, &events);
        assert_eq!(core.state(), CombatState::Idle);
        assert!((core.health() - 10.0).abs() < f32::EPSILON);
        assert_eq!(core.pose().position, Vec3::new(3.0, 0.0, -2.0));
        assert!(core.saber().is_active());
    }

    proptest! {
        #[test]
        fn prop_health_stays_clamped(hits in proptest::collection::vec(0.0f32..200.0, 0..16)) {
            let mut core = test_core();
            let mut hub = FeedbackHub::null();
            let events = EventBus::default();

            for amount in hits {
                core.take_damage(amount, Vec3::Z, &mut hub, &events);
                prop_assert!(core.health() >= 0.0);
                prop_assert!(core.health() <= core.config().max_health);
                // Zero health iff Dead.
                prop_assert_eq!(
                    core.health() == 0.0,
                    core.state() == CombatState::Dead
                );
            }
        }
    }
}
