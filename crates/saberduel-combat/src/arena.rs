//! Combat arena: combatant registry and the per-frame resolution pass.
//!
//! Update order each frame: the player and every enemy advance their
//! own local state first, then the resolution pass runs hit tests and
//! applies damage, then dead enemies are filtered out of the registry.
//! The player is never removed — it persists in `Dead` for game-over
//! handling.

use glam::Vec3;

use crate::combatant::{Combatant, CombatState};
use crate::config::{ArenaConfig, CombatantConfig};
use crate::enemy::{Enemy, OpponentView};
use crate::events::{EventBus, GameEvent};
use crate::feedback::{FeedbackHub, SoundCue};
use crate::player::{Player, PlayerInput};
use crate::saber::SaberColor;

use saberduel_common::EntityId;

/// Height above a combatant's feet at which body hits are tested.
const BODY_HIT_HEIGHT: f32 = 1.0;

/// Camera kick when the player blocks a hit.
const SHAKE_PLAYER_BLOCK: f32 = 0.3;

/// Camera kick when the player takes an unblocked hit.
const SHAKE_PLAYER_HIT: f32 = 0.5;

/// Camera kick for a saber-on-saber clash.
const SHAKE_SABER_CLASH: f32 = 0.4;

/// The arena owning every combatant and running the frame loop.
pub struct CombatArena {
    config: ArenaConfig,
    player: Player,
    /// Insertion order is spawn order.
    enemies: Vec<Enemy>,
    events: EventBus,
    feedback: FeedbackHub,
    /// Accumulated game-clock seconds.
    time: f64,
    /// Game-clock time of the last successful player hit.
    last_player_hit_time: f64,
    /// Game-clock time of the last saber-on-saber clash effect.
    last_clash_time: f64,
}

impl std::fmt::Debug for CombatArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatArena")
            .field("time", &self.time)
            .field("enemies", &self.enemies.len())
            .finish_non_exhaustive()
    }
}

impl CombatArena {
    /// Creates an arena with the player at the origin.
    #[must_use]
    pub fn new(player_config: CombatantConfig, config: ArenaConfig, feedback: FeedbackHub) -> Self {
        let player = Player::new(player_config, Vec3::ZERO, SaberColor::Blue);
        let events = EventBus::default();
        events.publish(GameEvent::EntitySpawned {
            entity_id: player.id(),
        });

        Self {
            config,
            player,
            enemies: Vec::new(),
            events,
            feedback,
            time: 0.0,
            last_player_hit_time: f64::MIN,
            last_clash_time: f64::MIN,
        }
    }

    /// Creates a headless arena with default configs and no feedback.
    #[must_use]
    pub fn headless() -> Self {
        Self::new(
            CombatantConfig::player(),
            ArenaConfig::default(),
            FeedbackHub::null(),
        )
    }

    /// Adds an enemy at a position. Returns its entity ID.
    pub fn spawn_enemy(
        &mut self,
        config: CombatantConfig,
        position: Vec3,
        color: SaberColor,
    ) -> EntityId {
        let seed = 0x9e37_79b9_7f4a_7c15_u64 ^ (self.enemies.len() as u64 + 1);
        let enemy = Enemy::new(config, position, color, seed);
        let id = enemy.id();
        self.feedback.play(SoundCue::SaberIgnite);
        self.events.publish(GameEvent::EntitySpawned { entity_id: id });
        self.enemies.push(enemy);
        id
    }

    /// The player combatant.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player access (spawn seeding, tests).
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Living and recently-dead enemies still in the registry.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable enemy access by entity ID.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id() == id)
    }

    /// Accumulated game-clock time in seconds.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Drains lifecycle events for the presentation layer.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// A sender handle for publishing custom events onto the bus.
    #[must_use]
    pub fn event_sender(&self) -> crossbeam_channel::Sender<GameEvent> {
        self.events.sender()
    }

    /// Respawns a dead enemy inside the configured spawn bounds.
    ///
    /// External respawn contract: the delay policy lives with the
    /// caller; the arena only performs the reset. No-op for living
    /// enemies or unknown IDs.
    pub fn respawn_enemy(&mut self, id: EntityId) {
        let bounds = self.config.spawn_bounds;
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id() == id) {
            enemy.respawn_within(&bounds, &mut self.feedback, &self.events);
        }
    }

    /// Advances the whole simulation by one frame.
    pub fn update(&mut self, dt: f32, input: &PlayerInput) {
        self.time += f64::from(dt);
        let now = self.time;
        self.feedback.set_time(now);

        self.player
            .update(input, dt, now, &mut self.feedback, &self.events);

        let player_view = OpponentView::of(&self.player);
        for enemy in &mut self.enemies {
            enemy.update(dt, now, &player_view, &mut self.feedback, &self.events);
        }

        self.resolve(now);
        self.cleanup();
    }

    /// The once-per-frame combat resolution pass.
    fn resolve(&mut self, now: f64) {
        self.resolve_player_hits(now);
        self.resolve_enemy_hits();
        self.resolve_saber_clashes(now);
    }

    /// Player-attacks-enemy check, gated by the per-hit cooldown so a
    /// single swing cannot land on every frame it overlaps a target.
    fn resolve_player_hits(&mut self, now: f64) {
        if !self.player.is_attacking() {
            return;
        }
        if now - self.last_player_hit_time < self.config.player_hit_cooldown {
            return;
        }

        let tip = self
            .player
            .core()
            .saber()
            .blade_tip(self.player.pose());
        let swing_damage = self.player.core().config().swing_damage;
        let hit_range = self.player.core().config().hit_range;
        let player_position = self.player.pose().position;

        let mut contact = false;
        for enemy in &mut self.enemies {
            if !enemy.is_alive() {
                continue;
            }
            let body = enemy.pose().position + Vec3::Y * BODY_HIT_HEIGHT;
            if tip.distance(body) > hit_range {
                continue;
            }

            // Blocked-in-arc hits resolve to a clash inside take_damage;
            // either way this swing has made contact.
            enemy.take_damage(swing_damage, player_position, &mut self.feedback, &self.events);
            contact = true;
        }

        if contact {
            self.last_player_hit_time = now;
        }
    }

    /// Enemy-attacks-player check. Damage lands once per attack cycle,
    /// inside the attack's damage window, to line up with the swing.
    fn resolve_enemy_hits(&mut self) {
        let player_position = self.player.pose().position;

        for enemy in &mut self.enemies {
            if !enemy.is_alive()
                || !enemy.core().in_damage_window()
                || enemy.core().damage_applied_this_attack()
            {
                continue;
            }

            let reach = enemy.core().config().attack_range;
            if enemy.pose().distance_to(player_position) > reach {
                continue;
            }

            enemy.core_mut().mark_damage_applied();
            let damage = enemy.core().config().swing_damage;
            let from = enemy.pose().position;
            let outcome =
                self.player
                    .take_damage(damage, from, &mut self.feedback, &self.events);

            let intensity = if outcome.blocked {
                SHAKE_PLAYER_BLOCK
            } else {
                SHAKE_PLAYER_HIT
            };
            self.feedback.shake(intensity);
        }
    }

    /// Saber-on-saber proximity clash, independent of attack state,
    /// throttled so touching blades do not spam effects every frame.
    fn resolve_saber_clashes(&mut self, now: f64) {
        if now - self.last_clash_time < self.config.clash_throttle {
            return;
        }
        if !self.player.core().saber().is_active() {
            return;
        }

        let player_tip = self
            .player
            .core()
            .saber()
            .blade_tip(self.player.pose());
        let color = self.player.core().saber().color();

        for enemy in &mut self.enemies {
            if !enemy.core().saber().is_active() {
                continue;
            }
            let enemy_tip = enemy.core().saber().blade_tip(enemy.pose());
            if player_tip.distance(enemy_tip) > self.config.clash_distance {
                continue;
            }

            let midpoint = (player_tip + enemy_tip) * 0.5;
            self.feedback.play(SoundCue::SaberClash);
            self.feedback.clash_effect(midpoint, color, 0.8);
            self.feedback.shake(SHAKE_SABER_CLASH);
            self.player.core_mut().saber_mut().begin_clash();
            enemy.core_mut().saber_mut().begin_clash();
            self.events.publish(GameEvent::SaberClash {
                position: midpoint.to_array(),
            });
            self.last_clash_time = now;
            break;
        }
    }

    /// Filters dead enemies out of the registry. The player persists.
    fn cleanup(&mut self) {
        let events = &self.events;
        self.enemies.retain(|enemy| {
            if enemy.state() == CombatState::Dead {
                events.publish(GameEvent::EnemyRemoved {
                    entity_id: enemy.id(),
                });
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackRecord, RecordingFeedback};

    const DT: f32 = 1.0 / 60.0;

    fn recorded_arena() -> (CombatArena, RecordingFeedback) {
        let recorder = RecordingFeedback::new();
        let arena = CombatArena::new(
            CombatantConfig::player(),
            ArenaConfig::default(),
            recorder.clone().into_hub(),
        );
        (arena, recorder)
    }

    /// Steps the arena with no player input.
    fn run_idle(arena: &mut CombatArena, seconds: f32) {
        let steps = (seconds / DT).ceil() as usize;
        for _ in 0..steps {
            arena.update(DT, &PlayerInput::default());
        }
    }

    #[test]
    fn test_spawn_order_and_registry() {
        let mut arena = CombatArena::headless();
        let a = arena.spawn_enemy(CombatantConfig::enemy(), Vec3::new(0.0, 0.0, 5.0), SaberColor::Red);
        let b = arena.spawn_enemy(CombatantConfig::enemy(), Vec3::new(5.0, 0.0, 0.0), SaberColor::Red);

        assert_eq!(arena.enemies().len(), 2);
        assert_eq!(arena.enemies()[0].id(), a);
        assert_eq!(arena.enemies()[1].id(), b);
    }

    #[test]
    fn test_enemy_attack_lands_once_in_window() {
        let (mut arena, _recorder) = recorded_arena();
        // Enemy on top of the player: in range, attacks immediately.
        arena.spawn_enemy(CombatantConfig::enemy(), Vec3::new(0.0, 0.0, 1.5), SaberColor::Red);

        let start_health = arena.player().core().health();
        // One full attack plus slack; the interval keeps a second swing
        // from finishing inside this window.
        run_idle(&mut arena, 1.0);

        let dealt = start_health - arena.player().core().health();
        let expected = CombatantConfig::enemy().swing_damage;
        assert!(
            (dealt - expected).abs() < f32::EPSILON,
            "expected exactly one damage application, got {dealt}"
        );
    }

    #[test]
    fn test_blocking_player_takes_mitigated_damage_and_shake() {
        let (mut arena, recorder) = recorded_arena();
        arena.spawn_enemy(CombatantConfig::enemy(), Vec3::new(0.0, 0.0, 1.5), SaberColor::Red);

        // Face the enemy and hold block throughout.
        let input = PlayerInput {
            block: true,
            look_yaw: Some(0.0), // +Z, toward the enemy
            ..PlayerInput::default()
        };
        let start_health = arena.player().core().health();
        let steps = (1.0 / DT).ceil() as usize;
        for _ in 0..steps {
            arena.update(DT, &input);
        }

        let dealt = start_health - arena.player().core().health();
        let expected = CombatantConfig::enemy().swing_damage * 0.25; // 75% mitigated
        assert!((dealt - expected).abs() < 1e-3);
        assert!(arena.player().is_blocking());

        // Block feedback: clash camera kick, not the hit kick.
        assert!(recorder
            .records()
            .iter()
            .any(|r| *r == FeedbackRecord::Shake(SHAKE_PLAYER_BLOCK)));
    }

    #[test]
    fn test_player_swing_kills_and_cleanup_removes_enemy() {
        let (mut arena, recorder) = recorded_arena();
        let weak = CombatantConfig::enemy()
            .with_max_health(15.0)
            .with_block_chance(0.0);
        let id = arena.spawn_enemy(weak, Vec3::new(0.0, 0.0, 1.5), SaberColor::Red);

        // Swing once; 25 damage kills a 15hp enemy on the first contact.
        arena.update(DT, &PlayerInput::attack());

        assert!(arena.enemy_mut(id).is_none(), "dead enemy filtered out");
        assert_eq!(recorder.cue_count(SoundCue::Death), 1);

        let events = arena.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::EntityDied { entity_id } if *entity_id == id)));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyRemoved { entity_id } if *entity_id == id)));
    }

    #[test]
    fn test_player_hit_cooldown_prevents_multi_hit_per_swing() {
        let (mut arena, _recorder) = recorded_arena();
        // Sturdy enemy that survives several swings, no blocking.
        let sturdy = CombatantConfig::enemy()
            .with_max_health(1000.0)
            .with_block_chance(0.0);
        let id = arena.spawn_enemy(sturdy, Vec3::new(0.0, 0.0, 1.5), SaberColor::Red);

        // Hold attack for one swing's worth of frames. The per-hit
        // cooldown (0.4s) mostly covers the 0.8s swing: at most two
        // contacts can fit in one swing window.
        let steps = (0.8 / DT).ceil() as usize;
        for _ in 0..steps {
            arena.update(DT, &PlayerInput::attack());
        }

        let enemy = arena.enemy_mut(id).expect("enemy alive");
        let dealt = 1000.0 - enemy.core().health();
        let per_hit = CombatantConfig::player().swing_damage;
        assert!(dealt >= per_hit - f32::EPSILON);
        assert!(
            dealt <= per_hit * 2.0 + f32::EPSILON,
            "per-hit cooldown must bound damage per swing, dealt {dealt}"
        );
    }

    #[test]
    fn test_saber_clash_fires_once_per_throttle_window() {
        let (mut arena, recorder) = recorded_arena();
        // Enemy just behind the player: facing the player keeps both
        // blades pointed down +Z with overlapping tips.
        arena.spawn_enemy(
            CombatantConfig::enemy(),
            Vec3::new(0.0, 0.0, -0.05),
            SaberColor::Red,
        );

        arena.update(DT, &PlayerInput::default());
        let clashes_first = recorder
            .records()
            .iter()
            .filter(|r| matches!(r, FeedbackRecord::Clash(_, _)))
            .count();
        assert_eq!(clashes_first, 1);

        // Next frame is inside the throttle window: no second clash.
        arena.update(DT, &PlayerInput::default());
        let clashes_second = recorder
            .records()
            .iter()
            .filter(|r| matches!(r, FeedbackRecord::Clash(_, _)))
            .count();
        assert_eq!(clashes_second, 1);

        let events = arena.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::SaberClash { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_dead_player_persists_for_game_over() {
        let (mut arena, _recorder) = recorded_arena();
        let mut hub = FeedbackHub::null();
        let events = EventBus::default();
        arena
            .player_mut()
            .core_mut()
            .take_damage(1000.0, Vec3::Z, &mut hub, &events);

        run_idle(&mut arena, 0.5);
        assert_eq!(arena.player().state(), CombatState::Dead);
    }

    #[test]
    fn test_respawn_enemy_through_arena() {
        let mut arena = CombatArena::headless();
        let id = arena.spawn_enemy(
            CombatantConfig::enemy().with_max_health(10.0),
            Vec3::new(0.0, 0.0, 1.5),
            SaberColor::Red,
        );

        // Kill it directly, then respawn before any update filters it.
        {
            let mut hub = FeedbackHub::null();
            let events = EventBus::default();
            let enemy = arena.enemy_mut(id).expect("enemy");
            enemy.core_mut().take_damage(50.0, Vec3::Z, &mut hub, &events);
            assert_eq!(enemy.state(), CombatState::Dead);
        }

        arena.respawn_enemy(id);
        let bounds = ArenaConfig::default().spawn_bounds;
        let enemy = arena.enemy_mut(id).expect("enemy");
        assert_eq!(enemy.state(), CombatState::Idle);
        assert!(bounds.contains(enemy.pose().position));
    }

    #[test]
    fn test_presentation_failures_never_break_combat() {
        let mut arena = CombatArena::new(
            CombatantConfig::player(),
            ArenaConfig::default(),
            RecordingFeedback::failing("device lost").into_hub(),
        );
        let id = arena.spawn_enemy(
            CombatantConfig::enemy()
                .with_max_health(15.0)
                .with_block_chance(0.0),
            Vec3::new(0.0, 0.0, 1.5),
            SaberColor::Red,
        );

        // Damage still applies and cleanup still runs with every
        // collaborator failing.
        arena.update(DT, &PlayerInput::attack());
        assert!(arena.enemy_mut(id).is_none());
    }
}
