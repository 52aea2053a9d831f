//! # Saberduel Sim
//!
//! Headless duel simulator. Runs the combat core at a fixed tick rate
//! with a scripted player, logging lifecycle events as they happen.
//! Useful for balancing combat configs without a renderer attached.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod driver;

use anyhow::Result;
use glam::Vec3;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use saberduel_combat::arena::CombatArena;
use saberduel_combat::combatant::Combatant;
use saberduel_combat::config::{ArenaConfig, CombatantConfig};
use saberduel_combat::events::GameEvent;
use saberduel_combat::feedback::FeedbackHub;
use saberduel_combat::saber::SaberColor;

use config::SimConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("saberduel=info".parse()?))
        .init();

    info!("Saberduel sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load();
    run(&config);

    info!("Saberduel sim complete");
    Ok(())
}

/// Runs one full simulated duel.
fn run(config: &SimConfig) {
    let mut arena = CombatArena::new(
        CombatantConfig::player(),
        ArenaConfig::default(),
        FeedbackHub::null(),
    );

    // Spawn enemies in a ring around the player.
    for i in 0..config.enemy_count {
        let angle = f64::from(i) / f64::from(config.enemy_count.max(1))
            * std::f64::consts::TAU;
        let position = Vec3::new(angle.cos() as f32 * 6.0, 0.0, angle.sin() as f32 * 6.0);
        arena.spawn_enemy(CombatantConfig::enemy(), position, SaberColor::Red);
    }
    info!(enemies = config.enemy_count, "duel started");

    let dt = config.dt();
    let ticks = (config.duration_seconds / dt).ceil() as u64;
    let mut kills = 0u64;
    let mut clashes = 0u64;

    for _ in 0..ticks {
        let input = driver::scripted_input(&arena, config);
        arena.update(dt, &input);

        for event in arena.drain_events() {
            match &event {
                GameEvent::EnemyRemoved { .. } => kills += 1,
                GameEvent::SaberClash { .. } => clashes += 1,
                _ => {}
            }
            if config.log_events {
                info!(time = arena.time(), ?event, "event");
            }
        }

        if !arena.player().is_alive() {
            info!(time = arena.time(), "player defeated");
            break;
        }
        if arena.enemies().is_empty() {
            info!(time = arena.time(), "all enemies down");
            break;
        }
    }

    info!(
        time = arena.time(),
        player_health = arena.player().core().health(),
        enemies_left = arena.enemies().len(),
        kills,
        clashes,
        "duel finished"
    );
}
