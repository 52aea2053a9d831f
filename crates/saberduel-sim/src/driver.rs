//! Scripted player driver for headless runs.
//!
//! Stands in for a human: closes on the nearest enemy, keeps it in
//! view, and swings when inside engage distance. Just enough behavior
//! to make a full duel play out without input devices.

use glam::Vec3;
use saberduel_combat::arena::CombatArena;
use saberduel_combat::combatant::Combatant;
use saberduel_combat::player::PlayerInput;

use crate::config::SimConfig;

/// Produces one tick of player intent from the current arena state.
#[must_use]
pub fn scripted_input(arena: &CombatArena, config: &SimConfig) -> PlayerInput {
    let player_pos = arena.player().pose().position;

    let nearest = arena
        .enemies()
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            let da = a.pose().position.distance_squared(player_pos);
            let db = b.pose().position.distance_squared(player_pos);
            da.total_cmp(&db)
        });

    let Some(target) = nearest else {
        return PlayerInput::default();
    };

    let to_target = target.pose().position - player_pos;
    let flat = Vec3::new(to_target.x, 0.0, to_target.z);
    let distance = flat.length();
    let look_yaw = Some(flat.x.atan2(flat.z));

    if distance > config.engage_distance {
        PlayerInput {
            movement: flat,
            look_yaw,
            attack: false,
            block: config.guard_while_closing,
        }
    } else {
        PlayerInput {
            movement: Vec3::ZERO,
            look_yaw,
            attack: true,
            block: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saberduel_combat::config::CombatantConfig;
    use saberduel_combat::saber::SaberColor;

    #[test]
    fn test_closes_then_swings() {
        let mut arena = CombatArena::headless();
        arena.spawn_enemy(
            CombatantConfig::enemy(),
            Vec3::new(0.0, 0.0, 8.0),
            SaberColor::Red,
        );
        let config = SimConfig::default();

        let far = scripted_input(&arena, &config);
        assert!(!far.attack);
        assert!(far.movement.z > 0.0);

        // Teleport next to the enemy; the script switches to swinging.
        arena.player_mut().teleport(Vec3::new(0.0, 0.0, 7.0));
        let close = scripted_input(&arena, &config);
        assert!(close.attack);
        assert_eq!(close.movement, Vec3::ZERO);
    }

    #[test]
    fn test_idles_with_no_living_enemies() {
        let arena = CombatArena::headless();
        let input = scripted_input(&arena, &SimConfig::default());
        assert_eq!(input, PlayerInput::default());
    }
}
