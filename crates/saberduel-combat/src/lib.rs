//! # Saberduel Combat
//!
//! First-person lightsaber melee combat for Saberduel.
//!
//! This crate provides the complete combat simulation layer:
//! - Combatant state machine (idle, pursuit, attack, block, stagger, death)
//! - Player controller bridging raw input to combat actions
//! - Enemy AI decision loop (wander, pursue, strafe, attack, reactive block)
//! - Lightsaber model with blade-tip hit geometry and clash flashes
//! - Per-frame combat resolution pass in the arena
//! - Presentation feedback hub (audio, VFX, camera shake)
//! - Event bus for lifecycle notifications
//! - Snapshot replication for remote duels
//!
//! The simulation is headless: rendering, input devices, and transport
//! plug in through the [`feedback`] traits, [`player::PlayerInput`],
//! and [`replication`] respectively.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod arena;
pub mod combatant;
pub mod config;
pub mod enemy;
pub mod events;
pub mod feedback;
pub mod player;
pub mod replication;
pub mod saber;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::arena::*;
    pub use crate::combatant::*;
    pub use crate::config::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::feedback::*;
    pub use crate::player::*;
    pub use crate::replication::*;
    pub use crate::saber::*;
}

pub use prelude::*;
