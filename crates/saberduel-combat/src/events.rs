//! Event bus for lifecycle notifications to the presentation layer.
//!
//! The combat core publishes here and never knows how events are
//! rendered. Publishing is non-blocking: when the channel is full the
//! event is dropped rather than stalling the frame.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use saberduel_common::{CoreError, CoreResult, EntityId};

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// A combatant entered the arena
    EntitySpawned {
        /// Entity ID
        entity_id: EntityId,
    },
    /// A combatant's health changed
    HealthChanged {
        /// Entity ID
        entity_id: EntityId,
        /// Health after the change
        health: f32,
        /// Maximum health
        max_health: f32,
    },
    /// A combatant's health reached zero
    EntityDied {
        /// Entity ID
        entity_id: EntityId,
    },
    /// A dead enemy was removed from the registry
    EnemyRemoved {
        /// Entity ID
        entity_id: EntityId,
    },
    /// A dead combatant was restored to life
    Respawned {
        /// Entity ID
        entity_id: EntityId,
    },
    /// Two active blades crossed
    SaberClash {
        /// Clash midpoint in world space
        position: [f32; 3],
    },
    /// Custom mod event
    Custom {
        /// Event name
        name: String,
        /// JSON payload
        payload: String,
    },
}

impl GameEvent {
    /// Builds a [`GameEvent::Custom`] from any serializable payload.
    pub fn custom<T: Serialize>(name: impl Into<String>, payload: &T) -> CoreResult<Self> {
        Ok(Self::Custom {
            name: name.into(),
            payload: serde_json::to_string(payload)
                .map_err(|e| CoreError::Serialization(e.to_string()))?,
        })
    }
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}
