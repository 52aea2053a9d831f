//! Snapshot-based replication for remote duels.
//!
//! Outbound, a [`SnapshotStreamer`] samples a combatant at a fixed rate
//! and emits compact [`CombatSnapshot`]s for the transport layer to
//! ship. Inbound, a [`RemoteProxy`] holds the last two snapshots for a
//! remote combatant and interpolates its pose between them. The proxy
//! is render-side only: it never feeds back into local combat state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use saberduel_common::pose::{lerp_position, lerp_yaw};
use saberduel_common::{CoreError, CoreResult, EntityId, Pose};

use crate::combatant::Combatant;

/// Default outbound snapshot rate in hertz.
pub const DEFAULT_SNAPSHOT_RATE_HZ: f32 = 20.0;

/// One combatant's replicated state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    /// Which combatant this snapshot describes.
    pub entity_id: EntityId,
    /// Game-clock capture time in seconds.
    pub time: f64,
    /// World position.
    pub position: [f32; 3],
    /// Facing yaw in radians.
    pub yaw: f32,
    /// Current health, for remote health bars.
    pub health: f32,
    /// Whether the blade is extended.
    pub saber_active: bool,
    /// Mid-swing flag, drives the remote swing animation.
    pub is_attacking: bool,
    /// Guard-up flag, drives the remote block animation.
    pub is_blocking: bool,
}

impl CombatSnapshot {
    /// Captures a combatant's current replicated state.
    #[must_use]
    pub fn capture(combatant: &impl Combatant, time: f64) -> Self {
        let core = combatant.core();
        Self {
            entity_id: core.id(),
            time,
            position: core.pose().position.to_array(),
            yaw: core.pose().yaw,
            health: core.health(),
            saber_active: core.saber().is_active(),
            is_attacking: core.is_attacking(),
            is_blocking: core.is_blocking(),
        }
    }

    /// Encodes the snapshot for the wire.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Decodes a snapshot received from the wire.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        bincode::deserialize(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// The snapshot's pose.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(Vec3::from_array(self.position)).with_yaw(self.yaw)
    }
}

/// Emits snapshots of a local combatant at a throttled rate.
#[derive(Debug, Clone)]
pub struct SnapshotStreamer {
    interval: f64,
    last_emit: f64,
}

impl Default for SnapshotStreamer {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_RATE_HZ)
    }
}

impl SnapshotStreamer {
    /// Creates a streamer emitting at `rate_hz`. Non-positive rates
    /// fall back to the default.
    #[must_use]
    pub fn new(rate_hz: f32) -> Self {
        let rate = if rate_hz > 0.0 {
            rate_hz
        } else {
            DEFAULT_SNAPSHOT_RATE_HZ
        };
        Self {
            interval: f64::from(1.0 / rate),
            last_emit: f64::MIN,
        }
    }

    /// Seconds between emitted snapshots.
    #[must_use]
    pub const fn interval(&self) -> f64 {
        self.interval
    }

    /// Samples the combatant if the emit interval has elapsed.
    pub fn sample(&mut self, combatant: &impl Combatant, now: f64) -> Option<CombatSnapshot> {
        if now - self.last_emit < self.interval {
            return None;
        }
        self.last_emit = now;
        Some(CombatSnapshot::capture(combatant, now))
    }
}

/// Render-side stand-in for a remote combatant.
///
/// Keeps the two most recent snapshots and linearly interpolates
/// between them, so remote movement stays smooth at snapshot rates
/// well below the frame rate.
#[derive(Debug, Clone, Default)]
pub struct RemoteProxy {
    previous: Option<CombatSnapshot>,
    latest: Option<CombatSnapshot>,
}

impl RemoteProxy {
    /// Creates an empty proxy with no snapshots yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a received snapshot into the interpolation window.
    ///
    /// Snapshots older than the latest one are dropped; the transport
    /// may reorder.
    pub fn ingest(&mut self, snapshot: CombatSnapshot) {
        match self.latest {
            Some(latest) if snapshot.time <= latest.time => {}
            _ => {
                self.previous = self.latest.take();
                self.latest = Some(snapshot);
            }
        }
    }

    /// The most recently received snapshot, if any.
    #[must_use]
    pub const fn latest(&self) -> Option<&CombatSnapshot> {
        self.latest.as_ref()
    }

    /// Interpolated pose at `render_time`, or `None` before the first
    /// snapshot arrives.
    #[must_use]
    pub fn sample_pose(&self, render_time: f64) -> Option<Pose> {
        let latest = self.latest?;
        let Some(previous) = self.previous else {
            return Some(latest.pose());
        };

        let span = latest.time - previous.time;
        if span <= f64::EPSILON {
            return Some(latest.pose());
        }
        // lerp helpers clamp, so times outside the window hold the
        // nearest endpoint instead of extrapolating.
        let t = ((render_time - previous.time) / span) as f32;
        let position = lerp_position(
            Vec3::from_array(previous.position),
            Vec3::from_array(latest.position),
            t,
        );
        let yaw = lerp_yaw(previous.yaw, latest.yaw, t);
        Some(Pose::new(position).with_yaw(yaw))
    }
}
