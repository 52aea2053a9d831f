//! Simulator configuration.
//!
//! Parameters for the headless duel run. Configuration can be loaded
//! from and saved to a file; missing or invalid files fall back to
//! defaults so the simulator always starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "saberduel-sim.toml";

/// Simulator configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Run Settings ===
    /// Simulated duel length in seconds
    pub duration_seconds: f32,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Number of enemies to spawn
    pub enemy_count: u32,

    // === Driver Settings ===
    /// Distance at which the scripted player starts swinging
    pub engage_distance: f32,
    /// Whether the scripted player raises its guard while closing in
    pub guard_while_closing: bool,

    // === Output Settings ===
    /// Log every drained lifecycle event
    pub log_events: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 30.0,
            tick_rate: 60,
            enemy_count: 2,
            engage_distance: 1.8,
            guard_while_closing: false,
            log_events: true,
        }
    }
}

impl SimConfig {
    /// Load configuration from the default file location.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {e}");
                Self::default()
            }
        }
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }

    /// Seconds advanced per simulation tick.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = SimConfig::load_from("definitely/not/a/real/path.toml");
        assert_eq!(config.tick_rate, SimConfig::default().tick_rate);
    }

    #[test]
    fn test_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sim.toml");

        let mut config = SimConfig::default();
        config.enemy_count = 5;
        config.duration_seconds = 12.5;
        config.save_to(&path).expect("save");

        let loaded = SimConfig::load_from(&path);
        assert_eq!(loaded.enemy_count, 5);
        assert!((loaded.duration_seconds - 12.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_file_uses_defaults_for_the_rest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("partial.toml");
        fs::write(&path, "enemy_count = 7\n").expect("write");

        let loaded = SimConfig::load_from(&path);
        assert_eq!(loaded.enemy_count, 7);
        assert_eq!(loaded.tick_rate, SimConfig::default().tick_rate);
    }
}
