//! Error types for Saberduel.

use thiserror::Error;

/// Top-level error type for Saberduel operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Serialization errors (snapshots, event payloads)
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A configuration value was outside its valid range
    #[error("invalid config value for {field}: {value}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f32,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Saberduel operations.
pub type CoreResult<T> = Result<T, CoreError>;
