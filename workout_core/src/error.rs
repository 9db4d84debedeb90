//! Error types for the workout_core library.

use crate::types::SessionStatus;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced entity does not exist in the store
    #[error("{collection} entry {id} not found")]
    NotFound { collection: &'static str, id: String },

    /// Command is not permitted from the session's current status
    #[error("cannot {action} a session that is {status}")]
    InvalidTransition {
        status: SessionStatus,
        action: &'static str,
    },

    /// Malformed input rejected before any mutation
    #[error("Validation failed: {0}")]
    Validation(String),
}
