//! Error types for the lift_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lift_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session input rejected (empty, non-positive reps, wrong set count)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persisted progression state is not one of A/B/C/D
    #[error("Unknown progression state: {0:?}")]
    UnknownState(String),

    /// Exercise record violates its invariants
    #[error("Invalid exercise record: {0}")]
    InvalidRecord(String),

    /// No such user in the roster
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// No such exercise for the user
    #[error("Unknown exercise {exercise:?} for user {user:?}")]
    UnknownExercise { user: String, exercise: String },

    /// Roster entry already present
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}
