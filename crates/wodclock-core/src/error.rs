//! Core error types for wodclock-core.
//!
//! Fatal errors (session construction, configuration) live here.
//! Best-effort collaborator failures ([`crate::cues::CueError`],
//! [`crate::session::WakeLockError`]) are swallowed and recorded at their
//! call sites and never reach this hierarchy.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for wodclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session construction errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors that refuse session construction.
///
/// The engine reports these synchronously to the caller rather than
/// entering an undefined timer state. Unrecognized formats are rejected
/// earlier, at the serde boundary, when the definition is parsed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The workout has no segments to run.
    #[error("workout {id} has an empty segment list")]
    EmptyWorkout { id: Uuid },

    /// A capped format was given a zero overall duration; its clock would
    /// start already expired.
    #[error("workout {id} uses a capped format with a zero total duration")]
    ZeroDuration { id: Uuid },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown dot-path key in get/set
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid value for a key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
