//! Error types for the BGM engine
//!
//! None of these ever reach a caller of the engine façade: every failure is
//! turned into a degraded mode (no persistence, no equalizer, no playback).
//! The building blocks underneath still report them as values.

use thiserror::Error;

/// Engine-level errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Configuration produced nothing playable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Key-value storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Audio graph (equalizer) failure
    #[error("Audio graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Failures of the durable key-value backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No storage backend is reachable (private mode, sandboxed iframe, ...)
    #[error("storage unavailable")]
    Unavailable,

    /// Reading a key failed
    #[error("failed to read {key}: {message}")]
    Read { key: String, message: String },

    /// Writing a key failed (quota, permissions)
    #[error("failed to write {key}: {message}")]
    Write { key: String, message: String },
}

/// Failures while wiring the equalizer into the output's audio graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The output has no processing graph
    #[error("output does not support an equalizer")]
    Unsupported,

    /// The filter chain is already connected to this output
    #[error("equalizer already connected")]
    AlreadyConnected,

    /// The output element is already captured by another graph, or the
    /// graph refused the connection
    #[error("failed to capture output: {0}")]
    Capture(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
