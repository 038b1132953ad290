//! Central error types for the engine (thiserror-based).

use thiserror::Error;

/// Errors reported to callers of the sort controller and its collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("Nothing to sort: the sequence is empty")]
    EmptySequence,

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: String,
    },

    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Invalid speed: {reason}")]
    InvalidSpeed { reason: String },

    #[error("Unknown algorithm: {name}")]
    UnknownAlgorithm { name: String },

    #[error("Unknown direction: {name}")]
    UnknownDirection { name: String },

    #[error("Sort run failed: {reason}")]
    RunFailed { reason: String },
}

/// Convenience Result type for sort operations.
pub type SortResult<T> = Result<T, SortError>;

/// Errors raised while loading or validating a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}
