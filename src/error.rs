//! Error types for the flappy-q crate

use thiserror::Error;

/// Main error type for the flappy-q crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("environment exposes {got} actions, expected {expected} (flap, no-op)")]
    InvalidActionSet { expected: usize, got: usize },

    #[error("q-table shape {got:?} does not match discretizer shape {expected:?}")]
    ShapeMismatch {
        expected: [usize; 4],
        got: [usize; 4],
    },

    #[error("q-table holds {got} values but shape {shape:?} requires {expected}")]
    CorruptTable {
        shape: [usize; 4],
        expected: usize,
        got: usize,
    },

    #[error("environment failed to {operation}: {message}")]
    Environment { operation: String, message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Build an [`Error::Environment`] from any displayable failure.
    pub fn environment(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::Environment {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}
