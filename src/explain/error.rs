//! Explain error types
//!
//! Every error is terminal for the single call that produced it.

use thiserror::Error;

/// Errors produced by the boundary operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplainError {
    /// Wrong number of arguments passed to a boundary operation
    #[error("Expected exactly one argument")]
    Arity { expected: usize, received: usize },

    /// Parser message, passed through unmodified
    #[error("{0}")]
    Parse(String),

    /// The combined result could not be converted to the output representation
    #[error("Failed to serialize result")]
    Serialization(String),

    /// `explain` was called with an empty query
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Function table lookup failed
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

impl From<serde_json::Error> for ExplainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for explain operations
pub type ExplainResult<T> = Result<T, ExplainError>;
