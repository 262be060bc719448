//! Errors returned by graph operations.

use cardnet_core::ValidationError;
use thiserror::Error;

/// Failure kinds surfaced to callers of the graph engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The referenced user has no person node.
    #[error("person not found: {0}")]
    NotFound(String),

    /// The request can never succeed as stated (self-friendship, blank id).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A person with this user id is already stored.
    #[error("person already exists: {0}")]
    AlreadyExists(String),

    /// Store failure or a broken graph invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for GraphError {
    fn from(err: ValidationError) -> Self {
        GraphError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
