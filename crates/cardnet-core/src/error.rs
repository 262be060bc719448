use thiserror::Error;

/// Reasons a person record is rejected before it reaches the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id must not contain whitespace: {0:?}")]
    WhitespaceInUserId(String),
}
