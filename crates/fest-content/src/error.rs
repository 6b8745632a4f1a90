//! Error types for the content layer.

use fest_state::{ContentId, StateError};
use thiserror::Error;

/// Result type alias for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("content document {0} has not been initialized")]
    Missing(ContentId),

    #[error("{list} entry not found: {id}")]
    EntryNotFound { list: &'static str, id: String },

    #[error("position {index} is out of range for {len} {list}")]
    OutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("registration not found: {0}")]
    RegistrationNotFound(String),

    #[error("No registrations to export")]
    NothingToExport,
}
