//! Error types for the service layer.
//!
//! Every validation and authorization failure is detected before any write;
//! the shell maps these kinds onto its transport-level responses.

use crate::api::SlotConflict;
use crate::db::repository::RepositoryError;
use crate::models::time::TimeParseError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Discriminant of a [`ServiceError`], for shell-layer mapping and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFormat,
    NotFound,
    AlreadyExists,
    Conflict,
    Forbidden,
    InvalidState,
    Internal,
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed time or date input.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule rejected the operation (duplicate absence record).
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A scheduling clash or a blocked cascade.
    ///
    /// For scheduling overlaps `conflicting` names the colliding slot, its
    /// subject, and the occupied time range so a human can resolve the clash.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        conflicting: Option<SlotConflict>,
    },

    /// Access-scope or role check failed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Illegal state-machine transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage-level failure that is not a domain error.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl ServiceError {
    /// Build a scheduling-clash error from its diagnostic.
    pub fn conflict(conflicting: SlotConflict) -> Self {
        Self::Conflict {
            message: conflicting.to_string(),
            conflicting: Some(conflicting),
        }
    }

    /// Build a conflict error without a colliding slot (cascade blocks).
    pub fn conflict_message(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            conflicting: None,
        }
    }

    /// The error kind, for shell-layer mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Repository(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => ServiceError::NotFound(message),
            RepositoryError::UniqueViolation { message, .. } => {
                ServiceError::AlreadyExists(message)
            }
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TimeParseError> for ServiceError {
    fn from(err: TimeParseError) -> Self {
        ServiceError::InvalidFormat(err.to_string())
    }
}
