//! Error types for collaboration sessions.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, ValidationError};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CollaborationError {
    #[error("Collaboration session {0} not found")]
    SessionNotFound(SessionId),

    #[error("Collaboration session {0} is already completed")]
    SessionCompleted(SessionId),

    #[error("Invalid feedback point: {0}")]
    InvalidFeedbackPoint(#[from] ValidationError),

    #[error("Invalid session transition: {0}")]
    InvalidTransition(String),

    #[error("Session storage failed: {0}")]
    Storage(String),
}

impl From<CollaborationError> for DomainError {
    fn from(err: CollaborationError) -> Self {
        match err {
            CollaborationError::InvalidFeedbackPoint(inner) => {
                DomainError::from(inner).with_detail("field", "feedback_points")
            }
            other => {
                let code = match &other {
                    CollaborationError::SessionNotFound(_) => ErrorCode::SessionNotFound,
                    CollaborationError::SessionCompleted(_) => ErrorCode::SessionCompleted,
                    CollaborationError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
                    _ => ErrorCode::StorageError,
                };
                DomainError::new(code, other.to_string())
            }
        }
    }
}

impl From<DomainError> for CollaborationError {
    fn from(err: DomainError) -> Self {
        CollaborationError::Storage(err.to_string())
    }
}
