//! Error types for response composition.

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CompositionError {
    /// Composition produced no sections or only whitespace.
    #[error("Composed response for {template} is empty")]
    EmptyResponse { template: String },

    #[error("Response composition failed: {0}")]
    Internal(String),
}

impl CompositionError {
    pub fn empty(template: impl Into<String>) -> Self {
        CompositionError::EmptyResponse {
            template: template.into(),
        }
    }
}

impl From<CompositionError> for DomainError {
    fn from(err: CompositionError) -> Self {
        let code = match &err {
            CompositionError::EmptyResponse { .. } => ErrorCode::EmptyResponse,
            CompositionError::Internal(_) => ErrorCode::InternalError,
        };
        DomainError::new(code, err.to_string())
    }
}

impl From<DomainError> for CompositionError {
    fn from(err: DomainError) -> Self {
        CompositionError::Internal(err.to_string())
    }
}
