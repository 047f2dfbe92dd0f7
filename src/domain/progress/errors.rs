//! Error types for progress tracking.

use crate::domain::foundation::{DomainError, ErrorCode, MilestoneId, TaskId};

/// Errors raised by progress graph operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ProgressError {
    #[error("No progress tracked for task {0}")]
    TaskNotFound(TaskId),

    #[error("Milestone {milestone_id} not found in task {task_id}")]
    MilestoneNotFound {
        task_id: TaskId,
        milestone_id: MilestoneId,
    },

    #[error("Invalid milestone transition: {0}")]
    InvalidTransition(String),

    #[error("Progress storage failed: {0}")]
    Storage(String),
}

impl From<ProgressError> for DomainError {
    fn from(err: ProgressError) -> Self {
        let code = match &err {
            ProgressError::TaskNotFound(_) => ErrorCode::TaskNotFound,
            ProgressError::MilestoneNotFound { .. } => ErrorCode::MilestoneNotFound,
            ProgressError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            ProgressError::Storage(_) => ErrorCode::StorageError,
        };
        DomainError::new(code, err.to_string())
    }
}

impl From<DomainError> for ProgressError {
    fn from(err: DomainError) -> Self {
        ProgressError::Storage(err.to_string())
    }
}
