//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait, repository
//! traits and error types shared by every other domain module.

mod errors;
mod ids;
mod percentage;
mod repository;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ActionId, MilestoneId, SessionId, TaskId, UserId};
pub use percentage::Percentage;
pub use repository::{Entity, ExpiringRepository, Repository};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
