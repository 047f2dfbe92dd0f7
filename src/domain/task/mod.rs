//! Task module - the results the agent reports on.
//!
//! `TaskResult` is produced by the platform adapter and consumed read-only
//! by context analysis, response composition and handoff planning.

mod result;
mod task_type;

pub use result::{TaskChange, TaskOutput, TaskResult, TaskStatus, ValidationResult};
pub use task_type::TaskType;
