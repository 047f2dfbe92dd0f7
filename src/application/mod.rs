//! Application layer - services coordinating domain logic and ports.
//!
//! Each subsystem is a service holding its ports behind `Arc<dyn ...>`.
//! [`Orchestrator`] composes all of them and is the surface callers use.

mod collaboration_engine;
mod context_analyzer;
mod handoff_planner;
pub mod history;
mod orchestrator;
mod progress_tracker;
mod response_composer;

pub use collaboration_engine::CollaborationEngine;
pub use context_analyzer::ContextAnalyzer;
pub use handoff_planner::{HandoffPlanner, HandoffRecord, HandoffStatistics};
pub use history::BoundedHistory;
pub use orchestrator::{
    OperationRecord, Orchestrator, OrchestratorStatistics, CAUSE_ATTRIBUTE, ERROR_CODE_ATTRIBUTE,
};
pub use progress_tracker::{ProgressTracker, DEFAULT_ESTIMATE};
pub use response_composer::{ResponseComposer, ADJUSTMENTS_ATTRIBUTE, HINTS_ATTRIBUTE};
