//! Collaboration module - multi-round human-in-the-loop feedback.
//!
//! Sessions move through `Created -> AwaitingFeedback -> {ReadyToProceed |
//! AwaitingFeedback} -> Completed`. Classification is keyword based and
//! deterministic; see [`classifier`] for the word lists.

mod analysis;
pub mod classifier;
mod errors;
mod feedback_point;
mod plan;
mod session;
mod status;

pub use analysis::{ActionItem, ClassifiedResponse, FeedbackAnalysis};
pub use classifier::{ActionPriority, Intent, Sentiment};
pub use errors::CollaborationError;
pub use feedback_point::{FeedbackKind, FeedbackPoint, FeedbackPointInput};
pub use plan::{IterationPlan, PlanPriority, PlannedChange, PlannedValidation};
pub use session::{CollaborationSession, CollaborationSummary, FeedbackRound, Momentum};
pub use status::CollaborationStatus;
