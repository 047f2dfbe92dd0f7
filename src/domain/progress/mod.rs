//! Progress module - milestone dependency graphs for running tasks.
//!
//! A [`ProgressGraph`] owns the milestones of one task. Analysis functions
//! (critical path, bottlenecks, efficiency, trend, forecast) are pure reads
//! over a graph and feed [`ProgressReport`].

pub mod analysis;
mod errors;
mod graph;
mod milestone;
mod report;

pub use analysis::{Bottleneck, CompletionForecast, Confidence, CriticalPath, Trend};
pub use errors::ProgressError;
pub use graph::ProgressGraph;
pub use milestone::{Blocker, Milestone, MilestoneSpec, MilestoneStatus, REALTIME_PROGRESS_CAP};
pub use report::{
    MilestoneSnapshot, ProgressAnalysis, ProgressRecommendation, ProgressReport, ProgressSummary,
    RecommendationKind, RecommendationPriority, ReportOptions,
};
