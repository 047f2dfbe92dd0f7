//! Progress report value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{MilestoneId, Percentage, TaskId, Timestamp};

use super::analysis::{
    bottlenecks, critical_path, efficiency, forecast, trend, Bottleneck, CompletionForecast,
    CriticalPath, Trend,
};
use super::{Milestone, MilestoneStatus, ProgressGraph};

/// An in-progress milestone past this multiple of its estimate is flagged.
pub const OVERRUN_FACTOR: f64 = 1.5;

/// Critical paths longer than this are flagged.
pub const LONG_CHAIN_THRESHOLD: usize = 5;

/// Which optional parts of a report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub include_analysis: bool,
    pub include_predictions: bool,
    pub include_recommendations: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_analysis: true,
            include_predictions: true,
            include_recommendations: true,
        }
    }
}

impl ReportOptions {
    /// Summary and categorised lists only.
    pub fn summary_only() -> Self {
        Self {
            include_analysis: false,
            include_predictions: false,
            include_recommendations: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub blocked: usize,
    pub overall_progress: Percentage,
    pub current_focus: Option<MilestoneId>,
}

/// Flat view of one milestone inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSnapshot {
    pub id: MilestoneId,
    pub name: String,
    pub status: MilestoneStatus,
    pub progress: Percentage,
    pub blockers: Vec<String>,
}

impl From<&Milestone> for MilestoneSnapshot {
    fn from(m: &Milestone) -> Self {
        Self {
            id: m.id().clone(),
            name: m.name().to_string(),
            status: m.status(),
            progress: m.progress(),
            blockers: m.blockers().iter().map(|b| b.description.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    pub critical_path: CriticalPath,
    pub bottlenecks: Vec<Bottleneck>,
    pub efficiency: Option<f64>,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for RecommendationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ResolveBlockers,
    ReviewEstimates,
    ShortenCriticalPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecommendation {
    pub kind: RecommendationKind,
    pub priority: RecommendationPriority,
    pub message: String,
    pub milestones: Vec<MilestoneId>,
}

/// Point-in-time report over a progress graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub task_id: TaskId,
    pub generated_at: Timestamp,
    pub summary: ProgressSummary,
    pub completed: Vec<MilestoneSnapshot>,
    pub in_progress: Vec<MilestoneSnapshot>,
    pub pending: Vec<MilestoneSnapshot>,
    pub blocked: Vec<MilestoneSnapshot>,
    pub analysis: Option<ProgressAnalysis>,
    pub predictions: Option<CompletionForecast>,
    pub recommendations: Vec<ProgressRecommendation>,
}

impl ProgressReport {
    pub fn generate(graph: &ProgressGraph, options: ReportOptions, now: Timestamp) -> Self {
        let by_status = |status: MilestoneStatus| -> Vec<MilestoneSnapshot> {
            graph
                .milestones()
                .iter()
                .filter(|m| m.status() == status)
                .map(MilestoneSnapshot::from)
                .collect()
        };
        let blocked: Vec<MilestoneSnapshot> = graph.blocked().map(MilestoneSnapshot::from).collect();

        let summary = ProgressSummary {
            total: graph.milestones().len(),
            completed: graph.count_with_status(MilestoneStatus::Completed),
            in_progress: graph.count_with_status(MilestoneStatus::InProgress),
            pending: graph.count_with_status(MilestoneStatus::Pending),
            blocked: blocked.len(),
            overall_progress: graph.overall_progress(),
            current_focus: graph.current_focus().cloned(),
        };

        let analysis = options.include_analysis.then(|| ProgressAnalysis {
            critical_path: critical_path(graph),
            bottlenecks: bottlenecks(graph),
            efficiency: efficiency(graph),
            trend: trend(graph),
        });
        let predictions = options.include_predictions.then(|| forecast(graph, now));
        let recommendations = if options.include_recommendations {
            recommendations(graph, now)
        } else {
            Vec::new()
        };

        Self {
            task_id: graph.task_id().clone(),
            generated_at: now,
            summary,
            completed: by_status(MilestoneStatus::Completed),
            in_progress: by_status(MilestoneStatus::InProgress),
            pending: by_status(MilestoneStatus::Pending),
            blocked,
            analysis,
            predictions,
            recommendations,
        }
    }

    pub fn has_blockers(&self) -> bool {
        !self.blocked.is_empty()
    }
}

fn recommendations(graph: &ProgressGraph, now: Timestamp) -> Vec<ProgressRecommendation> {
    let mut out = Vec::new();

    let blocked: Vec<MilestoneId> = graph.blocked().map(|m| m.id().clone()).collect();
    if !blocked.is_empty() {
        out.push(ProgressRecommendation {
            kind: RecommendationKind::ResolveBlockers,
            priority: RecommendationPriority::High,
            message: format!("Resolve blockers on {} milestone(s)", blocked.len()),
            milestones: blocked,
        });
    }

    let overrunning: Vec<MilestoneId> = graph
        .milestones()
        .iter()
        .filter(|m| m.is_overrunning(now, OVERRUN_FACTOR))
        .map(|m| m.id().clone())
        .collect();
    if !overrunning.is_empty() {
        out.push(ProgressRecommendation {
            kind: RecommendationKind::ReviewEstimates,
            priority: RecommendationPriority::Medium,
            message: format!(
                "{} milestone(s) running past {}x their estimate",
                overrunning.len(),
                OVERRUN_FACTOR
            ),
            milestones: overrunning,
        });
    }

    let path = critical_path(graph);
    if path.len() > LONG_CHAIN_THRESHOLD {
        out.push(ProgressRecommendation {
            kind: RecommendationKind::ShortenCriticalPath,
            priority: RecommendationPriority::Medium,
            message: format!(
                "Dependency chain of {} milestones; consider parallelising",
                path.len()
            ),
            milestones: path.milestones,
        });
    }

    out
}
