//! Read-only analysis over a progress graph.
//!
//! Dependencies are not validated acyclic when a graph is created, so every
//! traversal here keeps a per-path visited set and skips back-edges.
//! Unknown dependency ids are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{MilestoneId, Timestamp};

use super::{Milestone, MilestoneStatus, ProgressGraph};

/// Number of recent completions compared against the earlier ones.
const TREND_WINDOW: usize = 3;

// ════════════════════════════════════════════════════════════════════════════════
// Critical path
// ════════════════════════════════════════════════════════════════════════════════

/// Longest dependency chain in the graph, ordered from the deepest
/// dependency to the milestone that depends on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CriticalPath {
    pub milestones: Vec<MilestoneId>,
    pub total_estimate: Duration,
}

impl CriticalPath {
    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }
}

/// Finds the longest dependency chain.
///
/// Ties on length go to the larger total estimate, then to the chain ending
/// at the earlier milestone.
pub fn critical_path(graph: &ProgressGraph) -> CriticalPath {
    let mut best: Vec<&Milestone> = Vec::new();
    for milestone in graph.milestones() {
        let mut on_path = HashSet::new();
        let chain = longest_chain(graph, milestone, &mut on_path);
        if is_longer(&chain, &best) {
            best = chain;
        }
    }

    CriticalPath {
        total_estimate: total_estimate(&best),
        milestones: best.iter().map(|m| m.id().clone()).collect(),
    }
}

fn longest_chain<'a>(
    graph: &'a ProgressGraph,
    milestone: &'a Milestone,
    on_path: &mut HashSet<&'a MilestoneId>,
) -> Vec<&'a Milestone> {
    on_path.insert(milestone.id());

    let mut best: Vec<&Milestone> = Vec::new();
    for dep_id in milestone.dependencies() {
        if on_path.contains(dep_id) {
            continue;
        }
        let Some(dep) = graph.milestone(dep_id) else {
            continue;
        };
        let chain = longest_chain(graph, dep, on_path);
        if is_longer(&chain, &best) {
            best = chain;
        }
    }

    on_path.remove(milestone.id());
    best.push(milestone);
    best
}

fn is_longer(candidate: &[&Milestone], current: &[&Milestone]) -> bool {
    candidate.len() > current.len()
        || (candidate.len() == current.len()
            && total_estimate(candidate) > total_estimate(current))
}

fn total_estimate(chain: &[&Milestone]) -> Duration {
    saturating_sum(chain.iter().map(|m| m.estimated_time()))
}

fn saturating_sum(durations: impl Iterator<Item = Duration>) -> Duration {
    durations.fold(Duration::ZERO, Duration::saturating_add)
}

// ════════════════════════════════════════════════════════════════════════════════
// Bottlenecks
// ════════════════════════════════════════════════════════════════════════════════

/// A milestone holding up others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub milestone_id: MilestoneId,
    pub name: String,
    pub dependents: usize,
    pub blocked: bool,
}

/// Incomplete milestones with two or more dependents, and blocked
/// milestones with at least one.
pub fn bottlenecks(graph: &ProgressGraph) -> Vec<Bottleneck> {
    graph
        .milestones()
        .iter()
        .filter(|m| !m.is_completed())
        .filter_map(|m| {
            let dependents = graph.dependents_of(m.id());
            let blocked = m.is_blocked();
            if dependents >= 2 || (blocked && dependents >= 1) {
                Some(Bottleneck {
                    milestone_id: m.id().clone(),
                    name: m.name().to_string(),
                    dependents,
                    blocked,
                })
            } else {
                None
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Efficiency and trend
// ════════════════════════════════════════════════════════════════════════════════

fn timed_completions(graph: &ProgressGraph) -> Vec<&Milestone> {
    let mut done: Vec<&Milestone> = graph
        .milestones()
        .iter()
        .filter(|m| m.is_completed() && m.actual_time().is_some())
        .collect();
    done.sort_by_key(|m| m.completed_at());
    done
}

/// Σestimated / Σactual × 100 over completed milestones with a recorded
/// actual time. `None` without samples.
pub fn efficiency(graph: &ProgressGraph) -> Option<f64> {
    let done = timed_completions(graph);
    if done.is_empty() {
        return None;
    }
    let estimated: f64 = done.iter().map(|m| m.estimated_time().as_secs_f64()).sum();
    let actual: f64 = done
        .iter()
        .filter_map(|m| m.actual_time())
        .map(|d| d.as_secs_f64())
        .sum();
    if actual <= 0.0 {
        return Some(100.0);
    }
    Some(estimated / actual * 100.0)
}

/// Direction of recent completion times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
            Trend::InsufficientData => "insufficient_data",
        };
        write!(f, "{}", s)
    }
}

/// Compares the average actual time of the three most recent completions
/// against the earlier ones.
pub fn trend(graph: &ProgressGraph) -> Trend {
    let done = timed_completions(graph);
    if done.len() <= TREND_WINDOW {
        return Trend::InsufficientData;
    }
    let (earlier, recent) = done.split_at(done.len() - TREND_WINDOW);
    let earlier_avg = average_actual_secs(earlier);
    let recent_avg = average_actual_secs(recent);
    if earlier_avg <= 0.0 {
        return Trend::Stable;
    }

    let ratio = recent_avg / earlier_avg;
    if ratio < 0.9 {
        Trend::Improving
    } else if ratio > 1.1 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn average_actual_secs(milestones: &[&Milestone]) -> f64 {
    let total: f64 = milestones
        .iter()
        .filter_map(|m| m.actual_time())
        .map(|d| d.as_secs_f64())
        .sum();
    total / milestones.len() as f64
}

// ════════════════════════════════════════════════════════════════════════════════
// Forecast
// ════════════════════════════════════════════════════════════════════════════════

/// How much history backs a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Estimated time to finish the remaining milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionForecast {
    pub remaining: Duration,
    pub estimated_completion: Timestamp,
    pub confidence: Confidence,
    /// avg actual / avg estimated over completed samples.
    pub accuracy_ratio: Option<f64>,
    pub samples: usize,
}

/// Forecasts completion from the remaining estimates, scaled by how
/// accurate past estimates were.
pub fn forecast(graph: &ProgressGraph, now: Timestamp) -> CompletionForecast {
    let raw_remaining = saturating_sum(
        graph
            .milestones()
            .iter()
            .filter(|m| {
                matches!(
                    m.status(),
                    MilestoneStatus::Pending | MilestoneStatus::InProgress
                )
            })
            .map(|m| m.estimated_time()),
    );

    let done = timed_completions(graph);
    let samples = done.len();
    if samples == 0 {
        return CompletionForecast {
            remaining: raw_remaining,
            estimated_completion: now.plus(raw_remaining),
            confidence: Confidence::Low,
            accuracy_ratio: None,
            samples,
        };
    }

    let avg_actual = average_actual_secs(&done);
    let avg_estimated = done
        .iter()
        .map(|m| m.estimated_time().as_secs_f64())
        .sum::<f64>()
        / samples as f64;
    let ratio = if avg_estimated > 0.0 {
        avg_actual / avg_estimated
    } else {
        1.0
    };

    let remaining =
        Duration::try_from_secs_f64(raw_remaining.as_secs_f64() * ratio).unwrap_or(Duration::MAX);
    CompletionForecast {
        remaining,
        estimated_completion: now.plus(remaining),
        confidence: if samples >= 3 {
            Confidence::High
        } else {
            Confidence::Medium
        },
        accuracy_ratio: Some(ratio),
        samples,
    }
}
