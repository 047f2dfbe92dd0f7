//! Iteration plans derived from analysed feedback.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::classifier::{effort, ActionPriority};
use super::{FeedbackAnalysis, FeedbackPoint};

/// More concerns than this make a plan high priority.
const HIGH_PRIORITY_CONCERNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPriority {
    High,
    Medium,
    Normal,
}

impl fmt::Display for PlanPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanPriority::High => write!(f, "high"),
            PlanPriority::Medium => write!(f, "medium"),
            PlanPriority::Normal => write!(f, "normal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedChange {
    pub description: String,
    pub source_point: String,
    pub priority: ActionPriority,
    /// 1 (trivial) to 5 (major).
    pub effort: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedValidation {
    pub description: String,
    pub source_point: String,
}

/// What the agent will do before the next round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationPlan {
    pub changes: Vec<PlannedChange>,
    pub validations: Vec<PlannedValidation>,
    pub new_feedback_points: Vec<FeedbackPoint>,
    pub requires_more_feedback: bool,
    pub priority: PlanPriority,
}

impl IterationPlan {
    /// Builds the plan for round `round` (1-based).
    pub fn from_analysis(analysis: &FeedbackAnalysis, round: usize) -> Self {
        let changes = analysis
            .action_items
            .iter()
            .map(|item| PlannedChange {
                description: item.text.clone(),
                source_point: item.point_id.clone(),
                priority: item.priority,
                effort: effort(&item.text),
            })
            .collect();

        let validations = analysis
            .concerns
            .iter()
            .map(|concern| PlannedValidation {
                description: format!("Confirm concern is resolved: {}", concern.text),
                source_point: concern.point_id.clone(),
            })
            .collect();

        let new_feedback_points: Vec<FeedbackPoint> = analysis
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| FeedbackPoint::confirmation(format!("fp_r{}_{}", round, i), &s.text))
            .collect();

        let priority = match analysis.concerns.len() {
            n if n > HIGH_PRIORITY_CONCERNS => PlanPriority::High,
            0 => PlanPriority::Normal,
            _ => PlanPriority::Medium,
        };

        Self {
            changes,
            validations,
            requires_more_feedback: !new_feedback_points.is_empty(),
            new_feedback_points,
            priority,
        }
    }

    /// Sum of change effort points.
    pub fn total_effort(&self) -> u32 {
        self.changes.iter().map(|c| c.effort as u32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(pairs: &[(&str, &str)]) -> FeedbackAnalysis {
        let answers: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FeedbackAnalysis::analyze(&[], &answers)
    }

    #[test]
    fn approval_only_needs_no_more_feedback() {
        let plan = IterationPlan::from_analysis(&analyze(&[("fp0", "yes looks great")]), 1);
        assert!(!plan.requires_more_feedback);
        assert!(plan.changes.is_empty());
        assert_eq!(plan.priority, PlanPriority::Normal);
    }

    #[test]
    fn suggestions_produce_confirmation_points() {
        let plan = IterationPlan::from_analysis(
            &analyze(&[("fp0", "consider a cache"), ("fp1", "how about paging")]),
            2,
        );
        assert!(plan.requires_more_feedback);
        let ids: Vec<_> = plan.new_feedback_points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["fp_r2_0", "fp_r2_1"]);
    }

    #[test]
    fn changes_carry_effort() {
        let plan = IterationPlan::from_analysis(
            &analyze(&[("fp0", "add a retry"), ("fp1", "major overhaul needed")]),
            1,
        );
        assert_eq!(plan.changes.len(), 2);
        assert_eq!(plan.total_effort(), 8);
    }

    #[test]
    fn priority_scales_with_concerns() {
        let one = IterationPlan::from_analysis(&analyze(&[("a", "wrong")]), 1);
        assert_eq!(one.priority, PlanPriority::Medium);
        assert_eq!(one.validations.len(), 1);

        let three = IterationPlan::from_analysis(
            &analyze(&[("a", "wrong"), ("b", "bad"), ("c", "unsure")]),
            1,
        );
        assert_eq!(three.priority, PlanPriority::High);
    }
}
