//! Response templates and their selection rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::context::ComplexityLevel;
use crate::domain::task::TaskResult;

/// Layout used to compose a task response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTemplate {
    ErrorDetailed,
    DetailedSuccess,
    StandardSuccess,
    SimpleSuccess,
    BasicSuccess,
    ProgressUpdate,
    FeedbackRequest,
    CollaborationRound,
    CollaborationSummary,
    Handoff,
    Fallback,
}

impl ResponseTemplate {
    /// Picks the task template. Failure always wins over complexity.
    pub fn select(task: &TaskResult, complexity: ComplexityLevel) -> Self {
        if !task.is_successful() {
            ResponseTemplate::ErrorDetailed
        } else if complexity == ComplexityLevel::High {
            ResponseTemplate::DetailedSuccess
        } else if task.has_changes_or_outputs() {
            ResponseTemplate::StandardSuccess
        } else if complexity == ComplexityLevel::Low {
            ResponseTemplate::SimpleSuccess
        } else {
            ResponseTemplate::BasicSuccess
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseTemplate::ErrorDetailed => "error_detailed",
            ResponseTemplate::DetailedSuccess => "detailed_success",
            ResponseTemplate::StandardSuccess => "standard_success",
            ResponseTemplate::SimpleSuccess => "simple_success",
            ResponseTemplate::BasicSuccess => "basic_success",
            ResponseTemplate::ProgressUpdate => "progress_update",
            ResponseTemplate::FeedbackRequest => "feedback_request",
            ResponseTemplate::CollaborationRound => "collaboration_round",
            ResponseTemplate::CollaborationSummary => "collaboration_summary",
            ResponseTemplate::Handoff => "handoff",
            ResponseTemplate::Fallback => "fallback",
        }
    }

    pub fn is_task_template(&self) -> bool {
        matches!(
            self,
            ResponseTemplate::ErrorDetailed
                | ResponseTemplate::DetailedSuccess
                | ResponseTemplate::StandardSuccess
                | ResponseTemplate::SimpleSuccess
                | ResponseTemplate::BasicSuccess
        )
    }
}

impl fmt::Display for ResponseTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
