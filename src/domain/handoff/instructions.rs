//! Handoff instructions and the protocol wrapping them.

use serde::{Deserialize, Serialize};

use crate::domain::context::{
    CommunicationContext, ComplexityLevel, ExperienceLevel, Urgency,
};
use crate::domain::foundation::{ActionId, TaskId, Timestamp, UserId};
use crate::domain::task::{TaskResult, TaskStatus, TaskType};

use super::{
    continuation_options, generate_next_actions, sort_actions, validation_steps,
    ContinuationOption, NextAction, Priority, ValidationStep,
};

/// Tasks slower than this get a recommendation to split similar work.
pub const SLOW_TASK_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffRecommendation {
    pub priority: Priority,
    pub message: String,
}

impl HandoffRecommendation {
    fn new(priority: Priority, message: impl Into<String>) -> Self {
        Self {
            priority,
            message: message.into(),
        }
    }
}

/// The parts of a task result a handoff needs to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub successful: bool,
    pub output_keys: Vec<String>,
    pub change_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub duration_ms: Option<u64>,
}

impl TaskSnapshot {
    pub fn of(task: &TaskResult) -> Self {
        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            task_type: task.task_type(),
            successful: task.is_successful(),
            output_keys: task.outputs().iter().map(|o| o.key.clone()).collect(),
            change_count: task.changes().len(),
            error_count: task.errors().len(),
            warning_count: task.warnings().len(),
            duration_ms: task.duration_ms,
        }
    }

    pub fn has_outputs(&self) -> bool {
        !self.output_keys.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffInstructions {
    pub task: TaskSnapshot,
    pub next_actions: Vec<NextAction>,
    pub validation_steps: Vec<ValidationStep>,
    pub continuation_options: Vec<ContinuationOption>,
    pub recommendations: Vec<HandoffRecommendation>,
    pub created_at: Timestamp,
}

impl HandoffInstructions {
    /// Builds instructions for `task`, generating next actions unless some
    /// are provided.
    pub fn create(
        task: &TaskResult,
        provided_actions: Option<Vec<NextAction>>,
        urgency: Urgency,
        now: Timestamp,
    ) -> Self {
        let next_actions = match provided_actions {
            Some(mut actions) => {
                sort_actions(&mut actions);
                actions
            }
            None => generate_next_actions(task),
        };
        Self {
            task: TaskSnapshot::of(task),
            next_actions,
            validation_steps: validation_steps(task),
            continuation_options: continuation_options(task.task_type()),
            recommendations: recommendations(task, urgency),
            created_at: now,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task.task_id
    }

    pub fn critical_actions(&self) -> impl Iterator<Item = &NextAction> {
        self.next_actions
            .iter()
            .filter(|a| a.priority == Priority::Critical)
    }
}

/// Success or failure guidance, then urgency, warnings and duration notes.
pub fn recommendations(task: &TaskResult, urgency: Urgency) -> Vec<HandoffRecommendation> {
    let mut recs = Vec::new();

    if task.is_successful() {
        recs.push(HandoffRecommendation::new(
            Priority::Low,
            "Task completed successfully. Review the results before building on them.",
        ));
    } else {
        recs.push(HandoffRecommendation::new(
            Priority::High,
            format!(
                "Resolve the {} reported error(s) before continuing.",
                task.errors().len().max(1)
            ),
        ));
    }

    if urgency >= Urgency::High {
        recs.push(HandoffRecommendation::new(
            Priority::High,
            "Time is short. Start with the highest priority actions.",
        ));
    }

    if !task.warnings().is_empty() {
        recs.push(HandoffRecommendation::new(
            Priority::Medium,
            format!("Address {} warning(s).", task.warnings().len()),
        ));
    }

    if task.duration_ms.is_some_and(|ms| ms > SLOW_TASK_MS) {
        recs.push(HandoffRecommendation::new(
            Priority::Low,
            "The task took over 30 seconds. Consider splitting similar work.",
        ));
    }

    recs
}

/// Who the handoff was pitched at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub task_complexity: ComplexityLevel,
    pub complexity_score: u32,
    pub experience_level: ExperienceLevel,
    pub urgency: Urgency,
    pub user_id: Option<UserId>,
}

impl ContextSnapshot {
    pub fn of(context: &CommunicationContext) -> Self {
        Self {
            task_complexity: context.task_complexity,
            complexity_score: context.complexity_score,
            experience_level: context.experience_level,
            urgency: context.environment.urgency,
            user_id: context.user_id.clone(),
        }
    }
}

/// Instructions plus the context and task state they were produced under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffProtocol {
    pub id: ActionId,
    pub instructions: HandoffInstructions,
    pub context: Option<ContextSnapshot>,
    pub task_state: TaskSnapshot,
    pub created_at: Timestamp,
}

impl HandoffProtocol {
    pub fn new(
        instructions: HandoffInstructions,
        context: Option<&CommunicationContext>,
        now: Timestamp,
    ) -> Self {
        let task_state = instructions.task.clone();
        Self {
            id: ActionId::new(),
            instructions,
            context: context.map(ContextSnapshot::of),
            task_state,
            created_at: now,
        }
    }
}
