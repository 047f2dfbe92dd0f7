//! HandoffPlanner - next steps for whoever picks up a finished task.
//!
//! Plans are derived artifacts: the planner keeps a bounded record of what
//! it produced and running statistics, nothing else.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::context::{CommunicationContext, Urgency};
use crate::domain::foundation::{ActionId, TaskId, Timestamp};
use crate::domain::handoff::{
    generate_next_actions, validate_instructions, validate_protocol, CompletenessReport,
    HandoffInstructions, HandoffProtocol, NextAction,
};
use crate::domain::task::TaskResult;

use super::history::{BoundedHistory, DEFAULT_CAPACITY, DEFAULT_TRIM_TO};

/// What the planner remembers about one handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffRecord {
    pub task_id: TaskId,
    /// Set when the handoff was a full protocol.
    pub protocol_id: Option<ActionId>,
    pub successful: bool,
    pub next_actions: usize,
    pub critical_actions: usize,
    pub validation_steps: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandoffStatistics {
    pub total_handoffs: u64,
    pub protocols: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    pub critical_actions: u64,
    pub average_next_actions: f64,
}

impl HandoffStatistics {
    fn record(&mut self, record: &HandoffRecord) {
        self.total_handoffs += 1;
        if record.protocol_id.is_some() {
            self.protocols += 1;
        }
        if record.successful {
            self.successful_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }
        self.critical_actions += record.critical_actions as u64;
        let n = self.total_handoffs as f64;
        self.average_next_actions += (record.next_actions as f64 - self.average_next_actions) / n;
    }
}

pub struct HandoffPlanner {
    history: RwLock<BoundedHistory<HandoffRecord>>,
    statistics: RwLock<HandoffStatistics>,
}

impl Default for HandoffPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TRIM_TO)
    }
}

impl HandoffPlanner {
    pub fn new(history_capacity: usize, history_trim_to: usize) -> Self {
        Self {
            history: RwLock::new(BoundedHistory::new(history_capacity, history_trim_to)),
            statistics: RwLock::new(HandoffStatistics::default()),
        }
    }

    /// Prioritised follow-up actions for `task`.
    pub fn generate_next_actions(&self, task: &TaskResult) -> Vec<NextAction> {
        generate_next_actions(task)
    }

    /// Builds instructions, generating next actions unless `provided`.
    pub async fn create_handoff_instructions(
        &self,
        task: &TaskResult,
        provided: Option<Vec<NextAction>>,
        context: Option<&CommunicationContext>,
    ) -> HandoffInstructions {
        let urgency = context
            .map(|c| c.environment.urgency)
            .unwrap_or(Urgency::Normal);
        let instructions = HandoffInstructions::create(task, provided, urgency, Timestamp::now());
        self.record(&instructions, None, task.is_successful()).await;
        instructions
    }

    /// Builds instructions and wraps them with the context and task state.
    pub async fn create_handoff_protocol(
        &self,
        task: &TaskResult,
        context: Option<&CommunicationContext>,
    ) -> HandoffProtocol {
        let now = Timestamp::now();
        let urgency = context
            .map(|c| c.environment.urgency)
            .unwrap_or(Urgency::Normal);
        let instructions = HandoffInstructions::create(task, None, urgency, now);
        let protocol = HandoffProtocol::new(instructions, context, now);
        self.record(
            &protocol.instructions,
            Some(protocol.id),
            task.is_successful(),
        )
        .await;
        protocol
    }

    pub fn validate_handoff_completeness(
        &self,
        instructions: &HandoffInstructions,
    ) -> CompletenessReport {
        validate_instructions(instructions)
    }

    /// Like [`Self::validate_handoff_completeness`], also requiring context.
    pub fn validate_protocol_completeness(&self, protocol: &HandoffProtocol) -> CompletenessReport {
        validate_protocol(protocol)
    }

    /// The `limit` most recent handoffs, oldest first.
    pub async fn history(&self, limit: usize) -> Vec<HandoffRecord> {
        self.history.read().await.recent(limit)
    }

    pub async fn statistics(&self) -> HandoffStatistics {
        self.statistics.read().await.clone()
    }

    /// Drops history entries recorded before `cutoff`. Statistics are kept.
    pub async fn cleanup(&self, cutoff: Timestamp) -> usize {
        self.history.write().await.remove_older_than(cutoff)
    }

    async fn record(
        &self,
        instructions: &HandoffInstructions,
        protocol_id: Option<ActionId>,
        successful: bool,
    ) {
        let record = HandoffRecord {
            task_id: instructions.task_id().clone(),
            protocol_id,
            successful,
            next_actions: instructions.next_actions.len(),
            critical_actions: instructions.critical_actions().count(),
            validation_steps: instructions.validation_steps.len(),
        };
        tracing::debug!(
            task_id = %record.task_id,
            next_actions = record.next_actions,
            protocol = record.protocol_id.is_some(),
            "handoff planned"
        );
        self.statistics.write().await.record(&record);
        self.history
            .write()
            .await
            .push(instructions.created_at, record);
    }
}
