//! CollaborationSession aggregate.
//!
//! A session walks a reviewer through rounds of feedback on one task
//! result. Each round is classified, turned into an iteration plan and
//! appended; the session then waits for more input or reports it is ready
//! to proceed. Completion is explicit and final.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{Entity, SessionId, StateMachine, Timestamp};
use crate::domain::task::TaskResult;

use super::{
    CollaborationError, CollaborationStatus, FeedbackAnalysis, FeedbackPoint, FeedbackPointInput,
    IterationPlan,
};

const SECS_PER_DAY: f64 = 86_400.0;

/// One processed batch of reviewer answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRound {
    /// 1-based round number.
    pub round: usize,
    pub raw_feedback: BTreeMap<String, String>,
    pub analysis: FeedbackAnalysis,
    pub iteration_plan: IterationPlan,
    pub timestamp: Timestamp,
}

/// How recently a session saw activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Active,
    Slow,
    Stalled,
}

impl Momentum {
    /// Under a day is active, under three is slow.
    pub fn from_idle(idle: Duration) -> Self {
        let days = idle.as_secs_f64() / SECS_PER_DAY;
        if days < 1.0 {
            Momentum::Active
        } else if days < 3.0 {
            Momentum::Slow
        } else {
            Momentum::Stalled
        }
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Momentum::Active => write!(f, "active"),
            Momentum::Slow => write!(f, "slow"),
            Momentum::Stalled => write!(f, "stalled"),
        }
    }
}

/// Final account of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationSummary {
    pub session_id: SessionId,
    pub task_title: String,
    pub duration: Duration,
    pub iterations: usize,
    pub feedback_count: usize,
    pub key_decisions: Vec<String>,
    /// Latest round approvals over answered points, 0.0 to 1.0.
    pub consensus_level: f64,
    pub momentum: Momentum,
    pub completed_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationSession {
    id: SessionId,
    task_result: TaskResult,
    feedback_points: Vec<FeedbackPoint>,
    status: CollaborationStatus,
    rounds: Vec<FeedbackRound>,
    created_at: Timestamp,
    updated_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl CollaborationSession {
    /// Creates a session awaiting its first round of feedback.
    pub fn new(
        id: SessionId,
        task_result: TaskResult,
        points: Vec<FeedbackPointInput>,
        now: Timestamp,
    ) -> Result<Self, CollaborationError> {
        let feedback_points = points
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.normalize(i))
            .collect::<Result<Vec<_>, _>>()?;

        let mut session = Self {
            id,
            task_result,
            feedback_points,
            status: CollaborationStatus::Created,
            rounds: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        session.transition(CollaborationStatus::AwaitingFeedback)?;
        Ok(session)
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn task_result(&self) -> &TaskResult {
        &self.task_result
    }

    pub fn feedback_points(&self) -> &[FeedbackPoint] {
        &self.feedback_points
    }

    pub fn status(&self) -> CollaborationStatus {
        self.status
    }

    pub fn rounds(&self) -> &[FeedbackRound] {
        &self.rounds
    }

    pub fn latest_round(&self) -> Option<&FeedbackRound> {
        self.rounds.last()
    }

    /// Number of processed feedback rounds.
    pub fn iteration_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == CollaborationStatus::Completed
    }

    fn answered_ids(&self) -> HashSet<&str> {
        self.rounds
            .iter()
            .flat_map(|r| r.analysis.responses.iter())
            .map(|r| r.point_id.as_str())
            .collect()
    }

    /// Points no round has answered yet, in session order.
    pub fn pending_points(&self) -> Vec<&FeedbackPoint> {
        let answered = self.answered_ids();
        self.feedback_points
            .iter()
            .filter(|p| !answered.contains(p.id.as_str()))
            .collect()
    }

    pub fn momentum(&self, now: Timestamp) -> Momentum {
        Momentum::from_idle(now.elapsed_since(&self.updated_at))
    }

    // ───────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────

    /// Processes one batch of answers keyed by feedback point id.
    ///
    /// Answers to the session's points are taken in point order, then
    /// answers with unknown keys in key order.
    pub fn process_feedback(
        &mut self,
        answers: HashMap<String, String>,
        now: Timestamp,
    ) -> Result<&FeedbackRound, CollaborationError> {
        if self.is_completed() {
            return Err(CollaborationError::SessionCompleted(self.id.clone()));
        }

        let raw_feedback: BTreeMap<String, String> = answers.into_iter().collect();
        let mut ordered: Vec<(String, String)> = self
            .feedback_points
            .iter()
            .filter_map(|p| raw_feedback.get(&p.id).map(|t| (p.id.clone(), t.clone())))
            .collect();
        ordered.extend(
            raw_feedback
                .iter()
                .filter(|(k, _)| !self.feedback_points.iter().any(|p| &p.id == *k))
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let round_number = self.rounds.len() + 1;
        let analysis = FeedbackAnalysis::analyze(&self.feedback_points, &ordered);
        let iteration_plan = IterationPlan::from_analysis(&analysis, round_number);

        self.feedback_points
            .extend(iteration_plan.new_feedback_points.iter().cloned());
        let has_concerns = !analysis.concerns.is_empty();
        let needs_more = iteration_plan.requires_more_feedback;

        self.rounds.push(FeedbackRound {
            round: round_number,
            raw_feedback,
            analysis,
            iteration_plan,
            timestamp: now,
        });

        let required_open = self.pending_points().iter().any(|p| p.required);
        let next = if needs_more || has_concerns || required_open {
            CollaborationStatus::AwaitingFeedback
        } else {
            CollaborationStatus::ReadyToProceed
        };
        self.transition(next)?;
        self.updated_at = now;

        self.rounds
            .last()
            .ok_or_else(|| CollaborationError::Storage("round was not recorded".into()))
    }

    /// Completes the session and summarises it.
    pub fn complete(&mut self, now: Timestamp) -> Result<CollaborationSummary, CollaborationError> {
        if self.is_completed() {
            return Err(CollaborationError::SessionCompleted(self.id.clone()));
        }
        let momentum = self.momentum(now);
        self.transition(CollaborationStatus::Completed)?;
        self.completed_at = Some(now);
        self.updated_at = now;

        Ok(CollaborationSummary {
            session_id: self.id.clone(),
            task_title: self.task_result.title.clone(),
            duration: now.elapsed_since(&self.created_at),
            iterations: self.iteration_count(),
            feedback_count: self.rounds.iter().map(|r| r.analysis.answered()).sum(),
            key_decisions: self
                .rounds
                .iter()
                .flat_map(|r| r.analysis.high_priority_actions())
                .map(|a| a.text.clone())
                .collect(),
            consensus_level: self
                .latest_round()
                .map(|r| r.analysis.consensus())
                .unwrap_or(0.0),
            momentum,
            completed_at: now,
        })
    }

    fn transition(&mut self, target: CollaborationStatus) -> Result<(), CollaborationError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| CollaborationError::InvalidTransition(e.to_string()))?;
        Ok(())
    }
}

impl Entity for CollaborationSession {
    type Id = SessionId;

    fn entity_id(&self) -> &SessionId {
        &self.id
    }

    fn last_activity(&self) -> Timestamp {
        self.updated_at
    }
}
