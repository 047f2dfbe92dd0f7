//! Milestone entity - one trackable unit of task progress.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{MilestoneId, Percentage, StateMachine, Timestamp, ValidationError};

/// Ceiling for progress set by the real-time sweep.
pub const REALTIME_PROGRESS_CAP: f64 = 90.0;

/// Status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl StateMachine for MilestoneStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MilestoneStatus::*;
        matches!(
            (self, target),
            (Pending, InProgress) | (Pending, Completed) | (InProgress, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MilestoneStatus::*;
        match self {
            Pending => vec![InProgress, Completed],
            InProgress => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Something preventing a milestone from advancing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocker {
    pub id: String,
    pub description: String,
    pub added_at: Timestamp,
}

/// Caller-supplied description of a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSpec {
    #[serde(default)]
    pub id: Option<MilestoneId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_minutes: Option<u64>,
    #[serde(default)]
    pub dependencies: Vec<MilestoneId>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl MilestoneSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            estimated_minutes: None,
            dependencies: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: MilestoneId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_estimate_minutes(mut self, minutes: u64) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn depends_on(mut self, id: MilestoneId) -> Self {
        self.dependencies.push(id);
        self
    }
}

/// A milestone within a progress graph.
///
/// `status == Completed` exactly when `progress == 100`. Every mutator keeps
/// that pairing; there is no way to set one without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    name: String,
    description: String,
    status: MilestoneStatus,
    progress: Percentage,
    estimated_time: Duration,
    actual_time: Option<Duration>,
    dependencies: Vec<MilestoneId>,
    blockers: Vec<Blocker>,
    next_blocker_seq: u32,
    metadata: HashMap<String, Value>,
    created_at: Timestamp,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    updated_at: Timestamp,
}

impl Milestone {
    /// Builds the milestone at position `index` from its spec.
    pub fn from_spec(
        index: usize,
        spec: MilestoneSpec,
        default_estimate: Duration,
        now: Timestamp,
    ) -> Self {
        let estimated_time = spec
            .estimated_minutes
            .map(|m| Duration::from_secs(m.saturating_mul(60)))
            .unwrap_or(default_estimate);

        Self {
            id: spec.id.unwrap_or_else(|| MilestoneId::positional(index)),
            name: spec.name,
            description: spec.description,
            status: MilestoneStatus::Pending,
            progress: Percentage::ZERO,
            estimated_time,
            actual_time: None,
            dependencies: spec.dependencies,
            blockers: Vec::new(),
            next_blocker_seq: 0,
            metadata: spec.metadata,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MilestoneId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> MilestoneStatus {
        self.status
    }

    pub fn progress(&self) -> Percentage {
        self.progress
    }

    pub fn estimated_time(&self) -> Duration {
        self.estimated_time
    }

    pub fn actual_time(&self) -> Option<Duration> {
        self.actual_time
    }

    pub fn dependencies(&self) -> &[MilestoneId] {
        &self.dependencies
    }

    pub fn blockers(&self) -> &[Blocker] {
        &self.blockers
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MilestoneStatus::Completed
    }

    pub fn depends_on(&self, other: &MilestoneId) -> bool {
        self.dependencies.contains(other)
    }

    /// Contribution to overall progress.
    pub fn score(&self) -> Percentage {
        match self.status {
            MilestoneStatus::Completed => Percentage::HUNDRED,
            MilestoneStatus::InProgress => self.progress,
            MilestoneStatus::Pending => Percentage::ZERO,
        }
    }

    /// True when the milestone has been running longer than `factor` times
    /// its estimate.
    pub fn is_overrunning(&self, now: Timestamp, factor: f64) -> bool {
        match (self.status, self.started_at) {
            (MilestoneStatus::InProgress, Some(started)) => {
                now.elapsed_since(&started).as_secs_f64()
                    > self.estimated_time.as_secs_f64() * factor
            }
            _ => false,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Applies a progress update.
    ///
    /// Values are clamped to 0..=100. A positive value starts a pending
    /// milestone and 100 completes it. Completed milestones ignore updates.
    /// Returns whether the milestone changed.
    pub fn set_progress(
        &mut self,
        value: f64,
        metadata: HashMap<String, Value>,
        now: Timestamp,
    ) -> bool {
        if self.is_completed() {
            return false;
        }
        let progress = Percentage::new(value);
        self.metadata.extend(metadata);

        if progress.is_full() {
            return self.complete(now);
        }
        if self.status == MilestoneStatus::Pending && progress.value() > 0.0 {
            self.status = MilestoneStatus::InProgress;
            self.started_at = Some(now);
        }
        self.progress = progress;
        self.updated_at = now;
        true
    }

    /// Moves a pending milestone to in-progress.
    ///
    /// Starting an in-progress milestone is a no-op returning `false`.
    pub fn start(&mut self, now: Timestamp) -> Result<bool, ValidationError> {
        if self.status == MilestoneStatus::InProgress {
            return Ok(false);
        }
        self.status = self.status.transition_to(MilestoneStatus::InProgress)?;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(true)
    }

    /// Completes the milestone. A second call changes nothing.
    pub fn complete(&mut self, now: Timestamp) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = MilestoneStatus::Completed;
        self.progress = Percentage::HUNDRED;
        self.completed_at = Some(now);
        self.actual_time = self.started_at.map(|started| now.elapsed_since(&started));
        self.updated_at = now;
        true
    }

    /// Adds a blocker and returns its id.
    pub fn add_blocker(&mut self, description: impl Into<String>, now: Timestamp) -> String {
        let id = format!("blocker_{}", self.next_blocker_seq);
        self.next_blocker_seq += 1;
        self.blockers.push(Blocker {
            id: id.clone(),
            description: description.into(),
            added_at: now,
        });
        self.updated_at = now;
        id
    }

    /// Removes a blocker by id, returning whether it existed.
    pub fn remove_blocker(&mut self, blocker_id: &str, now: Timestamp) -> bool {
        let before = self.blockers.len();
        self.blockers.retain(|b| b.id != blocker_id);
        let removed = self.blockers.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Advances an in-progress milestone toward its time-based estimate.
    ///
    /// Never lowers progress and never exceeds [`REALTIME_PROGRESS_CAP`].
    pub fn advance_realtime(&mut self, now: Timestamp) -> bool {
        let started = match (self.status, self.started_at) {
            (MilestoneStatus::InProgress, Some(started)) => started,
            _ => return false,
        };
        let estimate = self.estimated_time.as_secs_f64();
        if estimate <= 0.0 {
            return false;
        }
        let elapsed = now.elapsed_since(&started).as_secs_f64();
        let target = (elapsed / estimate * 100.0).min(REALTIME_PROGRESS_CAP);
        if target <= self.progress.value() {
            return false;
        }
        self.progress = Percentage::new(target);
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THIRTY_MIN: Duration = Duration::from_secs(30 * 60);

    fn milestone() -> Milestone {
        Milestone::from_spec(
            0,
            MilestoneSpec::new("Design").with_estimate_minutes(10),
            THIRTY_MIN,
            Timestamp::from_unix_secs(1_000),
        )
    }

    mod construction {
        use super::*;

        #[test]
        fn positional_id_when_spec_has_none() {
            let m = milestone();
            assert_eq!(m.id().as_str(), "milestone_0");
            assert_eq!(m.status(), MilestoneStatus::Pending);
            assert_eq!(m.estimated_time(), Duration::from_secs(600));
        }

        #[test]
        fn default_estimate_applies_when_missing() {
            let m = Milestone::from_spec(
                3,
                MilestoneSpec::new("Ship"),
                THIRTY_MIN,
                Timestamp::now(),
            );
            assert_eq!(m.estimated_time(), THIRTY_MIN);
            assert_eq!(m.id().as_str(), "milestone_3");
        }
    }

    mod status_machine {
        use super::*;

        #[test]
        fn completed_is_terminal() {
            assert!(MilestoneStatus::Completed.is_terminal());
            assert!(MilestoneStatus::Pending.can_transition_to(&MilestoneStatus::Completed));
            assert!(!MilestoneStatus::Completed.can_transition_to(&MilestoneStatus::InProgress));
        }
    }

    mod progress_updates {
        use super::*;

        #[test]
        fn positive_progress_starts_pending_milestone() {
            let mut m = milestone();
            let now = Timestamp::from_unix_secs(1_100);
            assert!(m.set_progress(40.0, HashMap::new(), now));
            assert_eq!(m.status(), MilestoneStatus::InProgress);
            assert_eq!(m.started_at(), Some(now));
        }

        #[test]
        fn values_are_clamped() {
            let mut m = milestone();
            m.set_progress(-5.0, HashMap::new(), Timestamp::now());
            assert_eq!(m.progress(), Percentage::ZERO);
            assert_eq!(m.status(), MilestoneStatus::Pending);

            m.set_progress(150.0, HashMap::new(), Timestamp::now());
            assert_eq!(m.progress(), Percentage::HUNDRED);
            assert_eq!(m.status(), MilestoneStatus::Completed);
        }

        #[test]
        fn completed_milestone_ignores_updates() {
            let mut m = milestone();
            m.complete(Timestamp::now());
            assert!(!m.set_progress(10.0, HashMap::new(), Timestamp::now()));
            assert_eq!(m.progress(), Percentage::HUNDRED);
        }
    }

    mod completion {
        use super::*;

        #[test]
        fn complete_is_idempotent() {
            let mut m = milestone();
            let first = Timestamp::from_unix_secs(2_000);
            assert!(m.complete(first));
            assert!(!m.complete(Timestamp::from_unix_secs(3_000)));
            assert_eq!(m.completed_at(), Some(first));
            assert_eq!(m.progress(), Percentage::HUNDRED);
        }

        #[test]
        fn actual_time_derives_from_start() {
            let mut m = milestone();
            m.start(Timestamp::from_unix_secs(1_000)).unwrap();
            m.complete(Timestamp::from_unix_secs(1_300));
            assert_eq!(m.actual_time(), Some(Duration::from_secs(300)));
        }

        #[test]
        fn starting_completed_milestone_fails() {
            let mut m = milestone();
            m.complete(Timestamp::now());
            assert!(m.start(Timestamp::now()).is_err());
        }

        #[test]
        fn starting_twice_is_noop() {
            let mut m = milestone();
            assert!(m.start(Timestamp::now()).unwrap());
            assert!(!m.start(Timestamp::now()).unwrap());
        }
    }

    mod blockers {
        use super::*;

        #[test]
        fn add_and_remove_by_id() {
            let mut m = milestone();
            let first = m.add_blocker("waiting on API key", Timestamp::now());
            let second = m.add_blocker("review pending", Timestamp::now());
            assert_ne!(first, second);
            assert!(m.is_blocked());

            assert!(m.remove_blocker(&first, Timestamp::now()));
            assert!(!m.remove_blocker(&first, Timestamp::now()));
            assert_eq!(m.blockers().len(), 1);
        }
    }

    mod realtime {
        use super::*;

        #[test]
        fn advances_toward_elapsed_ratio() {
            let mut m = milestone();
            m.start(Timestamp::from_unix_secs(1_000)).unwrap();
            // 5 of 10 minutes elapsed
            assert!(m.advance_realtime(Timestamp::from_unix_secs(1_300)));
            assert_eq!(m.progress().rounded(), 50);
        }

        #[test]
        fn caps_at_ninety_and_never_completes() {
            let mut m = milestone();
            m.start(Timestamp::from_unix_secs(1_000)).unwrap();
            m.advance_realtime(Timestamp::from_unix_secs(100_000));
            assert_eq!(m.progress().value(), REALTIME_PROGRESS_CAP);
            assert_eq!(m.status(), MilestoneStatus::InProgress);
        }

        #[test]
        fn never_lowers_progress() {
            let mut m = milestone();
            m.start(Timestamp::from_unix_secs(1_000)).unwrap();
            m.set_progress(80.0, HashMap::new(), Timestamp::from_unix_secs(1_010));
            assert!(!m.advance_realtime(Timestamp::from_unix_secs(1_060)));
            assert_eq!(m.progress().value(), 80.0);
        }

        #[test]
        fn pending_milestones_are_untouched() {
            let mut m = milestone();
            assert!(!m.advance_realtime(Timestamp::from_unix_secs(100_000)));
        }
    }
}
