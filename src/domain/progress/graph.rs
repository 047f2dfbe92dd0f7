//! ProgressGraph aggregate - the milestones tracked for one task.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::{Entity, MilestoneId, Percentage, TaskId, Timestamp};

use super::{Milestone, MilestoneSpec, MilestoneStatus, ProgressError};

/// Ordered milestones for a single task.
///
/// `overall_progress` is recomputed after every mutation as the mean of the
/// milestone scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressGraph {
    task_id: TaskId,
    milestones: Vec<Milestone>,
    overall_progress: Percentage,
    current_focus: Option<MilestoneId>,
    created_at: Timestamp,
    last_updated: Timestamp,
}

impl ProgressGraph {
    /// Creates a graph from milestone specs in the given order.
    pub fn new(
        task_id: TaskId,
        specs: Vec<MilestoneSpec>,
        default_estimate: Duration,
        now: Timestamp,
    ) -> Self {
        let milestones = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Milestone::from_spec(i, spec, default_estimate, now))
            .collect();

        let mut graph = Self {
            task_id,
            milestones,
            overall_progress: Percentage::ZERO,
            current_focus: None,
            created_at: now,
            last_updated: now,
        };
        graph.recompute();
        graph
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn milestone(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id() == id)
    }

    pub fn overall_progress(&self) -> Percentage {
        self.overall_progress
    }

    pub fn current_focus(&self) -> Option<&MilestoneId> {
        self.current_focus.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    pub fn count_with_status(&self, status: MilestoneStatus) -> usize {
        self.milestones.iter().filter(|m| m.status() == status).count()
    }

    pub fn blocked(&self) -> impl Iterator<Item = &Milestone> {
        self.milestones.iter().filter(|m| m.is_blocked())
    }

    /// Number of milestones listing `id` as a dependency.
    pub fn dependents_of(&self, id: &MilestoneId) -> usize {
        self.milestones.iter().filter(|m| m.depends_on(id)).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.milestones.is_empty() && self.milestones.iter().all(Milestone::is_completed)
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Sets a milestone's progress. See [`Milestone::set_progress`].
    pub fn update_progress(
        &mut self,
        milestone_id: &MilestoneId,
        progress: f64,
        metadata: HashMap<String, Value>,
        now: Timestamp,
    ) -> Result<(), ProgressError> {
        let milestone = self.milestone_mut(milestone_id)?;
        let started = milestone.status() == MilestoneStatus::Pending;
        if milestone.set_progress(progress, metadata, now) {
            if started && milestone.status() == MilestoneStatus::InProgress {
                self.current_focus = Some(milestone_id.clone());
            }
            self.touch(now);
        }
        Ok(())
    }

    /// Starts a pending milestone and makes it the current focus.
    pub fn start_milestone(
        &mut self,
        milestone_id: &MilestoneId,
        now: Timestamp,
    ) -> Result<(), ProgressError> {
        let milestone = self.milestone_mut(milestone_id)?;
        let changed = milestone
            .start(now)
            .map_err(|e| ProgressError::InvalidTransition(e.to_string()))?;
        if changed {
            self.current_focus = Some(milestone_id.clone());
            self.touch(now);
        }
        Ok(())
    }

    /// Completes a milestone. Completing it again is a no-op.
    pub fn complete_milestone(
        &mut self,
        milestone_id: &MilestoneId,
        now: Timestamp,
    ) -> Result<(), ProgressError> {
        let milestone = self.milestone_mut(milestone_id)?;
        if milestone.complete(now) {
            if self.current_focus.as_ref() == Some(milestone_id) {
                self.current_focus = self
                    .milestones
                    .iter()
                    .find(|m| m.status() == MilestoneStatus::InProgress)
                    .map(|m| m.id().clone());
            }
            self.touch(now);
        }
        Ok(())
    }

    pub fn add_blocker(
        &mut self,
        milestone_id: &MilestoneId,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Result<String, ProgressError> {
        let blocker_id = self.milestone_mut(milestone_id)?.add_blocker(description, now);
        self.touch(now);
        Ok(blocker_id)
    }

    pub fn remove_blocker(
        &mut self,
        milestone_id: &MilestoneId,
        blocker_id: &str,
        now: Timestamp,
    ) -> Result<bool, ProgressError> {
        let removed = self
            .milestone_mut(milestone_id)?
            .remove_blocker(blocker_id, now);
        if removed {
            self.touch(now);
        }
        Ok(removed)
    }

    pub fn is_blocked(&self, milestone_id: &MilestoneId) -> Result<bool, ProgressError> {
        self.milestone(milestone_id)
            .map(Milestone::is_blocked)
            .ok_or_else(|| self.missing(milestone_id))
    }

    /// Runs the real-time sweep over every in-progress milestone.
    ///
    /// Returns the number of milestones that advanced. Sweeps are not caller
    /// activity, so `last_updated` is left alone and idle graphs still age
    /// out.
    pub fn advance_realtime(&mut self, now: Timestamp) -> usize {
        let advanced = self
            .milestones
            .iter_mut()
            .map(|m| m.advance_realtime(now))
            .filter(|changed| *changed)
            .count();
        if advanced > 0 {
            self.recompute();
        }
        advanced
    }

    fn milestone_mut(&mut self, id: &MilestoneId) -> Result<&mut Milestone, ProgressError> {
        let task_id = self.task_id.clone();
        self.milestones
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(ProgressError::MilestoneNotFound {
                task_id,
                milestone_id: id.clone(),
            })
    }

    fn missing(&self, id: &MilestoneId) -> ProgressError {
        ProgressError::MilestoneNotFound {
            task_id: self.task_id.clone(),
            milestone_id: id.clone(),
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.last_updated = now;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.overall_progress = Percentage::mean(self.milestones.iter().map(Milestone::score));
    }
}

impl Entity for ProgressGraph {
    type Id = TaskId;

    fn entity_id(&self) -> &TaskId {
        &self.task_id
    }

    fn last_activity(&self) -> Timestamp {
        self.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_ESTIMATE: Duration = Duration::from_secs(30 * 60);

    fn mid(s: &str) -> MilestoneId {
        MilestoneId::new(s).unwrap()
    }

    fn two_step_graph() -> ProgressGraph {
        ProgressGraph::new(
            TaskId::new("t1").unwrap(),
            vec![
                MilestoneSpec::new("A").with_estimate_minutes(10),
                MilestoneSpec::new("B")
                    .with_estimate_minutes(10)
                    .depends_on(mid("milestone_0")),
            ],
            DEFAULT_ESTIMATE,
            Timestamp::from_unix_secs(1_000),
        )
    }

    #[test]
    fn empty_graph_has_zero_progress() {
        let graph = ProgressGraph::new(
            TaskId::new("t").unwrap(),
            vec![],
            DEFAULT_ESTIMATE,
            Timestamp::now(),
        );
        assert_eq!(graph.overall_progress(), Percentage::ZERO);
        assert!(!graph.is_complete());
    }

    #[test]
    fn complete_then_half_gives_seventy_five() {
        let mut graph = two_step_graph();
        graph
            .complete_milestone(&mid("milestone_0"), Timestamp::now())
            .unwrap();
        graph
            .update_progress(&mid("milestone_1"), 50.0, HashMap::new(), Timestamp::now())
            .unwrap();

        assert_eq!(graph.overall_progress().value(), 75.0);
    }

    #[test]
    fn unknown_milestone_is_not_found() {
        let mut graph = two_step_graph();
        let err = graph
            .update_progress(&mid("nope"), 10.0, HashMap::new(), Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, ProgressError::MilestoneNotFound { .. }));
    }

    #[test]
    fn start_sets_focus() {
        let mut graph = two_step_graph();
        graph
            .start_milestone(&mid("milestone_1"), Timestamp::now())
            .unwrap();
        assert_eq!(graph.current_focus(), Some(&mid("milestone_1")));
    }

    #[test]
    fn starting_completed_milestone_is_invalid_transition() {
        let mut graph = two_step_graph();
        graph
            .complete_milestone(&mid("milestone_0"), Timestamp::now())
            .unwrap();
        let err = graph
            .start_milestone(&mid("milestone_0"), Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidTransition(_)));
    }

    #[test]
    fn completing_focus_moves_to_next_in_progress() {
        let mut graph = two_step_graph();
        let now = Timestamp::now();
        graph.start_milestone(&mid("milestone_1"), now).unwrap();
        graph.start_milestone(&mid("milestone_0"), now).unwrap();
        graph.complete_milestone(&mid("milestone_0"), now).unwrap();
        assert_eq!(graph.current_focus(), Some(&mid("milestone_1")));
    }

    #[test]
    fn blockers_round_trip_through_graph() {
        let mut graph = two_step_graph();
        let id = mid("milestone_0");
        let blocker = graph.add_blocker(&id, "waiting", Timestamp::now()).unwrap();
        assert!(graph.is_blocked(&id).unwrap());
        assert!(graph.remove_blocker(&id, &blocker, Timestamp::now()).unwrap());
        assert!(!graph.is_blocked(&id).unwrap());
    }

    #[test]
    fn dependents_are_counted() {
        let graph = two_step_graph();
        assert_eq!(graph.dependents_of(&mid("milestone_0")), 1);
        assert_eq!(graph.dependents_of(&mid("milestone_1")), 0);
    }

    #[test]
    fn realtime_sweep_touches_only_in_progress() {
        let mut graph = two_step_graph();
        graph
            .start_milestone(&mid("milestone_0"), Timestamp::from_unix_secs(1_000))
            .unwrap();
        let advanced = graph.advance_realtime(Timestamp::from_unix_secs(1_300));
        assert_eq!(advanced, 1);
        assert_eq!(graph.overall_progress().rounded(), 25);
    }

    #[test]
    fn last_activity_tracks_mutations() {
        let mut graph = two_step_graph();
        let later = Timestamp::from_unix_secs(5_000);
        graph.complete_milestone(&mid("milestone_0"), later).unwrap();
        assert_eq!(graph.last_activity(), later);
    }

    #[test]
    fn realtime_sweep_leaves_last_activity() {
        let mut graph = two_step_graph();
        let started = Timestamp::from_unix_secs(1_000);
        graph.start_milestone(&mid("milestone_0"), started).unwrap();

        assert_eq!(graph.advance_realtime(Timestamp::from_unix_secs(1_300)), 1);
        assert_eq!(graph.last_activity(), started);
    }
}
