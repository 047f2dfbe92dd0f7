//! ProgressTracker - milestone graphs for running tasks.
//!
//! Each operation loads the task's graph, applies one mutation or read and
//! saves it back. There is no per-task locking; concurrent writers to the
//! same task race and the last save wins.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{MilestoneId, TaskId, Timestamp};
use crate::domain::progress::{
    analysis, Bottleneck, CompletionForecast, CriticalPath, MilestoneSpec, ProgressError,
    ProgressGraph, ProgressReport, ReportOptions, Trend,
};
use crate::ports::ProgressRepository;

/// Estimate given to milestones whose spec has none.
pub const DEFAULT_ESTIMATE: Duration = Duration::from_secs(30 * 60);

pub struct ProgressTracker {
    repository: Arc<dyn ProgressRepository>,
    default_estimate: Duration,
}

impl ProgressTracker {
    pub fn new(repository: Arc<dyn ProgressRepository>) -> Self {
        Self {
            repository,
            default_estimate: DEFAULT_ESTIMATE,
        }
    }

    pub fn with_default_estimate(mut self, estimate: Duration) -> Self {
        self.default_estimate = estimate;
        self
    }

    /// Creates the graph for `task_id`, replacing any existing one.
    pub async fn initialize_progress(
        &self,
        task_id: TaskId,
        specs: Vec<MilestoneSpec>,
    ) -> Result<ProgressGraph, ProgressError> {
        let graph = ProgressGraph::new(task_id, specs, self.default_estimate, Timestamp::now());
        self.repository.save(&graph).await?;
        tracing::info!(
            task_id = %graph.task_id(),
            milestones = graph.milestones().len(),
            "progress initialized"
        );
        Ok(graph)
    }

    pub async fn get_progress(&self, task_id: &TaskId) -> Result<ProgressGraph, ProgressError> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ProgressError::TaskNotFound(task_id.clone()))
    }

    pub async fn update_milestone_progress(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        progress: f64,
        metadata: HashMap<String, Value>,
    ) -> Result<ProgressGraph, ProgressError> {
        self.mutate(task_id, |graph, now| {
            graph.update_progress(milestone_id, progress, metadata, now)
        })
        .await
    }

    pub async fn start_milestone(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
    ) -> Result<ProgressGraph, ProgressError> {
        self.mutate(task_id, |graph, now| graph.start_milestone(milestone_id, now))
            .await
    }

    pub async fn complete_milestone(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
    ) -> Result<ProgressGraph, ProgressError> {
        let graph = self
            .mutate(task_id, |graph, now| graph.complete_milestone(milestone_id, now))
            .await?;
        tracing::debug!(
            task_id = %task_id,
            milestone_id = %milestone_id,
            overall = graph.overall_progress().value(),
            "milestone completed"
        );
        Ok(graph)
    }

    /// Adds a blocker and returns its id.
    pub async fn add_blocker(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        description: impl Into<String>,
    ) -> Result<String, ProgressError> {
        let mut graph = self.get_progress(task_id).await?;
        let blocker_id = graph.add_blocker(milestone_id, description, Timestamp::now())?;
        self.repository.save(&graph).await?;
        Ok(blocker_id)
    }

    /// Removes a blocker, returning whether it existed.
    pub async fn remove_blocker(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        blocker_id: &str,
    ) -> Result<bool, ProgressError> {
        let mut graph = self.get_progress(task_id).await?;
        let removed = graph.remove_blocker(milestone_id, blocker_id, Timestamp::now())?;
        if removed {
            self.repository.save(&graph).await?;
        }
        Ok(removed)
    }

    pub async fn is_blocked(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
    ) -> Result<bool, ProgressError> {
        self.get_progress(task_id).await?.is_blocked(milestone_id)
    }

    // ───────────────────────────────────────────────────────────────
    // Analysis
    // ───────────────────────────────────────────────────────────────

    pub async fn critical_path(&self, task_id: &TaskId) -> Result<CriticalPath, ProgressError> {
        Ok(analysis::critical_path(&self.get_progress(task_id).await?))
    }

    pub async fn bottlenecks(&self, task_id: &TaskId) -> Result<Vec<Bottleneck>, ProgressError> {
        Ok(analysis::bottlenecks(&self.get_progress(task_id).await?))
    }

    /// Estimated over actual time as a percentage; `None` until a
    /// milestone completes with a recorded start.
    pub async fn efficiency(&self, task_id: &TaskId) -> Result<Option<f64>, ProgressError> {
        Ok(analysis::efficiency(&self.get_progress(task_id).await?))
    }

    pub async fn trend(&self, task_id: &TaskId) -> Result<Trend, ProgressError> {
        Ok(analysis::trend(&self.get_progress(task_id).await?))
    }

    pub async fn estimate_completion_time(
        &self,
        task_id: &TaskId,
    ) -> Result<CompletionForecast, ProgressError> {
        Ok(analysis::forecast(
            &self.get_progress(task_id).await?,
            Timestamp::now(),
        ))
    }

    pub async fn generate_progress_report(
        &self,
        task_id: &TaskId,
        options: ReportOptions,
    ) -> Result<ProgressReport, ProgressError> {
        let graph = self.get_progress(task_id).await?;
        Ok(ProgressReport::generate(&graph, options, Timestamp::now()))
    }

    /// Drops graphs not updated since `cutoff`.
    pub async fn cleanup(&self, cutoff: Timestamp) -> Result<usize, ProgressError> {
        Ok(self.repository.remove_stale(cutoff).await?)
    }

    async fn mutate<F>(&self, task_id: &TaskId, f: F) -> Result<ProgressGraph, ProgressError>
    where
        F: FnOnce(&mut ProgressGraph, Timestamp) -> Result<(), ProgressError>,
    {
        let mut graph = self.get_progress(task_id).await?;
        f(&mut graph, Timestamp::now())?;
        self.repository.save(&graph).await?;
        Ok(graph)
    }
}
