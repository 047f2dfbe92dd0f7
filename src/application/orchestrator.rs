//! Orchestrator - the single entry point callers talk to.
//!
//! Every public operation analyses the caller's context first, delegates to
//! one subsystem and returns a [`FormattedResponse`]. Subsystem errors never
//! escape: they become a degraded fallback response tagged
//! `TRANSIENT_DEGRADATION` and are logged at warn.
//!
//! ## Bookkeeping
//!
//! | What | Bound |
//! |------|-------|
//! | Operation history | `history_capacity`, trimmed to `history_trim_to` |
//! | Average response time | running mean over every operation |
//!
//! [`CleanupTarget::cleanup`] is the only eviction path for the history and
//! the subsystem stores.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::domain::collaboration::FeedbackPointInput;
use crate::domain::context::{CommunicationContext, ContextRequest};
use crate::domain::foundation::{DomainError, ErrorCode, MilestoneId, SessionId, TaskId, Timestamp};
use crate::domain::progress::{MilestoneSpec, MilestoneStatus, ProgressError, ReportOptions};
use crate::domain::response::{FormattedResponse, Section};
use crate::domain::task::TaskResult;
use crate::ports::{CleanupTarget, ProfileRepository, ProgressRepository, SessionRepository};

use super::history::{BoundedHistory, DEFAULT_CAPACITY, DEFAULT_TRIM_TO};
use super::{CollaborationEngine, ContextAnalyzer, HandoffPlanner, ProgressTracker, ResponseComposer};

/// Attribute naming the error code of a degraded response.
pub const ERROR_CODE_ATTRIBUTE: &str = "error_code";
/// Attribute naming the code of the subsystem error behind a degraded response.
pub const CAUSE_ATTRIBUTE: &str = "cause";

/// One completed public operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: String,
    pub degraded: bool,
    pub duration_ms: f64,
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStatistics {
    pub total_operations: u64,
    pub degraded_responses: u64,
    pub average_response_ms: f64,
    pub operations: BTreeMap<String, u64>,
    pub purged_entries: u64,
    pub last_cleanup: Option<Timestamp>,
}

impl OrchestratorStatistics {
    fn record(&mut self, record: &OperationRecord) {
        self.total_operations += 1;
        if record.degraded {
            self.degraded_responses += 1;
        }
        *self.operations.entry(record.operation.clone()).or_insert(0) += 1;
        let n = self.total_operations as f64;
        self.average_response_ms += (record.duration_ms - self.average_response_ms) / n;
    }
}

pub struct Orchestrator {
    analyzer: ContextAnalyzer,
    composer: ResponseComposer,
    tracker: ProgressTracker,
    collaboration: CollaborationEngine,
    planner: HandoffPlanner,
    history: RwLock<BoundedHistory<OperationRecord>>,
    statistics: RwLock<OrchestratorStatistics>,
}

impl Orchestrator {
    /// Wires the subsystems with default settings.
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        sessions: Arc<dyn SessionRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            analyzer: ContextAnalyzer::new(profiles),
            composer: ResponseComposer::default(),
            tracker: ProgressTracker::new(progress),
            collaboration: CollaborationEngine::new(sessions),
            planner: HandoffPlanner::default(),
            history: RwLock::new(BoundedHistory::new(DEFAULT_CAPACITY, DEFAULT_TRIM_TO)),
            statistics: RwLock::new(OrchestratorStatistics::default()),
        }
    }

    /// Wires the subsystems from loaded configuration.
    pub fn with_config(
        config: &AppConfig,
        progress: Arc<dyn ProgressRepository>,
        sessions: Arc<dyn SessionRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        let capacity = config.orchestrator.history_capacity;
        let trim_to = config.orchestrator.history_trim_to;
        Self {
            analyzer: ContextAnalyzer::new(profiles)
                .with_history_limit(config.profile.history_limit)
                .with_default_max_length(config.response.default_max_length),
            composer: ResponseComposer::new(config.response.cli_limits()),
            tracker: ProgressTracker::new(progress)
                .with_default_estimate(config.tracker.default_estimate()),
            collaboration: CollaborationEngine::new(sessions),
            planner: HandoffPlanner::new(capacity, trim_to),
            history: RwLock::new(BoundedHistory::new(capacity, trim_to)),
            statistics: RwLock::new(OrchestratorStatistics::default()),
        }
    }

    // ─── Subsystems ───

    pub fn analyzer(&self) -> &ContextAnalyzer {
        &self.analyzer
    }

    pub fn composer(&self) -> &ResponseComposer {
        &self.composer
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn collaboration(&self) -> &CollaborationEngine {
        &self.collaboration
    }

    pub fn planner(&self) -> &HandoffPlanner {
        &self.planner
    }

    // ─── Task responses ───

    /// Reports on a finished task, with a progress section when the task
    /// has a tracked graph.
    pub async fn compose_task_response(
        &self,
        task: &TaskResult,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            let mut response = self.composer.compose_task_response(task, &context)?;
            if !response.is_truncated() {
                if let Some(section) = self.progress_section(&task.id).await {
                    response.push(section);
                    response = self.composer.optimize_for_cli(&response, &context);
                }
            }
            Ok::<_, DomainError>(response)
        }
        .await;
        self.finish("compose_task_response", started, result).await
    }

    /// Plans the handoff of a task and renders it.
    pub async fn create_handoff(&self, task: &TaskResult, request: &ContextRequest) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            let protocol = self.planner.create_handoff_protocol(task, Some(&context)).await;
            let completeness = self.planner.validate_protocol_completeness(&protocol);
            let mut response = self.composer.compose_handoff(&protocol.instructions, &context)?;
            response.set_attribute("handoff_id", protocol.id.to_string());
            response.set_attribute("completeness", completeness.score.to_string());
            Ok::<_, DomainError>(response)
        }
        .await;
        self.finish("create_handoff", started, result).await
    }

    // ─── Progress ───

    pub async fn initialize_progress(
        &self,
        task_id: TaskId,
        specs: Vec<MilestoneSpec>,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            self.tracker.initialize_progress(task_id.clone(), specs).await?;
            self.progress_response(&task_id, ReportOptions::default(), &context)
                .await
        }
        .await;
        self.finish("initialize_progress", started, result).await
    }

    pub async fn update_progress(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        progress: f64,
        metadata: HashMap<String, Value>,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            self.tracker
                .update_milestone_progress(task_id, milestone_id, progress, metadata)
                .await?;
            self.progress_response(task_id, ReportOptions::default(), &context)
                .await
        }
        .await;
        self.finish("update_progress", started, result).await
    }

    pub async fn start_milestone(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            self.tracker.start_milestone(task_id, milestone_id).await?;
            self.progress_response(task_id, ReportOptions::default(), &context)
                .await
        }
        .await;
        self.finish("start_milestone", started, result).await
    }

    pub async fn complete_milestone(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            self.tracker.complete_milestone(task_id, milestone_id).await?;
            self.progress_response(task_id, ReportOptions::default(), &context)
                .await
        }
        .await;
        self.finish("complete_milestone", started, result).await
    }

    /// Blocks a milestone. The new blocker's id is in the `blocker_id`
    /// attribute.
    pub async fn add_blocker(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        description: &str,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            let blocker_id = self
                .tracker
                .add_blocker(task_id, milestone_id, description)
                .await?;
            let mut response = self
                .progress_response(task_id, ReportOptions::default(), &context)
                .await?;
            response.set_attribute("blocker_id", blocker_id);
            Ok::<_, DomainError>(response)
        }
        .await;
        self.finish("add_blocker", started, result).await
    }

    pub async fn remove_blocker(
        &self,
        task_id: &TaskId,
        milestone_id: &MilestoneId,
        blocker_id: &str,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            self.tracker
                .remove_blocker(task_id, milestone_id, blocker_id)
                .await?;
            self.progress_response(task_id, ReportOptions::default(), &context)
                .await
        }
        .await;
        self.finish("remove_blocker", started, result).await
    }

    pub async fn progress_report(
        &self,
        task_id: &TaskId,
        options: ReportOptions,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = self.progress_response(task_id, options, &context).await;
        self.finish("progress_report", started, result).await
    }

    // ─── Collaboration ───

    /// Opens a feedback session and asks its questions. The session id is
    /// in the `session_id` attribute.
    pub async fn start_collaboration(
        &self,
        task: TaskResult,
        points: Vec<FeedbackPointInput>,
        session_id: Option<SessionId>,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            let session = self
                .collaboration
                .create_session(task, points, session_id)
                .await?;
            let mut response = self.composer.compose_feedback_request(&session, &context)?;
            response.set_attribute("session_id", session.id().to_string());
            response.set_attribute("status", session.status().to_string());
            Ok::<_, DomainError>(response)
        }
        .await;
        self.finish("start_collaboration", started, result).await
    }

    pub async fn submit_feedback(
        &self,
        session_id: &SessionId,
        answers: HashMap<String, String>,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            let round = self
                .collaboration
                .process_feedback(session_id, answers)
                .await?;
            let session = self.collaboration.get_session(session_id).await?;
            let mut response = self.composer.compose_collaboration_round(&round, &context)?;
            response.set_attribute("session_id", session_id.to_string());
            response.set_attribute("status", session.status().to_string());
            Ok::<_, DomainError>(response)
        }
        .await;
        self.finish("submit_feedback", started, result).await
    }

    pub async fn complete_collaboration(
        &self,
        session_id: &SessionId,
        request: &ContextRequest,
    ) -> FormattedResponse {
        let started = Instant::now();
        let context = self.analyze(request).await;
        let result = async {
            let summary = self.collaboration.complete_collaboration(session_id).await?;
            let mut response = self
                .composer
                .compose_collaboration_summary(&summary, &context)?;
            response.set_attribute("session_id", session_id.to_string());
            Ok::<_, DomainError>(response)
        }
        .await;
        self.finish("complete_collaboration", started, result).await
    }

    // ─── Bookkeeping ───

    pub async fn statistics(&self) -> OrchestratorStatistics {
        self.statistics.read().await.clone()
    }

    /// The `limit` most recent operations, oldest first.
    pub async fn history(&self, limit: usize) -> Vec<OperationRecord> {
        self.history.read().await.recent(limit)
    }

    // ─── Internals ───

    /// Analyses the request, falling back to a minimal context on failure.
    async fn analyze(&self, request: &ContextRequest) -> CommunicationContext {
        match self.analyzer.analyze_context(request).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "context analysis failed, using fallback context");
                CommunicationContext::fallback(Timestamp::now())
            }
        }
    }

    async fn progress_response(
        &self,
        task_id: &TaskId,
        options: ReportOptions,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, DomainError> {
        let report = self
            .tracker
            .generate_progress_report(task_id, options)
            .await?;
        let mut response = self.composer.compose_progress_update(&report, context)?;
        response.set_attribute("task_id", task_id.to_string());
        Ok(response)
    }

    /// Best-effort progress summary; any failure just omits the section.
    async fn progress_section(&self, task_id: &TaskId) -> Option<Section> {
        match self.tracker.get_progress(task_id).await {
            Ok(graph) => Some(Section::heading(
                2,
                "Progress",
                format!(
                    "{}% complete, {} of {} milestones done.",
                    graph.overall_progress().rounded(),
                    graph.count_with_status(MilestoneStatus::Completed),
                    graph.milestones().len()
                ),
            )),
            Err(ProgressError::TaskNotFound(_)) => None,
            Err(e) => {
                tracing::debug!(task_id = %task_id, error = %e, "progress enrichment skipped");
                None
            }
        }
    }

    async fn finish(
        &self,
        operation: &str,
        started: Instant,
        result: Result<FormattedResponse, DomainError>,
    ) -> FormattedResponse {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(operation, code = %e.code, error = %e.message, "operation degraded");
                degraded(operation, &e)
            }
        };

        let record = OperationRecord {
            operation: operation.to_string(),
            degraded: response.is_degraded(),
            duration_ms: started.elapsed().as_secs_f64() * 1_000.0,
            template: response.template().map(|t| t.as_str().to_string()),
        };
        self.statistics.write().await.record(&record);
        self.history.write().await.push(Timestamp::now(), record);
        response
    }
}

fn degraded(operation: &str, error: &DomainError) -> FormattedResponse {
    let mut response = FormattedResponse::fallback(format!(
        "The {} request could not be completed: {}",
        operation.replace('_', " "),
        error.message
    ));
    response.set_attribute(ERROR_CODE_ATTRIBUTE, ErrorCode::TransientDegradation.to_string());
    response.set_attribute(CAUSE_ATTRIBUTE, error.code.to_string());
    response
}

#[async_trait]
impl CleanupTarget for Orchestrator {
    /// Purges history, graphs, sessions, profiles and handoff records idle
    /// for longer than `max_age`. Store failures are logged and count as
    /// nothing purged.
    async fn cleanup(&self, max_age: Duration) -> usize {
        let now = Timestamp::now();
        let cutoff = now.minus(max_age);

        let history = self.history.write().await.remove_older_than(cutoff);
        let handoffs = self.planner.cleanup(cutoff).await;
        let graphs = self.tracker.cleanup(cutoff).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "progress cleanup failed");
            0
        });
        let sessions = self.collaboration.cleanup(cutoff).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "session cleanup failed");
            0
        });
        let profiles = self.analyzer.cleanup(cutoff).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "profile cleanup failed");
            0
        });

        let total = history + handoffs + graphs + sessions + profiles;
        {
            let mut stats = self.statistics.write().await;
            stats.purged_entries += total as u64;
            stats.last_cleanup = Some(now);
        }
        tracing::info!(history, handoffs, graphs, sessions, profiles, total, "cleanup finished");
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{
        InMemoryProfileRepository, InMemoryProgressRepository, InMemorySessionRepository,
    };
    use crate::domain::context::{EnvironmentInfo, UserDescriptor};
    use crate::domain::foundation::UserId;
    use crate::domain::response::{RenderFormat, ResponseTemplate};
    use serde_json::json;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            Arc::new(InMemoryProgressRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(InMemoryProfileRepository::new()),
        )
    }

    fn request() -> ContextRequest {
        ContextRequest {
            environment: EnvironmentInfo {
                local_hour: Some(10),
                ..EnvironmentInfo::default()
            },
            ..ContextRequest::default()
        }
    }

    fn task() -> TaskResult {
        let mut task = TaskResult::new(TaskId::new("t1").unwrap(), "Ship feature").unwrap();
        task.add_output("build", json!("ok"), None);
        task.complete(Timestamp::now(), Some(2_000));
        task
    }

    fn m(i: usize) -> MilestoneId {
        MilestoneId::positional(i)
    }

    mod degradation {
        use super::*;

        #[tokio::test]
        async fn unknown_task_degrades_instead_of_failing() {
            let orch = orchestrator();

            let response = orch
                .update_progress(&TaskId::new("nope").unwrap(), &m(0), 10.0, HashMap::new(), &request())
                .await;

            assert!(response.is_degraded());
            assert_eq!(response.template(), Some(ResponseTemplate::Fallback));
            assert_eq!(
                response.attribute(ERROR_CODE_ATTRIBUTE),
                Some("TRANSIENT_DEGRADATION")
            );
            assert_eq!(response.attribute(CAUSE_ATTRIBUTE), Some("TASK_NOT_FOUND"));
        }

        #[tokio::test]
        async fn completed_session_degrades() {
            let orch = orchestrator();
            let id = SessionId::new("s1").unwrap();
            orch.start_collaboration(task(), vec!["Ok?".into()], Some(id.clone()), &request())
                .await;
            orch.complete_collaboration(&id, &request()).await;

            let response = orch
                .submit_feedback(&id, HashMap::from([("fp0".into(), "yes".into())]), &request())
                .await;

            assert!(response.is_degraded());
            assert_eq!(response.attribute(CAUSE_ATTRIBUTE), Some("SESSION_COMPLETED"));
        }
    }

    mod progress {
        use super::*;

        #[tokio::test]
        async fn progress_flow_renders_updates() {
            let orch = orchestrator();
            let specs = vec![
                MilestoneSpec::new("A").with_estimate_minutes(10),
                MilestoneSpec::new("B").with_estimate_minutes(10).depends_on(m(0)),
            ];
            orch.initialize_progress(TaskId::new("t1").unwrap(), specs, &request())
                .await;
            orch.complete_milestone(&TaskId::new("t1").unwrap(), &m(0), &request())
                .await;
            let response = orch
                .update_progress(&TaskId::new("t1").unwrap(), &m(1), 50.0, HashMap::new(), &request())
                .await;

            assert!(!response.is_degraded());
            assert_eq!(response.template(), Some(ResponseTemplate::ProgressUpdate));
            assert!(response.render(RenderFormat::Markdown).contains("75%"));
        }

        #[tokio::test]
        async fn task_response_is_enriched_with_progress() {
            let orch = orchestrator();
            orch.initialize_progress(
                TaskId::new("t1").unwrap(),
                vec![MilestoneSpec::new("A")],
                &request(),
            )
            .await;

            let response = orch.compose_task_response(&task(), &request()).await;

            assert!(response.render_markdown().contains("## Progress"));
        }

        #[tokio::test]
        async fn untracked_task_has_no_progress_section() {
            let response = orchestrator().compose_task_response(&task(), &request()).await;

            assert!(!response.is_degraded());
            assert!(!response.render_markdown().contains("## Progress"));
        }
    }

    mod collaboration {
        use super::*;

        #[tokio::test]
        async fn approval_round_reports_ready_status() {
            let orch = orchestrator();
            let started = orch
                .start_collaboration(task(), vec!["Looks right?".into()], None, &request())
                .await;
            let id = SessionId::new(started.attribute("session_id").unwrap()).unwrap();

            let response = orch
                .submit_feedback(
                    &id,
                    HashMap::from([("fp0".into(), "yes looks great".into())]),
                    &request(),
                )
                .await;

            assert_eq!(response.attribute("status"), Some("ready_to_proceed"));
        }
    }

    mod handoff {
        use super::*;

        #[tokio::test]
        async fn handoff_with_context_is_complete() {
            let response = orchestrator().create_handoff(&task(), &request()).await;

            assert_eq!(response.template(), Some(ResponseTemplate::Handoff));
            assert_eq!(response.attribute("completeness"), Some("100"));
        }
    }

    mod bookkeeping {
        use super::*;

        #[tokio::test]
        async fn statistics_count_operations_and_degradations() {
            let orch = orchestrator();
            orch.compose_task_response(&task(), &request()).await;
            orch.progress_report(&TaskId::new("missing").unwrap(), ReportOptions::default(), &request())
                .await;

            let stats = orch.statistics().await;
            assert_eq!(stats.total_operations, 2);
            assert_eq!(stats.degraded_responses, 1);
            assert_eq!(stats.operations.get("progress_report"), Some(&1));
            assert!(stats.average_response_ms >= 0.0);
            assert_eq!(orch.history(10).await.len(), 2);
        }

        #[tokio::test]
        async fn cleanup_purges_everything_stale() {
            let orch = orchestrator();
            let user_request = ContextRequest {
                user: UserDescriptor {
                    user_id: Some(UserId::new("u1").unwrap()),
                    ..UserDescriptor::default()
                },
                ..request()
            };
            orch.initialize_progress(TaskId::new("t1").unwrap(), vec![MilestoneSpec::new("A")], &user_request)
                .await;
            orch.start_collaboration(task(), vec!["Ok?".into()], None, &request())
                .await;

            // Zero max age puts the cutoff at "now", after everything above.
            tokio::time::sleep(Duration::from_millis(5)).await;
            let purged = orch.cleanup(Duration::ZERO).await;

            // 2 history records, 1 graph, 1 session, 1 profile
            assert_eq!(purged, 5);
            assert!(orch.history(10).await.is_empty());
            let stats = orch.statistics().await;
            assert_eq!(stats.purged_entries, 5);
            assert!(stats.last_cleanup.is_some());
        }
    }
}
