//! CollaborationEngine - multi-round feedback sessions.
//!
//! Sessions move CREATED -> AWAITING_FEEDBACK -> READY_TO_PROCEED and only
//! reach COMPLETED through [`CollaborationEngine::complete_collaboration`].
//! Creating a session with an existing id replaces it, which is the only
//! way to reuse a completed session's id.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::collaboration::{
    CollaborationError, CollaborationSession, CollaborationSummary, FeedbackPoint,
    FeedbackPointInput, FeedbackRound,
};
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::task::TaskResult;
use crate::ports::SessionRepository;

pub struct CollaborationEngine {
    sessions: Arc<dyn SessionRepository>,
}

impl CollaborationEngine {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Opens a session awaiting its first round of feedback.
    ///
    /// A fresh id is generated when `session_id` is `None`.
    pub async fn create_session(
        &self,
        task_result: TaskResult,
        points: Vec<FeedbackPointInput>,
        session_id: Option<SessionId>,
    ) -> Result<CollaborationSession, CollaborationError> {
        let id = session_id.unwrap_or_else(SessionId::generate);
        let session = CollaborationSession::new(id, task_result, points, Timestamp::now())?;
        self.sessions.save(&session).await?;
        tracing::info!(
            session_id = %session.id(),
            points = session.feedback_points().len(),
            "collaboration session created"
        );
        Ok(session)
    }

    pub async fn get_session(
        &self,
        session_id: &SessionId,
    ) -> Result<CollaborationSession, CollaborationError> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| CollaborationError::SessionNotFound(session_id.clone()))
    }

    /// Runs one round of feedback and returns it.
    pub async fn process_feedback(
        &self,
        session_id: &SessionId,
        answers: HashMap<String, String>,
    ) -> Result<FeedbackRound, CollaborationError> {
        let mut session = self.get_session(session_id).await?;
        let round = session
            .process_feedback(answers, Timestamp::now())?
            .clone();
        self.sessions.save(&session).await?;

        tracing::info!(
            session_id = %session_id,
            round = round.round,
            sentiment = %round.analysis.sentiment,
            concerns = round.analysis.concerns.len(),
            status = %session.status(),
            "feedback processed"
        );
        Ok(round)
    }

    /// Completes the session and returns its summary.
    pub async fn complete_collaboration(
        &self,
        session_id: &SessionId,
    ) -> Result<CollaborationSummary, CollaborationError> {
        let mut session = self.get_session(session_id).await?;
        let summary = session.complete(Timestamp::now())?;
        self.sessions.save(&session).await?;
        tracing::info!(
            session_id = %session_id,
            iterations = summary.iterations,
            momentum = %summary.momentum,
            "collaboration completed"
        );
        Ok(summary)
    }

    /// Feedback points with no answer yet.
    pub async fn pending_points(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<FeedbackPoint>, CollaborationError> {
        let session = self.get_session(session_id).await?;
        Ok(session.pending_points().into_iter().cloned().collect())
    }

    /// Drops sessions idle since `cutoff`.
    pub async fn cleanup(&self, cutoff: Timestamp) -> Result<usize, CollaborationError> {
        Ok(self.sessions.remove_stale(cutoff).await?)
    }
}
