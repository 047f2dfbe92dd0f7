//! ResponseComposer - turns domain records into CLI-ready responses.
//!
//! Every composition follows the same path: pick a template, adapt the lead
//! paragraph through the style rules for its message type, append the body
//! sections, reject a blank result, then apply the CLI limits.

use crate::domain::collaboration::{CollaborationSession, CollaborationSummary, FeedbackRound};
use crate::domain::context::{CommunicationContext, MessageType, StyleRuleRegistry};
use crate::domain::handoff::HandoffInstructions;
use crate::domain::progress::ProgressReport;
use crate::domain::response::{
    compose, CliLimits, CompositionError, FormattedResponse, ResponseTemplate, Section,
};
use crate::domain::task::TaskResult;

/// Attribute listing the style adjustments applied to the lead.
pub const ADJUSTMENTS_ATTRIBUTE: &str = "adjustments";
/// Attribute listing rendering hints raised by the style rules.
pub const HINTS_ATTRIBUTE: &str = "hints";

#[derive(Debug, Clone, Default)]
pub struct ResponseComposer {
    registry: StyleRuleRegistry,
    limits: CliLimits,
}

impl ResponseComposer {
    pub fn new(limits: CliLimits) -> Self {
        Self {
            registry: StyleRuleRegistry::default(),
            limits,
        }
    }

    pub fn with_registry(mut self, registry: StyleRuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn limits(&self) -> &CliLimits {
        &self.limits
    }

    /// Composes the report for a finished (or failed) task.
    pub fn compose_task_response(
        &self,
        task: &TaskResult,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        let template = ResponseTemplate::select(task, context.task_complexity);
        let message_type = if task.is_successful() {
            MessageType::Success
        } else {
            MessageType::Error
        };
        self.finish(
            template,
            message_type,
            compose::task_lead(task, template),
            compose::task_sections(task, template, context.preferences.show_technical_details),
            context,
        )
    }

    pub fn compose_progress_update(
        &self,
        report: &ProgressReport,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        self.finish(
            ResponseTemplate::ProgressUpdate,
            MessageType::Progress,
            compose::progress_lead(report),
            compose::progress_sections(report),
            context,
        )
    }

    /// Asks for answers to the session's pending feedback points.
    pub fn compose_feedback_request(
        &self,
        session: &CollaborationSession,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        self.finish(
            ResponseTemplate::FeedbackRequest,
            MessageType::Feedback,
            compose::feedback_request_lead(session),
            compose::feedback_request_sections(session),
            context,
        )
    }

    pub fn compose_collaboration_round(
        &self,
        round: &FeedbackRound,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        self.finish(
            ResponseTemplate::CollaborationRound,
            MessageType::Feedback,
            compose::round_lead(round),
            compose::round_sections(round),
            context,
        )
    }

    pub fn compose_collaboration_summary(
        &self,
        summary: &CollaborationSummary,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        self.finish(
            ResponseTemplate::CollaborationSummary,
            MessageType::Feedback,
            compose::summary_lead(summary),
            compose::summary_sections(summary),
            context,
        )
    }

    pub fn compose_handoff(
        &self,
        instructions: &HandoffInstructions,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        self.finish(
            ResponseTemplate::Handoff,
            MessageType::Handoff,
            compose::handoff_lead(instructions),
            compose::handoff_sections(instructions),
            context,
        )
    }

    /// Applies the CLI limits for `context` to an already composed response.
    pub fn optimize_for_cli(
        &self,
        response: &FormattedResponse,
        context: &CommunicationContext,
    ) -> FormattedResponse {
        self.limits.optimize(
            response,
            context.preferences.max_length,
            context.environment.terminal_width,
        )
    }

    fn finish(
        &self,
        template: ResponseTemplate,
        message_type: MessageType,
        lead: String,
        body: Vec<Section>,
        context: &CommunicationContext,
    ) -> Result<FormattedResponse, CompositionError> {
        let adapted = self.registry.adapt(context, message_type, &lead);

        let mut response = FormattedResponse::new(template);
        if !adapted.content.trim().is_empty() {
            response.push(Section::paragraph(adapted.content));
        }
        response.extend(body.into_iter().filter(|s| !s.is_blank()));

        if response.is_blank() {
            return Err(CompositionError::empty(template.as_str()));
        }

        if !adapted.applied.is_empty() {
            let applied: Vec<String> = adapted
                .applied
                .iter()
                .map(ToString::to_string)
                .collect();
            response.set_attribute(ADJUSTMENTS_ATTRIBUTE, applied.join(","));
        }
        if !adapted.hints.is_empty() {
            response.set_attribute(HINTS_ATTRIBUTE, adapted.hints.join(","));
        }

        let optimized = self.optimize_for_cli(&response, context);
        tracing::debug!(
            template = %template,
            sections = optimized.metadata().section_count,
            truncated = optimized.is_truncated(),
            "response composed"
        );
        Ok(optimized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ComplexityLevel, Verbosity};
    use crate::domain::foundation::{TaskId, Timestamp};
    use crate::domain::handoff::HandoffInstructions;
    use crate::domain::response::RenderFormat;
    use crate::domain::task::TaskChange;
    use serde_json::json;

    fn context() -> CommunicationContext {
        CommunicationContext::fallback(Timestamp::now())
    }

    fn finished_task() -> TaskResult {
        let mut task = TaskResult::new(TaskId::new("t1").unwrap(), "Add login").unwrap();
        task.add_output("token", json!("abc"), Some("Session token".into()));
        task.add_change(TaskChange::new("file", "Added login handler").with_target("src/login.rs"));
        task.complete(Timestamp::now(), Some(1_200));
        task
    }

    mod task {
        use super::*;

        #[test]
        fn success_with_changes_uses_standard_template() {
            let response = ResponseComposer::default()
                .compose_task_response(&finished_task(), &context())
                .unwrap();

            assert_eq!(response.template(), Some(ResponseTemplate::StandardSuccess));
            assert!(response.render_markdown().contains("Add login"));
        }

        #[test]
        fn failure_uses_error_template() {
            let mut task = TaskResult::new(TaskId::new("t2").unwrap(), "Migrate").unwrap();
            task.fail(Timestamp::now(), "connection refused");

            let response = ResponseComposer::default()
                .compose_task_response(&task, &context())
                .unwrap();

            assert_eq!(response.template(), Some(ResponseTemplate::ErrorDetailed));
            assert!(response.render_markdown().contains("connection refused"));
        }

        #[test]
        fn high_complexity_uses_detailed_template() {
            let mut ctx = context();
            ctx.task_complexity = ComplexityLevel::High;

            let response = ResponseComposer::default()
                .compose_task_response(&finished_task(), &ctx)
                .unwrap();

            assert_eq!(response.template(), Some(ResponseTemplate::DetailedSuccess));
        }
    }

    mod limits {
        use super::*;

        #[test]
        fn respects_max_length() {
            let mut ctx = context();
            ctx.preferences.max_length = 120;
            ctx.preferences.verbosity = Verbosity::Normal;

            let response = ResponseComposer::default()
                .compose_task_response(&finished_task(), &ctx)
                .unwrap();

            assert!(response.render(RenderFormat::Markdown).chars().count() <= 120);
            assert!(response.is_truncated());
        }

        #[test]
        fn clamps_heading_depth() {
            let composer = ResponseComposer::default();
            let response = FormattedResponse::from_sections(
                ResponseTemplate::BasicSuccess,
                vec![Section::heading(6, "Deep", "text")],
            );

            let optimized = composer.optimize_for_cli(&response, &context());
            assert_eq!(optimized.sections()[0].level(), Some(3));
        }
    }

    mod handoff {
        use super::*;

        #[test]
        fn handoff_lists_next_actions() {
            let instructions = HandoffInstructions::create(
                &finished_task(),
                None,
                Default::default(),
                Timestamp::now(),
            );

            let response = ResponseComposer::default()
                .compose_handoff(&instructions, &context())
                .unwrap();

            assert_eq!(response.template(), Some(ResponseTemplate::Handoff));
            assert!(response.render_markdown().contains("Next actions"));
        }
    }

    mod empty {
        use super::*;

        #[test]
        fn blank_composition_is_rejected() {
            let err = ResponseComposer::default()
                .finish(
                    ResponseTemplate::ProgressUpdate,
                    MessageType::Progress,
                    "   ".to_string(),
                    vec![Section::paragraph(""), Section::bullets(Vec::<String>::new())],
                    &context(),
                )
                .unwrap_err();

            assert_eq!(
                err,
                CompositionError::EmptyResponse {
                    template: "progress_update".to_string()
                }
            );
        }

        #[test]
        fn applied_adjustments_are_recorded() {
            let response = ResponseComposer::default()
                .finish(
                    ResponseTemplate::Handoff,
                    MessageType::Handoff,
                    "First do this. Then do that.".to_string(),
                    Vec::new(),
                    &context(),
                )
                .unwrap();

            assert_eq!(response.attribute(ADJUSTMENTS_ATTRIBUTE), Some("add_structure"));
        }
    }
}
