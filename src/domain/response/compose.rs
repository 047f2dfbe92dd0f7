//! Section builders for each kind of response.
//!
//! These are pure: they turn domain records into ordered sections and leave
//! style adaptation, CLI limits and the empty check to the composer service.

use serde_json::Value;
use std::time::Duration;

use crate::domain::collaboration::{CollaborationSession, CollaborationSummary, FeedbackRound};
use crate::domain::handoff::HandoffInstructions;
use crate::domain::progress::{MilestoneSnapshot, ProgressReport};
use crate::domain::task::TaskResult;

use super::{ResponseTemplate, Section};

/// One-line lead for a task response.
pub fn task_lead(task: &TaskResult, template: ResponseTemplate) -> String {
    match template {
        ResponseTemplate::ErrorDetailed => format!(
            "\"{}\" did not complete. {} error(s) were reported.",
            task.title,
            task.errors().len()
        ),
        ResponseTemplate::SimpleSuccess => format!("\"{}\" is done.", task.title),
        _ => {
            let mut lead = format!("\"{}\" completed successfully.", task.title);
            if task.has_changes_or_outputs() {
                lead.push_str(&format!(
                    " It produced {} output(s) and {} change(s).",
                    task.outputs().len(),
                    task.changes().len()
                ));
            }
            lead
        }
    }
}

/// Body sections for a task response, after the lead.
pub fn task_sections(
    task: &TaskResult,
    template: ResponseTemplate,
    show_technical_details: bool,
) -> Vec<Section> {
    let mut sections = Vec::new();
    match template {
        ResponseTemplate::ErrorDetailed => {
            sections.push(Section::heading(2, "Errors", ""));
            sections.push(Section::bullets(task.errors().iter().cloned()));
            let failed: Vec<String> = task
                .validation_results()
                .iter()
                .filter(|v| !v.passed)
                .map(|v| match &v.message {
                    Some(message) => format!("{}: {}", v.name, message),
                    None => v.name.clone(),
                })
                .collect();
            if !failed.is_empty() {
                sections.push(Section::heading(2, "Failed validations", ""));
                sections.push(Section::bullets(failed));
            }
            push_warnings(task, &mut sections);
        }
        ResponseTemplate::DetailedSuccess => {
            push_outputs(task, &mut sections);
            push_changes(task, &mut sections);
            if !task.validation_results().is_empty() {
                sections.push(Section::heading(2, "Validation", ""));
                sections.push(Section::bullets(task.validation_results().iter().map(|v| {
                    format!("{} {}", if v.passed { "[pass]" } else { "[fail]" }, v.name)
                })));
            }
            push_warnings(task, &mut sections);
            if show_technical_details && !task.outputs().is_empty() {
                let raw: serde_json::Map<String, Value> = task
                    .outputs()
                    .iter()
                    .map(|o| (o.key.clone(), o.value.clone()))
                    .collect();
                let json = serde_json::to_string_pretty(&raw).unwrap_or_default();
                sections.push(Section::code("json", json));
            }
            if let Some(ms) = task.duration_ms {
                sections.push(Section::paragraph(format!(
                    "Completed in {}.",
                    human_duration(Duration::from_millis(ms))
                )));
            }
        }
        ResponseTemplate::StandardSuccess => {
            push_outputs(task, &mut sections);
            push_changes(task, &mut sections);
            push_warnings(task, &mut sections);
        }
        _ => push_warnings(task, &mut sections),
    }
    sections
}

pub fn progress_lead(report: &ProgressReport) -> String {
    let s = &report.summary;
    let mut lead = format!(
        "Task {} is {} complete: {} of {} milestones done.",
        report.task_id, s.overall_progress, s.completed, s.total
    );
    if let Some(focus) = &s.current_focus {
        lead.push_str(&format!(" Currently working on {}.", focus));
    }
    lead
}

pub fn progress_sections(report: &ProgressReport) -> Vec<Section> {
    let mut sections = Vec::new();
    let groups: [(&str, &[MilestoneSnapshot]); 4] = [
        ("In progress", report.in_progress.as_slice()),
        ("Blocked", report.blocked.as_slice()),
        ("Pending", report.pending.as_slice()),
        ("Completed", report.completed.as_slice()),
    ];
    for (title, milestones) in groups {
        if milestones.is_empty() {
            continue;
        }
        sections.push(Section::heading(2, title, ""));
        sections.push(Section::bullets(milestones.iter().map(milestone_line)));
    }

    if let Some(analysis) = &report.analysis {
        let mut lines = vec![format!("Trend: {}", analysis.trend)];
        if let Some(efficiency) = analysis.efficiency {
            lines.push(format!("Efficiency: {:.0}%", efficiency));
        }
        if !analysis.critical_path.is_empty() {
            let path: Vec<&str> = analysis
                .critical_path
                .milestones
                .iter()
                .map(|id| id.as_str())
                .collect();
            lines.push(format!("Critical path: {}", path.join(" -> ")));
        }
        for b in &analysis.bottlenecks {
            lines.push(format!("Bottleneck: {} ({} dependents)", b.name, b.dependents));
        }
        sections.push(Section::heading(2, "Analysis", ""));
        sections.push(Section::bullets(lines));
    }

    if let Some(forecast) = &report.predictions {
        sections.push(Section::heading(
            2,
            "Forecast",
            format!(
                "About {} remaining ({} confidence).",
                human_duration(forecast.remaining),
                forecast.confidence
            ),
        ));
    }

    if !report.recommendations.is_empty() {
        sections.push(Section::heading(2, "Recommendations", ""));
        sections.push(Section::bullets(
            report
                .recommendations
                .iter()
                .map(|r| format!("[{}] {}", r.priority, r.message)),
        ));
    }
    sections
}

pub fn feedback_request_lead(session: &CollaborationSession) -> String {
    format!(
        "Your input is needed on \"{}\". Please answer the questions below.",
        session.task_result().title
    )
}

pub fn feedback_request_sections(session: &CollaborationSession) -> Vec<Section> {
    let pending = session.pending_points();
    if pending.is_empty() {
        return vec![Section::paragraph("All questions have been answered.")];
    }
    let items = pending.iter().map(|point| {
        let mut line = format!("[{}] {}", point.id, point.label());
        if point.required {
            line.push_str(" (required)");
        }
        if !point.title.is_empty() && !point.description.is_empty() {
            line.push_str(&format!(": {}", point.description));
        }
        if !point.options.is_empty() {
            line.push_str(&format!(" Options: {}.", point.options.join(", ")));
        }
        line
    });
    vec![
        Section::heading(2, "Questions", ""),
        Section::numbered(items),
    ]
}

pub fn round_lead(round: &FeedbackRound) -> String {
    let a = &round.analysis;
    format!(
        "Round {}: {} answer(s), sentiment {}, {} approval(s), {} concern(s).",
        round.round,
        a.answered(),
        a.sentiment,
        a.approvals.len(),
        a.concerns.len()
    )
}

pub fn round_sections(round: &FeedbackRound) -> Vec<Section> {
    let plan = &round.iteration_plan;
    let mut sections = Vec::new();
    if !plan.changes.is_empty() {
        sections.push(Section::heading(2, "Planned changes", ""));
        sections.push(Section::bullets(
            plan.changes
                .iter()
                .map(|c| format!("{} (effort {})", c.description, c.effort)),
        ));
    }
    if !plan.validations.is_empty() {
        sections.push(Section::heading(2, "To validate", ""));
        sections.push(Section::bullets(
            plan.validations.iter().map(|v| v.description.clone()),
        ));
    }
    if !plan.new_feedback_points.is_empty() {
        sections.push(Section::heading(2, "Follow-up questions", ""));
        sections.push(Section::numbered(
            plan.new_feedback_points.iter().map(|p| p.label().to_string()),
        ));
    }
    sections.push(Section::paragraph(format!(
        "Plan priority: {}. {}",
        plan.priority,
        if plan.requires_more_feedback {
            "More feedback is needed."
        } else {
            "Ready to proceed once concerns are addressed."
        }
    )));
    sections
}

pub fn summary_lead(summary: &CollaborationSummary) -> String {
    format!(
        "Collaboration on \"{}\" finished after {} round(s) in {}.",
        summary.task_title,
        summary.iterations,
        human_duration(summary.duration)
    )
}

pub fn summary_sections(summary: &CollaborationSummary) -> Vec<Section> {
    let mut sections = vec![Section::bullets([
        format!("Feedback received: {}", summary.feedback_count),
        format!("Consensus: {:.0}%", summary.consensus_level * 100.0),
        format!("Momentum: {}", summary.momentum),
    ])];
    if !summary.key_decisions.is_empty() {
        sections.push(Section::heading(2, "Key decisions", ""));
        sections.push(Section::bullets(summary.key_decisions.iter().cloned()));
    }
    sections
}

pub fn handoff_lead(instructions: &HandoffInstructions) -> String {
    let status = if instructions.task.successful {
        "completed"
    } else {
        "needs attention"
    };
    format!(
        "Handoff for \"{}\" ({}). Next steps are listed in priority order.",
        instructions.task.title, status
    )
}

pub fn handoff_sections(instructions: &HandoffInstructions) -> Vec<Section> {
    let mut sections = Vec::new();
    if !instructions.next_actions.is_empty() {
        sections.push(Section::heading(2, "Next actions", ""));
        sections.push(Section::numbered(instructions.next_actions.iter().map(|a| {
            format!(
                "[{}] {}: {} (~{} min)",
                a.priority, a.title, a.description, a.estimated_minutes
            )
        })));
    }
    if !instructions.validation_steps.is_empty() {
        sections.push(Section::heading(2, "Validation", ""));
        sections.push(Section::bullets(
            instructions
                .validation_steps
                .iter()
                .map(|s| format!("{}: {}", s.name, s.expected)),
        ));
    }
    if !instructions.continuation_options.is_empty() {
        sections.push(Section::heading(2, "Continue with", ""));
        sections.push(Section::bullets(
            instructions
                .continuation_options
                .iter()
                .map(|o| format!("{}: {}", o.title, o.description)),
        ));
    }
    if !instructions.recommendations.is_empty() {
        sections.push(Section::heading(2, "Recommendations", ""));
        sections.push(Section::bullets(
            instructions.recommendations.iter().map(|r| r.message.clone()),
        ));
    }
    sections
}

/// Compact "1h 5m", "3m 20s" or "12s" rendering.
pub fn human_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {}m", h, m)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn milestone_line(m: &MilestoneSnapshot) -> String {
    let mut line = format!("{} ({})", m.name, m.progress);
    if !m.blockers.is_empty() {
        line.push_str(&format!(" blocked by: {}", m.blockers.join("; ")));
    }
    line
}

fn push_outputs(task: &TaskResult, sections: &mut Vec<Section>) {
    if task.outputs().is_empty() {
        return;
    }
    sections.push(Section::heading(2, "Outputs", ""));
    sections.push(Section::bullets(task.outputs().iter().map(|o| {
        match &o.description {
            Some(d) => format!("{}: {} ({})", o.key, value_text(&o.value), d),
            None => format!("{}: {}", o.key, value_text(&o.value)),
        }
    })));
}

fn push_changes(task: &TaskResult, sections: &mut Vec<Section>) {
    if task.changes().is_empty() {
        return;
    }
    sections.push(Section::heading(2, "Changes", ""));
    sections.push(Section::bullets(task.changes().iter().map(|c| {
        match &c.target {
            Some(target) => format!("{}: {} ({})", c.change_type, c.description, target),
            None => format!("{}: {}", c.change_type, c.description),
        }
    })));
}

fn push_warnings(task: &TaskResult, sections: &mut Vec<Section>) {
    if task.warnings().is_empty() {
        return;
    }
    sections.push(Section::heading(2, "Warnings", ""));
    sections.push(Section::bullets(task.warnings().iter().cloned()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TaskId, Timestamp};
    use crate::domain::task::{TaskChange, ValidationResult};
    use serde_json::json;

    fn task() -> TaskResult {
        let mut t = TaskResult::new(TaskId::new("t1").unwrap(), "Add parser").unwrap();
        t.add_output("file", json!("parser.rs"), Some("new module".into()));
        t.add_change(TaskChange::new("created", "Parser module").with_target("src/parser.rs"));
        t.complete(Timestamp::now(), Some(65_000));
        t
    }

    #[test]
    fn standard_success_lists_outputs_and_changes() {
        let rendered: Vec<String> = task_sections(&task(), ResponseTemplate::StandardSuccess, false)
            .iter()
            .map(Section::render_markdown)
            .collect();
        assert_eq!(rendered[0], "## Outputs\n\n");
        assert_eq!(rendered[1], "- file: parser.rs (new module)");
        assert_eq!(rendered[3], "- created: Parser module (src/parser.rs)");
    }

    #[test]
    fn detailed_success_adds_raw_outputs_only_for_technical_readers() {
        let plain = task_sections(&task(), ResponseTemplate::DetailedSuccess, false);
        assert!(!plain.iter().any(|s| matches!(s, Section::Code { .. })));
        let technical = task_sections(&task(), ResponseTemplate::DetailedSuccess, true);
        assert!(technical.iter().any(|s| matches!(s, Section::Code { .. })));
        assert_eq!(
            technical.last(),
            Some(&Section::paragraph("Completed in 1m 5s."))
        );
    }

    #[test]
    fn error_template_lists_errors_and_failed_validations() {
        let mut t = task();
        t.add_validation_result(ValidationResult {
            name: "lint".into(),
            passed: false,
            message: Some("3 warnings".into()),
        });
        t.fail(Timestamp::now(), "type error");
        let sections = task_sections(&t, ResponseTemplate::ErrorDetailed, false);
        assert_eq!(sections[1], Section::bullets(["type error"]));
        assert_eq!(sections[3], Section::bullets(["lint: 3 warnings"]));
        assert!(task_lead(&t, ResponseTemplate::ErrorDetailed).contains("1 error(s)"));
    }

    #[test]
    fn human_duration_formats() {
        assert_eq!(human_duration(Duration::from_secs(12)), "12s");
        assert_eq!(human_duration(Duration::from_secs(200)), "3m 20s");
        assert_eq!(human_duration(Duration::from_secs(3_900)), "1h 5m");
    }
}
