//! Next actions recommended at handoff time.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ActionId;
use crate::domain::task::{TaskResult, TaskType};

/// Deployment-related words in output keys or change text.
static DEPLOY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(deploy|build|package|release)").expect("deploy regex should compile")
});

/// Action priority. Declaration order is sort order, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Review,
    Testing,
    Recovery,
    Verification,
    Deployment,
    Documentation,
    Continuation,
}

impl Default for ActionCategory {
    fn default() -> Self {
        Self::Continuation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub id: ActionId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: ActionCategory,
    pub estimated_minutes: u32,
    pub command: Option<String>,
    pub automated: bool,
}

/// Options for [`NextAction::from_options`]; unset fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextActionOptions {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: ActionCategory,
    pub estimated_minutes: u32,
    pub command: Option<String>,
    pub automated: bool,
}

impl Default for NextActionOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            category: ActionCategory::Continuation,
            estimated_minutes: 5,
            command: None,
            automated: false,
        }
    }
}

impl NextActionOptions {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: ActionCategory) -> Self {
        self.category = category;
        self
    }

    pub fn minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self.automated = true;
        self
    }
}

impl NextAction {
    pub fn from_options(options: NextActionOptions) -> Self {
        Self {
            id: ActionId::new(),
            title: options.title,
            description: options.description,
            priority: options.priority,
            category: options.category,
            estimated_minutes: options.estimated_minutes,
            command: options.command,
            automated: options.automated,
        }
    }
}

/// Builds the next actions for a task result.
///
/// Success and failure use disjoint generators. Output validation,
/// deployment and documentation actions are added on top, and the list is
/// sorted by priority then by shortest estimate.
pub fn generate_next_actions(task: &TaskResult) -> Vec<NextAction> {
    let mut actions = if task.is_successful() {
        success_actions(task)
    } else {
        failure_actions(task)
    };

    actions.extend(task.outputs().iter().map(|output| {
        NextAction::from_options(
            NextActionOptions::new(
                format!("Verify output `{}`", output.key),
                output
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Check that `{}` holds the expected value", output.key)),
            )
            .category(ActionCategory::Verification)
            .minutes(5),
        )
    }));

    if suggests_deployment(task) {
        actions.extend(deployment_actions());
    }

    if task.has_changes_or_outputs() || task.task_type() == TaskType::FeatureAddition {
        actions.push(NextAction::from_options(
            NextActionOptions::new(
                "Update documentation",
                "Record what changed and how to use it",
            )
            .priority(Priority::Low)
            .category(ActionCategory::Documentation)
            .minutes(15),
        ));
    }

    sort_actions(&mut actions);
    actions
}

/// Stable sort by priority, then ascending estimate.
pub fn sort_actions(actions: &mut [NextAction]) {
    actions.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.estimated_minutes.cmp(&b.estimated_minutes))
    });
}

pub fn suggests_deployment(task: &TaskResult) -> bool {
    task.outputs().iter().any(|o| DEPLOY_RE.is_match(&o.key))
        || task
            .changes()
            .iter()
            .any(|c| DEPLOY_RE.is_match(&c.searchable_text()))
}

fn success_actions(task: &TaskResult) -> Vec<NextAction> {
    let mut actions = vec![
        NextAction::from_options(
            NextActionOptions::new(
                "Review completed work",
                format!("Review the results of \"{}\"", task.title),
            )
            .priority(Priority::High)
            .category(ActionCategory::Review)
            .minutes(10),
        ),
        NextAction::from_options(
            NextActionOptions::new("Run the test suite", "Confirm nothing regressed")
                .category(ActionCategory::Testing)
                .minutes(15),
        ),
    ];
    if !task.warnings().is_empty() {
        actions.push(NextAction::from_options(
            NextActionOptions::new(
                "Review warnings",
                format!("{} warning(s) were reported", task.warnings().len()),
            )
            .category(ActionCategory::Review)
            .minutes(5),
        ));
    }
    actions
}

fn failure_actions(task: &TaskResult) -> Vec<NextAction> {
    let detail = task
        .errors()
        .first()
        .cloned()
        .unwrap_or_else(|| "The task did not complete".to_string());
    let mut actions = vec![
        NextAction::from_options(
            NextActionOptions::new("Investigate the failure", detail)
                .priority(Priority::Critical)
                .category(ActionCategory::Recovery)
                .minutes(15),
        ),
        NextAction::from_options(
            NextActionOptions::new("Retry the task", "Run the task again once the cause is fixed")
                .priority(Priority::High)
                .category(ActionCategory::Recovery)
                .minutes(10),
        ),
    ];
    let failed = task.failed_validations();
    if failed > 0 {
        actions.push(NextAction::from_options(
            NextActionOptions::new(
                "Fix failing validations",
                format!("{} validation(s) failed", failed),
            )
            .priority(Priority::High)
            .category(ActionCategory::Recovery)
            .minutes(20),
        ));
    }
    actions
}

fn deployment_actions() -> Vec<NextAction> {
    vec![
        NextAction::from_options(
            NextActionOptions::new("Prepare deployment", "Build and package the release artifacts")
                .priority(Priority::High)
                .category(ActionCategory::Deployment)
                .minutes(20),
        ),
        NextAction::from_options(
            NextActionOptions::new("Verify deployment", "Smoke-test the deployed build")
                .category(ActionCategory::Deployment)
                .minutes(10),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TaskId, Timestamp};
    use crate::domain::task::TaskChange;
    use serde_json::json;

    fn completed() -> TaskResult {
        let mut t = TaskResult::new(TaskId::new("t1").unwrap(), "Add parser").unwrap();
        t.complete(Timestamp::now(), Some(1_000));
        t
    }

    fn titles(actions: &[NextAction]) -> Vec<&str> {
        actions.iter().map(|a| a.title.as_str()).collect()
    }

    mod options {
        use super::*;

        #[test]
        fn defaults_are_named() {
            let a = NextAction::from_options(NextActionOptions::new("Do it", ""));
            assert_eq!(a.priority, Priority::Medium);
            assert_eq!(a.category, ActionCategory::Continuation);
            assert_eq!(a.estimated_minutes, 5);
            assert!(!a.automated);
        }

        #[test]
        fn command_marks_action_automated() {
            let a = NextAction::from_options(NextActionOptions::new("Test", "").command("make test"));
            assert!(a.automated);
            assert_eq!(a.command.as_deref(), Some("make test"));
        }
    }

    mod generation {
        use super::*;

        #[test]
        fn success_and_failure_are_disjoint() {
            let ok = generate_next_actions(&completed());
            assert!(ok.iter().all(|a| a.category != ActionCategory::Recovery));

            let mut failed = completed();
            failed.fail(Timestamp::now(), "compile error");
            let actions = generate_next_actions(&failed);
            assert_eq!(actions[0].title, "Investigate the failure");
            assert_eq!(actions[0].description, "compile error");
            assert!(actions.iter().all(|a| a.category != ActionCategory::Review));
        }

        #[test]
        fn one_verification_per_output() {
            let mut t = completed();
            t.add_output("report", json!("ok"), None);
            t.add_output("summary", json!("ok"), None);
            let actions = generate_next_actions(&t);
            let verifications = actions
                .iter()
                .filter(|a| a.category == ActionCategory::Verification)
                .count();
            assert_eq!(verifications, 2);
        }

        #[test]
        fn deployment_detected_from_keys_and_changes() {
            let mut t = completed();
            t.add_output("build_artifact", json!("app.tar"), None);
            assert!(suggests_deployment(&t));

            let mut t = completed();
            t.add_change(TaskChange::new("modified", "Bumped release version"));
            assert!(suggests_deployment(&t));
            assert!(titles(&generate_next_actions(&t)).contains(&"Prepare deployment"));
        }

        #[test]
        fn documentation_for_feature_additions_without_changes() {
            let mut t = completed();
            assert!(!titles(&generate_next_actions(&t)).contains(&"Update documentation"));
            t.set_metadata("type", json!("feature_addition"));
            assert!(titles(&generate_next_actions(&t)).contains(&"Update documentation"));
        }

        #[test]
        fn sorted_by_priority_then_estimate() {
            let mut t = completed();
            t.add_output("deploy_target", json!("prod"), None);
            let actions = generate_next_actions(&t);
            for pair in actions.windows(2) {
                assert!(
                    (pair[0].priority, pair[0].estimated_minutes)
                        <= (pair[1].priority, pair[1].estimated_minutes)
                );
            }
            assert_eq!(actions[0].priority, Priority::High);
        }
    }
}
