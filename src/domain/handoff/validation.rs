//! Validation steps the receiver of a handoff should run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::task::TaskResult;

static SYSTEM_CHANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(configuration|config|system|infrastructure)")
        .expect("system change regex should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStep {
    pub name: String,
    pub description: String,
    pub expected: String,
    pub command: Option<String>,
    pub required: bool,
}

/// Options for [`ValidationStep::from_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationStepOptions {
    pub name: String,
    pub description: String,
    pub expected: String,
    pub command: Option<String>,
    pub required: bool,
}

impl Default for ValidationStepOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            expected: "Completes without errors".to_string(),
            command: None,
            required: true,
        }
    }
}

impl ValidationStepOptions {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl ValidationStep {
    pub fn from_options(options: ValidationStepOptions) -> Self {
        Self {
            name: options.name,
            description: options.description,
            expected: options.expected,
            command: options.command,
            required: options.required,
        }
    }
}

/// One step per output, one review step when anything changed, and a
/// system health check when a change touched configuration or infrastructure.
pub fn validation_steps(task: &TaskResult) -> Vec<ValidationStep> {
    let mut steps: Vec<ValidationStep> = task
        .outputs()
        .iter()
        .map(|output| {
            ValidationStep::from_options(
                ValidationStepOptions::new(
                    format!("Validate `{}`", output.key),
                    format!("Inspect the `{}` output", output.key),
                )
                .expected(format!("`{}` is present and correct", output.key)),
            )
        })
        .collect();

    if !task.changes().is_empty() {
        steps.push(ValidationStep::from_options(
            ValidationStepOptions::new(
                "Review changes",
                format!("Review the {} recorded change(s)", task.changes().len()),
            )
            .expected("Every change is intended"),
        ));
    }

    if needs_health_check(task) {
        steps.push(ValidationStep::from_options(
            ValidationStepOptions::new(
                "System health check",
                "Confirm the system still starts and responds after the change",
            )
            .expected("All services healthy"),
        ));
    }

    steps
}

pub fn needs_health_check(task: &TaskResult) -> bool {
    task.changes()
        .iter()
        .any(|c| SYSTEM_CHANGE_RE.is_match(&c.change_type))
}
