//! Ways to continue after a task, by task type.

use serde::{Deserialize, Serialize};

use crate::domain::task::TaskType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationOption {
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
}

impl ContinuationOption {
    fn new(title: &str, description: &str, task_type: TaskType) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            task_type,
        }
    }
}

/// Type-specific follow-ups, then testing and documentation for every type.
pub fn continuation_options(task_type: TaskType) -> Vec<ContinuationOption> {
    let mut options: Vec<ContinuationOption> = specific(task_type)
        .iter()
        .map(|(title, description)| ContinuationOption::new(title, description, task_type))
        .collect();
    options.push(ContinuationOption::new(
        "Write tests",
        "Cover the new behaviour with automated tests",
        TaskType::Testing,
    ));
    options.push(ContinuationOption::new(
        "Write documentation",
        "Document the result for the next reader",
        TaskType::Documentation,
    ));
    options
}

fn specific(task_type: TaskType) -> &'static [(&'static str, &'static str)] {
    match task_type {
        TaskType::FeatureAddition => &[
            ("Extend the feature", "Build the next increment on top of this one"),
            ("Gather feedback", "Ask users how the feature behaves in practice"),
        ],
        TaskType::BugFix => &[
            ("Add a regression test", "Make sure the defect cannot come back"),
            ("Look for related defects", "Check similar code paths for the same mistake"),
        ],
        TaskType::Refactoring => &[(
            "Refactor adjacent modules",
            "Apply the same cleanup to neighbouring code",
        )],
        TaskType::Architecture => &[(
            "Plan implementation",
            "Break the design into implementation tasks",
        )],
        TaskType::Integration => &[(
            "Harden the integration",
            "Add retries and error handling around the new boundary",
        )],
        TaskType::Optimization => &[("Profile again", "Measure and target the next hot spot")],
        TaskType::Deployment => &[("Monitor the rollout", "Watch error rates after deployment")],
        TaskType::Configuration => &[(
            "Review configuration drift",
            "Compare environments for unintended differences",
        )],
        TaskType::Analysis => &[("Act on findings", "Turn the analysis into concrete tasks")],
        TaskType::Testing => &[("Raise coverage", "Fill the gaps the new tests revealed")],
        TaskType::Documentation => &[("Review the docs", "Have a second reader check them")],
        TaskType::General => &[],
    }
}
