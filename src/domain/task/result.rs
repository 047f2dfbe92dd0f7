//! TaskResult - the opaque outcome of a unit of agent work.
//!
//! Created once by the caller and mutated only through the `add_*` methods.
//! Every downstream component reads it; none of them keep a mutable handle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::{TaskId, Timestamp, ValidationError};

use super::TaskType;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A named output produced by the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Timestamp,
}

/// A change the task applied to the host platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskChange {
    /// Free-form change category, e.g. "file", "configuration", "infrastructure".
    pub change_type: String,
    pub description: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl TaskChange {
    pub fn new(change_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            change_type: change_type.into(),
            description: description.into(),
            target: None,
            timestamp: Timestamp::now(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// All text fields joined, used for keyword matching.
    pub fn searchable_text(&self) -> String {
        match &self.target {
            Some(target) => format!("{} {} {}", self.change_type, self.description, target),
            None => format!("{} {}", self.change_type, self.description),
        }
    }
}

/// Result of a validation the task ran on its own work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub name: String,
    pub passed: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// The outcome of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    outputs: Vec<TaskOutput>,
    #[serde(default)]
    changes: Vec<TaskChange>,
    #[serde(default)]
    validation_results: Vec<ValidationResult>,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl TaskResult {
    /// Creates a pending result with no recorded work.
    pub fn new(id: TaskId, title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        Ok(Self {
            id,
            title,
            status: TaskStatus::Pending,
            outputs: Vec::new(),
            changes: Vec::new(),
            validation_results: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: HashMap::new(),
            completed_at: None,
            duration_ms: None,
        })
    }

    /// Records an output. Re-using a key replaces the earlier value in place.
    pub fn add_output(
        &mut self,
        key: impl Into<String>,
        value: Value,
        description: Option<String>,
    ) {
        let output = TaskOutput {
            key: key.into(),
            value,
            description,
            timestamp: Timestamp::now(),
        };
        match self.outputs.iter_mut().find(|o| o.key == output.key) {
            Some(existing) => *existing = output,
            None => self.outputs.push(output),
        }
    }

    pub fn add_change(&mut self, change: TaskChange) {
        self.changes.push(change);
    }

    pub fn add_validation_result(&mut self, result: ValidationResult) {
        self.validation_results.push(result);
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Sets a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Marks the task completed at `now`.
    pub fn complete(&mut self, now: Timestamp, duration_ms: Option<u64>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        self.duration_ms = duration_ms;
    }

    /// Marks the task failed at `now`, recording the reason as an error.
    pub fn fail(&mut self, now: Timestamp, reason: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.completed_at = Some(now);
        self.errors.push(reason.into());
    }

    pub fn outputs(&self) -> &[TaskOutput] {
        &self.outputs
    }

    pub fn output(&self, key: &str) -> Option<&TaskOutput> {
        self.outputs.iter().find(|o| o.key == key)
    }

    pub fn changes(&self) -> &[TaskChange] {
        &self.changes
    }

    pub fn validation_results(&self) -> &[ValidationResult] {
        &self.validation_results
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Completed without any recorded error.
    pub fn is_successful(&self) -> bool {
        self.status == TaskStatus::Completed && self.errors.is_empty()
    }

    pub fn has_changes_or_outputs(&self) -> bool {
        !self.changes.is_empty() || !self.outputs.is_empty()
    }

    /// Task type from `metadata["type"]`, `General` when absent or unknown.
    pub fn task_type(&self) -> TaskType {
        self.metadata
            .get("type")
            .and_then(|v| v.as_str())
            .map(TaskType::parse_lenient)
            .unwrap_or_default()
    }

    /// Number of failed validation results.
    pub fn failed_validations(&self) -> usize {
        self.validation_results.iter().filter(|v| !v.passed).count()
    }
}
