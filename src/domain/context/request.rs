//! Inputs to context analysis, supplied by the platform adapter.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::task::{TaskResult, TaskType};

use super::{ExperienceLevel, Interaction, UserPreferences};

/// Terminals narrower than this are treated as mobile.
pub const NARROW_TERMINAL_WIDTH: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Normal,
    High,
    Critical,
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Normal
    }
}

/// Where and under what pressure the response will be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    #[serde(default)]
    pub terminal_width: Option<u16>,
    #[serde(default)]
    pub color_support: bool,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub deadline: Option<Timestamp>,
    /// Local hour of day (0-23) of the reader.
    #[serde(default)]
    pub local_hour: Option<u32>,
}

impl EnvironmentInfo {
    /// A deadline or high urgency constrains time.
    pub fn is_time_constrained(&self) -> bool {
        self.deadline.is_some() || self.urgency >= Urgency::High
    }

    pub fn is_narrow(&self) -> bool {
        self.terminal_width
            .map(|w| w < NARROW_TERMINAL_WIDTH)
            .unwrap_or(false)
    }
}

/// What is known about the user for this request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDescriptor {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub interaction_history: Vec<Interaction>,
}

/// Everything context analysis looks at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextRequest {
    #[serde(default, rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub constraints: HashMap<String, Value>,
    #[serde(default)]
    pub user: UserDescriptor,
    #[serde(default)]
    pub environment: EnvironmentInfo,
}

impl ContextRequest {
    /// Builds a request from a task result's title and metadata.
    ///
    /// Reads `requirements`, `dependencies`, `constraints` and `description`
    /// from metadata when present.
    pub fn for_task(task: &TaskResult) -> Self {
        let meta = &task.metadata;
        let requirements = meta
            .get("requirements")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let dependencies = meta
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|deps| {
                deps.iter()
                    .map(|d| d.as_str().map(str::to_string).unwrap_or_else(|| d.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        let constraints = meta
            .get("constraints")
            .and_then(Value::as_object)
            .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        let description = match meta.get("description").and_then(Value::as_str) {
            Some(extra) => format!("{} {}", task.title, extra),
            None => task.title.clone(),
        };

        Self {
            task_type: task.task_type(),
            description,
            requirements,
            dependencies,
            constraints,
            user: UserDescriptor::default(),
            environment: EnvironmentInfo::default(),
        }
    }

    pub fn with_user(mut self, user: UserDescriptor) -> Self {
        self.user = user;
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentInfo) -> Self {
        self.environment = environment;
        self
    }

    /// Description plus string requirements, for keyword search.
    pub fn searchable_text(&self) -> String {
        let mut text = self.description.clone();
        for req in self.requirements.iter().filter_map(Value::as_str) {
            text.push(' ');
            text.push_str(req);
        }
        text
    }
}
