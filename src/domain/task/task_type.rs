//! Task type vocabulary shared by context scoring and handoff planning.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of work a task performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    FeatureAddition,
    BugFix,
    Refactoring,
    Architecture,
    Integration,
    Optimization,
    Configuration,
    Documentation,
    Testing,
    Deployment,
    Analysis,
    #[default]
    General,
}

impl TaskType {
    /// Complexity weight contributed to the context score.
    pub fn complexity_weight(&self) -> u32 {
        match self {
            Self::Architecture => 35,
            Self::Integration | Self::Refactoring => 25,
            Self::FeatureAddition | Self::Optimization => 20,
            Self::Deployment | Self::BugFix | Self::Analysis => 15,
            Self::Configuration | Self::Testing | Self::General => 10,
            Self::Documentation => 5,
        }
    }

    /// Parses a loosely formatted type name; unknown names become `General`.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeatureAddition => "feature_addition",
            Self::BugFix => "bug_fix",
            Self::Refactoring => "refactoring",
            Self::Architecture => "architecture",
            Self::Integration => "integration",
            Self::Optimization => "optimization",
            Self::Configuration => "configuration",
            Self::Documentation => "documentation",
            Self::Testing => "testing",
            Self::Deployment => "deployment",
            Self::Analysis => "analysis",
            Self::General => "general",
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        let parsed = match normalized.as_str() {
            "feature_addition" | "feature" => Self::FeatureAddition,
            "bug_fix" | "bugfix" | "fix" => Self::BugFix,
            "refactoring" | "refactor" => Self::Refactoring,
            "architecture" => Self::Architecture,
            "integration" => Self::Integration,
            "optimization" | "performance" => Self::Optimization,
            "configuration" | "config" => Self::Configuration,
            "documentation" | "docs" => Self::Documentation,
            "testing" | "test" => Self::Testing,
            "deployment" | "deploy" => Self::Deployment,
            "analysis" => Self::Analysis,
            "general" => Self::General,
            other => return Err(format!("unknown task type '{}'", other)),
        };
        Ok(parsed)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("feature".parse::<TaskType>(), Ok(TaskType::FeatureAddition));
        assert_eq!("Bug-Fix".parse::<TaskType>(), Ok(TaskType::BugFix));
        assert_eq!("docs".parse::<TaskType>(), Ok(TaskType::Documentation));
    }

    #[test]
    fn lenient_parse_falls_back_to_general() {
        assert_eq!(TaskType::parse_lenient("cooking"), TaskType::General);
    }

    #[test]
    fn architecture_is_heaviest() {
        assert_eq!(TaskType::Architecture.complexity_weight(), 35);
        assert!(TaskType::Documentation.complexity_weight() < TaskType::General.complexity_weight());
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&TaskType::FeatureAddition).unwrap();
        assert_eq!(json, "\"feature_addition\"");
    }
}
