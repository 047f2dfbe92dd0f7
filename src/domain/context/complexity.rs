//! Task complexity scoring.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::task::TaskType;

const REQUIREMENT_POINTS: u32 = 5;
const REQUIREMENT_CAP: u32 = 25;
const MANY_DEPENDENCIES: usize = 3;
const DEPENDENCY_POINTS: u32 = 15;
const MANY_CONSTRAINTS: usize = 2;
const CONSTRAINT_POINTS: u32 = 10;
const ADVANCED_TECH_POINTS: u32 = 5;
const ADVANCED_TECH_CAP: u32 = 15;

pub const HIGH_THRESHOLD: u32 = 60;
pub const MEDIUM_THRESHOLD: u32 = 30;

pub const ADVANCED_TECH_KEYWORDS: &[&str] = &[
    "distributed",
    "microservice",
    "concurrency",
    "kubernetes",
    "machine learning",
    "cryptography",
    "real-time",
    "migration",
    "scalability",
    "blockchain",
];

static ADVANCED_TECH_RE: Lazy<Vec<Regex>> = Lazy::new(|| {
    ADVANCED_TECH_KEYWORDS
        .iter()
        .map(|k| {
            Regex::new(&format!(r"(?i)\b{}s?\b", regex::escape(k)))
                .expect("advanced tech regex should compile")
        })
        .collect()
});

/// Complexity bucket of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_THRESHOLD {
            ComplexityLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityLevel::Low => write!(f, "low"),
            ComplexityLevel::Medium => write!(f, "medium"),
            ComplexityLevel::High => write!(f, "high"),
        }
    }
}

/// The signals complexity is scored from.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityInput<'a> {
    pub requirement_count: usize,
    pub task_type: TaskType,
    pub dependency_count: usize,
    pub constraint_count: usize,
    pub hour: u32,
    /// Free text searched for advanced technology keywords.
    pub text: &'a str,
}

/// Itemised complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub requirements: u32,
    pub task_type: u32,
    pub dependencies: u32,
    pub constraints: u32,
    pub time_of_day: u32,
    pub advanced_tech: u32,
}

impl ComplexityScore {
    pub fn compute(input: &ComplexityInput<'_>) -> Self {
        let requirements =
            (input.requirement_count as u32).saturating_mul(REQUIREMENT_POINTS).min(REQUIREMENT_CAP);
        let dependencies = if input.dependency_count > MANY_DEPENDENCIES {
            DEPENDENCY_POINTS
        } else {
            0
        };
        let constraints = if input.constraint_count > MANY_CONSTRAINTS {
            CONSTRAINT_POINTS
        } else {
            0
        };
        let advanced_tech = (advanced_tech_hits(input.text) * ADVANCED_TECH_POINTS)
            .min(ADVANCED_TECH_CAP);

        Self {
            requirements,
            task_type: input.task_type.complexity_weight(),
            dependencies,
            constraints,
            time_of_day: time_of_day_bonus(input.hour),
            advanced_tech,
        }
    }

    pub fn total(&self) -> u32 {
        self.requirements
            + self.task_type
            + self.dependencies
            + self.constraints
            + self.time_of_day
            + self.advanced_tech
    }

    pub fn level(&self) -> ComplexityLevel {
        ComplexityLevel::from_score(self.total())
    }
}

/// Late work is harder work: 22:00-05:59 adds 10, evenings add 5.
pub fn time_of_day_bonus(hour: u32) -> u32 {
    match hour {
        22..=23 | 0..=5 => 10,
        18..=21 => 5,
        _ => 0,
    }
}

/// Number of distinct advanced technology keywords in `text`.
pub fn advanced_tech_hits(text: &str) -> u32 {
    ADVANCED_TECH_RE.iter().filter(|re| re.is_match(text)).count() as u32
}
