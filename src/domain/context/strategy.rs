//! AdaptationStrategy - the resolved style decisions for one communication.

use serde::{Deserialize, Serialize};

use super::{ComplexityLevel, EnvironmentInfo, ResolvedPreferences, Verbosity};

pub const TAG_PRIORITIZED: &str = "prioritized";
pub const TAG_MOBILE_FRIENDLY: &str = "mobile-friendly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Brief,
    Balanced,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingLevel {
    Minimal,
    Standard,
    Rich,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDepth {
    Summary,
    Standard,
    Comprehensive,
}

/// Qualities a response optimises for, most important first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationPriority {
    Clarity,
    Completeness,
    Accuracy,
    Brevity,
    Efficiency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptationStrategy {
    pub detail_level: DetailLevel,
    pub formatting: FormattingLevel,
    pub content_depth: ContentDepth,
    pub adaptation_priority: Vec<AdaptationPriority>,
    pub tags: Vec<String>,
}

impl AdaptationStrategy {
    /// Base strategy for a complexity level.
    pub fn base(complexity: ComplexityLevel) -> Self {
        use AdaptationPriority::*;
        let (detail_level, formatting, content_depth, adaptation_priority) = match complexity {
            ComplexityLevel::Low => (
                DetailLevel::Brief,
                FormattingLevel::Minimal,
                ContentDepth::Summary,
                vec![Clarity],
            ),
            ComplexityLevel::Medium => (
                DetailLevel::Balanced,
                FormattingLevel::Standard,
                ContentDepth::Standard,
                vec![Clarity, Completeness],
            ),
            ComplexityLevel::High => (
                DetailLevel::Detailed,
                FormattingLevel::Rich,
                ContentDepth::Comprehensive,
                vec![Completeness, Accuracy, Clarity],
            ),
        };
        Self {
            detail_level,
            formatting,
            content_depth,
            adaptation_priority,
            tags: Vec::new(),
        }
    }

    /// Complexity base, then the verbosity override, then the environment
    /// override. Later overrides land at the front of the priority list.
    pub fn resolve(
        complexity: ComplexityLevel,
        preferences: &ResolvedPreferences,
        environment: &EnvironmentInfo,
    ) -> Self {
        let mut strategy = Self::base(complexity);

        match preferences.verbosity {
            Verbosity::Concise => {
                strategy.detail_level = DetailLevel::Brief;
                strategy.prepend(AdaptationPriority::Brevity);
            }
            Verbosity::Verbose => {
                strategy.detail_level = DetailLevel::Detailed;
                strategy.prepend(AdaptationPriority::Completeness);
            }
            Verbosity::Normal => {}
        }

        if environment.is_time_constrained() {
            strategy.tag(TAG_PRIORITIZED);
            strategy.prepend(AdaptationPriority::Efficiency);
        }
        if environment.is_narrow() {
            strategy.tag(TAG_MOBILE_FRIENDLY);
        }

        strategy
    }

    /// Moves `priority` to the front, inserting it if absent.
    pub fn prepend(&mut self, priority: AdaptationPriority) {
        self.adaptation_priority.retain(|p| *p != priority);
        self.adaptation_priority.insert(0, priority);
    }

    pub fn tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn top_priority(&self) -> Option<AdaptationPriority> {
        self.adaptation_priority.first().copied()
    }
}
