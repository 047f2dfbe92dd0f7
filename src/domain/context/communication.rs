//! CommunicationContext - the per-call result of context analysis.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::task::TaskType;

use super::{
    AdaptationStrategy, ComplexityLevel, ComplexityScore, EnvironmentInfo, ExperienceLevel,
    ResolvedPreferences, Verbosity,
};

/// Everything downstream components need to pitch a response.
///
/// Built fresh for every call and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationContext {
    pub task_type: TaskType,
    pub task_complexity: ComplexityLevel,
    pub complexity_score: u32,
    pub score_breakdown: ComplexityScore,
    pub preferences: ResolvedPreferences,
    pub environment: EnvironmentInfo,
    pub experience_level: ExperienceLevel,
    pub strategy: AdaptationStrategy,
    pub user_id: Option<UserId>,
    pub analyzed_at: Timestamp,
}

impl CommunicationContext {
    /// Assembles a context from already resolved parts.
    pub fn new(
        task_type: TaskType,
        score: ComplexityScore,
        preferences: ResolvedPreferences,
        environment: EnvironmentInfo,
        experience_level: ExperienceLevel,
        user_id: Option<UserId>,
        analyzed_at: Timestamp,
    ) -> Self {
        let task_complexity = score.level();
        let strategy = AdaptationStrategy::resolve(task_complexity, &preferences, &environment);
        Self {
            task_type,
            task_complexity,
            complexity_score: score.total(),
            score_breakdown: score,
            preferences,
            environment,
            experience_level,
            strategy,
            user_id,
            analyzed_at,
        }
    }

    /// Minimal context used when analysis is unavailable.
    pub fn fallback(now: Timestamp) -> Self {
        let score = ComplexityScore {
            requirements: 0,
            task_type: TaskType::General.complexity_weight(),
            dependencies: 0,
            constraints: 0,
            time_of_day: 0,
            advanced_tech: 0,
        };
        Self::new(
            TaskType::General,
            score,
            ResolvedPreferences::default(),
            EnvironmentInfo::default(),
            ExperienceLevel::default(),
            None,
            now,
        )
    }

    /// Character budget for shortened content.
    ///
    /// Concise readers get half of their maximum length.
    pub fn length_budget(&self) -> usize {
        match self.preferences.verbosity {
            Verbosity::Concise => self.preferences.max_length / 2,
            _ => self.preferences.max_length,
        }
    }

    pub fn is_beginner(&self) -> bool {
        self.experience_level == ExperienceLevel::Beginner
    }
}
