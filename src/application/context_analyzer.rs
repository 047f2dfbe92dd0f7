//! ContextAnalyzer - scores a request and resolves how to talk to the user.
//!
//! Analysis is the first step of every orchestrated call. It reads and
//! updates the stored [`UserProfile`] but the resulting
//! [`CommunicationContext`] itself is never persisted.

use std::sync::Arc;

use crate::domain::context::{
    infer_from_history, resolve_preferences, AdaptedContent, CommunicationContext,
    CommunicationRecommendations, ComplexityInput, ComplexityScore, ContextRequest,
    FeedbackSignal, Interaction, MessageType, StyleRuleRegistry, UserPreferences, UserProfile,
    DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_LENGTH,
};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::ProfileRepository;

pub struct ContextAnalyzer {
    profiles: Arc<dyn ProfileRepository>,
    registry: StyleRuleRegistry,
    history_limit: usize,
    default_max_length: usize,
}

impl ContextAnalyzer {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            registry: StyleRuleRegistry::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Max length used when no preference source sets one.
    pub fn with_default_max_length(mut self, max_length: usize) -> Self {
        self.default_max_length = max_length;
        self
    }

    pub fn with_registry(mut self, registry: StyleRuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &StyleRuleRegistry {
        &self.registry
    }

    /// Scores the request and resolves preferences and strategy.
    ///
    /// When the request names a user, their profile is created if missing,
    /// absorbs any interactions newer than its latest one (untimestamped
    /// ones unless already stored), and takes the supplied experience level.
    pub async fn analyze_context(
        &self,
        request: &ContextRequest,
    ) -> Result<CommunicationContext, DomainError> {
        let now = Timestamp::now();
        let hour = request.environment.local_hour.unwrap_or_else(|| now.hour());
        let text = request.searchable_text();
        let score = ComplexityScore::compute(&ComplexityInput {
            requirement_count: request.requirements.len(),
            task_type: request.task_type,
            dependency_count: request.dependencies.len(),
            constraint_count: request.constraints.len(),
            hour,
            text: &text,
        });

        let profile = match &request.user.user_id {
            Some(user_id) => Some(self.fold_into_profile(user_id, request, now).await?),
            None => None,
        };

        let inferred = match &profile {
            Some(p) => p.inferred_preferences(),
            None => infer_from_history(&request.user.interaction_history),
        };
        // Nothing below this layer sets a max length.
        let inferred = inferred.fill_from(&UserPreferences {
            max_length: Some(self.default_max_length),
            ..UserPreferences::default()
        });

        let experience = request
            .user
            .experience_level
            .or_else(|| profile.as_ref().and_then(UserProfile::experience_level))
            .unwrap_or_default();

        let preferences = resolve_preferences(
            &request.user.preferences,
            profile.as_ref().map(UserProfile::preferences),
            &inferred,
            experience,
        );

        let context = CommunicationContext::new(
            request.task_type,
            score,
            preferences,
            request.environment.clone(),
            experience,
            request.user.user_id.clone(),
            now,
        );

        tracing::debug!(
            task_type = %context.task_type,
            complexity = %context.task_complexity,
            score = context.complexity_score,
            "context analyzed"
        );
        Ok(context)
    }

    async fn fold_into_profile(
        &self,
        user_id: &UserId,
        request: &ContextRequest,
        now: Timestamp,
    ) -> Result<UserProfile, DomainError> {
        let mut profile = self.load_or_create(user_id, now).await?;

        // Untimestamped entries can't be ordered; callers resend them, so
        // each distinct exchange is stored once.
        let latest = profile.latest_interaction_at();
        for interaction in &request.user.interaction_history {
            match interaction.timestamp {
                Some(at) => {
                    if latest.map_or(true, |l| at.is_after(&l)) {
                        profile.record_interaction(interaction.clone(), now);
                    }
                }
                None => {
                    if !profile.has_exchange(interaction) {
                        profile.record_interaction(
                            Interaction {
                                timestamp: Some(now),
                                ..interaction.clone()
                            },
                            now,
                        );
                    }
                }
            }
        }
        if let Some(level) = request.user.experience_level {
            profile.set_experience_level(level, now);
        }

        self.profiles.save(&profile).await?;
        Ok(profile)
    }

    async fn load_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<UserProfile, DomainError> {
        Ok(self
            .profiles
            .find_by_id(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id.clone(), self.history_limit, now)))
    }

    /// Adapts content through the rules registered for `message_type`.
    pub fn adapt_communication_style(
        &self,
        context: &CommunicationContext,
        message_type: MessageType,
        content: &str,
    ) -> AdaptedContent {
        self.registry.adapt(context, message_type, content)
    }

    pub fn get_recommendations(&self, context: &CommunicationContext) -> CommunicationRecommendations {
        CommunicationRecommendations::for_context(context)
    }

    /// Applies explicit feedback to the user's stored profile.
    pub async fn record_feedback(
        &self,
        user_id: &UserId,
        signal: FeedbackSignal,
    ) -> Result<UserProfile, DomainError> {
        let now = Timestamp::now();
        let mut profile = self.load_or_create(user_id, now).await?;
        profile.apply_signal(signal, now);
        self.profiles.save(&profile).await?;
        tracing::info!(user_id = %user_id, ?signal, "feedback signal recorded");
        Ok(profile)
    }

    pub async fn record_interaction(
        &self,
        user_id: &UserId,
        interaction: Interaction,
    ) -> Result<UserProfile, DomainError> {
        let now = Timestamp::now();
        let mut profile = self.load_or_create(user_id, now).await?;
        profile.record_interaction(interaction, now);
        self.profiles.save(&profile).await?;
        Ok(profile)
    }

    /// Overwrites the stored preferences with every field set in `preferences`.
    pub async fn update_preferences(
        &self,
        user_id: &UserId,
        preferences: &UserPreferences,
    ) -> Result<UserProfile, DomainError> {
        let now = Timestamp::now();
        let mut profile = self.load_or_create(user_id, now).await?;
        profile.update_preferences(preferences, now);
        self.profiles.save(&profile).await?;
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        self.profiles.find_by_id(user_id).await
    }

    /// Drops profiles untouched since `cutoff`.
    pub async fn cleanup(&self, cutoff: Timestamp) -> Result<usize, DomainError> {
        self.profiles.remove_stale(cutoff).await
    }
}
