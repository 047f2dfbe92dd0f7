//! UserProfile aggregate - preferences learned across interactions.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::foundation::{Entity, Timestamp, UserId};

use super::{ExampleDensity, ExperienceLevel, UserPreferences, Verbosity};

/// Default number of interactions retained per profile.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

const LONG_ANSWER_CHARS: f64 = 200.0;
const SHORT_ANSWER_CHARS: f64 = 50.0;
const LOW_RATING: f64 = 3.0;
const QUESTION_RATIO: f64 = 0.5;

/// One past exchange with the user.
///
/// `answer_length` is `None` when the exchange carried no message, as for a
/// bare rating. Such entries count toward the rating average only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Length in characters of the user's message.
    #[serde(default)]
    pub answer_length: Option<usize>,
    /// Optional 1-5 rating the user gave the response.
    #[serde(default)]
    pub rating: Option<u8>,
    /// Whether the user's message was a question.
    #[serde(default)]
    pub was_question: bool,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl Interaction {
    pub fn from_message(text: &str, rating: Option<u8>) -> Self {
        Self {
            answer_length: Some(text.chars().count()),
            rating,
            was_question: text.trim_end().ends_with('?'),
            timestamp: Some(Timestamp::now()),
        }
    }

    pub fn rating_only(rating: u8, now: Timestamp) -> Self {
        Self {
            answer_length: None,
            rating: Some(rating.clamp(1, 5)),
            was_question: false,
            timestamp: Some(now),
        }
    }

    pub fn has_message(&self) -> bool {
        self.answer_length.is_some()
    }

    /// Same exchange ignoring when it happened.
    pub fn same_exchange(&self, other: &Interaction) -> bool {
        self.answer_length == other.answer_length
            && self.rating == other.rating
            && self.was_question == other.was_question
    }
}

/// Explicit feedback about how responses are pitched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "value", rename_all = "snake_case")]
pub enum FeedbackSignal {
    TooLong,
    TooShort,
    TooTechnical,
    NotTechnicalEnough,
    NeedsExamples,
    Rating(u8),
}

/// Infers preferences from an interaction history.
///
/// Long answers suggest a verbose user and short ones a concise user; a
/// question-heavy history overrides both with verbose and many examples.
/// Low average ratings turn technical detail off. Length and question
/// ratio only look at interactions that carried a message.
pub fn infer_from_history(history: &[Interaction]) -> UserPreferences {
    let mut inferred = UserPreferences::default();
    let lengths: Vec<f64> = history
        .iter()
        .filter_map(|i| i.answer_length)
        .map(|len| len as f64)
        .collect();

    if !lengths.is_empty() {
        let avg_length = lengths.iter().sum::<f64>() / lengths.len() as f64;
        if avg_length > LONG_ANSWER_CHARS {
            inferred.verbosity = Some(Verbosity::Verbose);
        } else if avg_length < SHORT_ANSWER_CHARS {
            inferred.verbosity = Some(Verbosity::Concise);
        }
    }

    let ratings: Vec<f64> = history.iter().filter_map(|i| i.rating).map(f64::from).collect();
    if !ratings.is_empty() {
        let avg_rating = ratings.iter().sum::<f64>() / ratings.len() as f64;
        if avg_rating < LOW_RATING {
            inferred.show_technical_details = Some(false);
        }
    }

    let questions = history
        .iter()
        .filter(|i| i.has_message() && i.was_question)
        .count() as f64;
    if !lengths.is_empty() && questions / lengths.len() as f64 > QUESTION_RATIO {
        inferred.verbosity = Some(Verbosity::Verbose);
        inferred.example_density = Some(ExampleDensity::Many);
    }

    inferred
}

/// Preferences and bounded interaction history for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    user_id: UserId,
    preferences: UserPreferences,
    experience_level: Option<ExperienceLevel>,
    history: VecDeque<Interaction>,
    history_limit: usize,
    updated_at: Timestamp,
}

impl UserProfile {
    pub fn new(user_id: UserId, history_limit: usize, now: Timestamp) -> Self {
        Self {
            user_id,
            preferences: UserPreferences::default(),
            experience_level: None,
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            updated_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn experience_level(&self) -> Option<ExperienceLevel> {
        self.experience_level
    }

    pub fn history(&self) -> impl Iterator<Item = &Interaction> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Most recent timestamp among stored interactions.
    pub fn latest_interaction_at(&self) -> Option<Timestamp> {
        self.history.iter().filter_map(|i| i.timestamp).max()
    }

    /// Whether an equivalent exchange is already stored.
    pub fn has_exchange(&self, interaction: &Interaction) -> bool {
        self.history.iter().any(|i| i.same_exchange(interaction))
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn set_experience_level(&mut self, level: ExperienceLevel, now: Timestamp) {
        self.experience_level = Some(level);
        self.updated_at = now;
    }

    /// Stores preferences explicitly stated by the user.
    pub fn update_preferences(&mut self, preferences: &UserPreferences, now: Timestamp) {
        self.preferences.overlay(preferences);
        self.updated_at = now;
    }

    /// Appends an interaction, dropping the oldest past the limit.
    pub fn record_interaction(&mut self, interaction: Interaction, now: Timestamp) {
        self.history.push_back(interaction);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        self.updated_at = now;
    }

    /// Adjusts stored preferences from explicit feedback.
    pub fn apply_signal(&mut self, signal: FeedbackSignal, now: Timestamp) {
        match signal {
            FeedbackSignal::TooLong => {
                self.preferences.verbosity = Some(match self.preferences.verbosity {
                    Some(Verbosity::Verbose) => Verbosity::Normal,
                    _ => Verbosity::Concise,
                });
            }
            FeedbackSignal::TooShort => {
                self.preferences.verbosity = Some(match self.preferences.verbosity {
                    Some(Verbosity::Concise) => Verbosity::Normal,
                    _ => Verbosity::Verbose,
                });
            }
            FeedbackSignal::TooTechnical => self.preferences.show_technical_details = Some(false),
            FeedbackSignal::NotTechnicalEnough => {
                self.preferences.show_technical_details = Some(true)
            }
            FeedbackSignal::NeedsExamples => {
                self.preferences.example_density = Some(ExampleDensity::Many)
            }
            FeedbackSignal::Rating(rating) => {
                self.record_interaction(Interaction::rating_only(rating, now), now);
            }
        }
        self.updated_at = now;
    }

    /// Preferences inferred from this profile's history.
    pub fn inferred_preferences(&self) -> UserPreferences {
        let history: Vec<Interaction> = self.history.iter().cloned().collect();
        infer_from_history(&history)
    }
}

impl Entity for UserProfile {
    type Id = UserId;

    fn entity_id(&self) -> &UserId {
        &self.user_id
    }

    fn last_activity(&self) -> Timestamp {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(len: usize, rating: Option<u8>, question: bool) -> Interaction {
        Interaction {
            answer_length: Some(len),
            rating,
            was_question: question,
            timestamp: Some(Timestamp::now()),
        }
    }

    fn profile() -> UserProfile {
        UserProfile::new(UserId::new("u1").unwrap(), 3, Timestamp::now())
    }

    mod inference {
        use super::*;

        #[test]
        fn empty_history_infers_nothing() {
            assert!(infer_from_history(&[]).is_empty());
        }

        #[test]
        fn long_answers_mean_verbose() {
            let inferred = infer_from_history(&[interaction(300, None, false)]);
            assert_eq!(inferred.verbosity, Some(Verbosity::Verbose));
        }

        #[test]
        fn short_answers_mean_concise() {
            let inferred = infer_from_history(&[interaction(10, None, false)]);
            assert_eq!(inferred.verbosity, Some(Verbosity::Concise));
        }

        #[test]
        fn low_ratings_disable_technical_details() {
            let inferred = infer_from_history(&[
                interaction(100, Some(2), false),
                interaction(100, Some(3), false),
            ]);
            assert_eq!(inferred.show_technical_details, Some(false));
        }

        #[test]
        fn question_heavy_history_wants_examples() {
            let inferred = infer_from_history(&[
                interaction(10, None, true),
                interaction(10, None, true),
                interaction(10, None, false),
            ]);
            assert_eq!(inferred.verbosity, Some(Verbosity::Verbose));
            assert_eq!(inferred.example_density, Some(ExampleDensity::Many));
        }

        #[test]
        fn ratings_alone_say_nothing_about_length() {
            let now = Timestamp::now();
            let inferred = infer_from_history(&[
                Interaction::rating_only(5, now),
                Interaction::rating_only(5, now),
            ]);
            assert_eq!(inferred.verbosity, None);
            assert_eq!(inferred.example_density, None);
        }

        #[test]
        fn ratings_do_not_dilute_message_averages() {
            let now = Timestamp::now();
            let inferred = infer_from_history(&[
                interaction(300, None, false),
                Interaction::rating_only(4, now),
                Interaction::rating_only(4, now),
                Interaction::rating_only(4, now),
            ]);
            assert_eq!(inferred.verbosity, Some(Verbosity::Verbose));
        }

        #[test]
        fn untimestamped_payload_deserializes() {
            let parsed: Interaction =
                serde_json::from_str(r#"{"answer_length": 12, "was_question": true}"#).unwrap();
            assert_eq!(parsed.timestamp, None);
            assert_eq!(parsed.answer_length, Some(12));
        }
    }

    mod profile_updates {
        use super::*;

        #[test]
        fn history_is_bounded() {
            let mut p = profile();
            for len in 0..5 {
                p.record_interaction(interaction(len, None, false), Timestamp::now());
            }
            assert_eq!(p.history_len(), 3);
            assert_eq!(p.history().next().and_then(|i| i.answer_length), Some(2));
        }

        #[test]
        fn too_long_steps_verbosity_down() {
            let mut p = profile();
            p.update_preferences(
                &UserPreferences {
                    verbosity: Some(Verbosity::Verbose),
                    ..Default::default()
                },
                Timestamp::now(),
            );
            p.apply_signal(FeedbackSignal::TooLong, Timestamp::now());
            assert_eq!(p.preferences().verbosity, Some(Verbosity::Normal));
            p.apply_signal(FeedbackSignal::TooLong, Timestamp::now());
            assert_eq!(p.preferences().verbosity, Some(Verbosity::Concise));
        }

        #[test]
        fn rating_signal_feeds_history() {
            let mut p = profile();
            p.apply_signal(FeedbackSignal::Rating(1), Timestamp::now());
            assert_eq!(p.inferred_preferences().show_technical_details, Some(false));
            assert_eq!(p.history().next().and_then(|i| i.answer_length), None);
        }

        #[test]
        fn signals_serialize_tagged() {
            let json = serde_json::to_string(&FeedbackSignal::Rating(4)).unwrap();
            assert_eq!(json, r#"{"signal":"rating","value":4}"#);
        }
    }
}
