//! Context module - who is reading, about what, and under what pressure.
//!
//! Scores task complexity, resolves preferences from several sources into
//! one [`ResolvedPreferences`], derives an [`AdaptationStrategy`] and
//! adapts message text through the [`StyleRuleRegistry`].

mod communication;
mod complexity;
mod preferences;
mod profile;
mod recommendations;
mod request;
pub mod rules;
mod strategy;

pub use communication::CommunicationContext;
pub use complexity::{
    advanced_tech_hits, time_of_day_bonus, ComplexityInput, ComplexityLevel, ComplexityScore,
    ADVANCED_TECH_KEYWORDS,
};
pub use preferences::{
    resolve_preferences, ExampleDensity, ExperienceLevel, OutputFormat, ResolvedPreferences,
    UserPreferences, Verbosity, DEFAULT_MAX_LENGTH,
};
pub use profile::{infer_from_history, FeedbackSignal, Interaction, UserProfile, DEFAULT_HISTORY_LIMIT};
pub use recommendations::{
    CommunicationRecommendations, DetailRecommendation, FormatRecommendation, LengthRecommendation,
    LengthTarget, Timing, Tone,
};
pub use request::{ContextRequest, EnvironmentInfo, UserDescriptor, Urgency, NARROW_TERMINAL_WIDTH};
pub use rules::{AdaptedContent, MessageType, StyleAdjustment, StyleRule, StyleRuleRegistry};
pub use strategy::{
    AdaptationPriority, AdaptationStrategy, ContentDepth, DetailLevel, FormattingLevel,
    TAG_MOBILE_FRIENDLY, TAG_PRIORITIZED,
};
