//! Communication recommendations derived from a context.
//!
//! Each field is computed independently from the context; nothing here
//! mutates state.

use serde::{Deserialize, Serialize};

use super::{
    CommunicationContext, ComplexityLevel, ExampleDensity, ExperienceLevel, OutputFormat,
    Verbosity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Encouraging,
    Professional,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthTarget {
    Brief,
    Moderate,
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    Immediate,
    Standard,
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRecommendation {
    pub target: LengthTarget,
    pub max_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecommendation {
    pub technical_details: bool,
    pub explain_steps: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRecommendation {
    pub format: OutputFormat,
    pub use_color: bool,
    pub wrap_width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationRecommendations {
    pub tone: Tone,
    pub length: LengthRecommendation,
    pub detail: DetailRecommendation,
    pub format: FormatRecommendation,
    pub examples: ExampleDensity,
    pub timing: Timing,
}

impl CommunicationRecommendations {
    pub fn for_context(ctx: &CommunicationContext) -> Self {
        Self {
            tone: tone(ctx),
            length: length(ctx),
            detail: detail(ctx),
            format: format(ctx),
            examples: ctx.preferences.example_density,
            timing: timing(ctx),
        }
    }
}

fn tone(ctx: &CommunicationContext) -> Tone {
    if ctx.environment.is_time_constrained() {
        return Tone::Direct;
    }
    match ctx.experience_level {
        ExperienceLevel::Beginner => Tone::Encouraging,
        ExperienceLevel::Intermediate => Tone::Professional,
        ExperienceLevel::Expert => Tone::Direct,
    }
}

fn length(ctx: &CommunicationContext) -> LengthRecommendation {
    let target = match ctx.preferences.verbosity {
        Verbosity::Concise => LengthTarget::Brief,
        Verbosity::Normal => LengthTarget::Moderate,
        Verbosity::Verbose => LengthTarget::Extended,
    };
    LengthRecommendation {
        target,
        max_chars: ctx.length_budget(),
    }
}

fn detail(ctx: &CommunicationContext) -> DetailRecommendation {
    DetailRecommendation {
        technical_details: ctx.preferences.show_technical_details,
        explain_steps: ctx.experience_level == ExperienceLevel::Beginner
            || ctx.task_complexity == ComplexityLevel::High,
    }
}

fn format(ctx: &CommunicationContext) -> FormatRecommendation {
    FormatRecommendation {
        format: ctx.preferences.format,
        use_color: ctx.environment.color_support,
        wrap_width: ctx.environment.terminal_width,
    }
}

/// Urgent work is delivered now; late-night non-urgent reports can wait.
fn timing(ctx: &CommunicationContext) -> Timing {
    if ctx.environment.is_time_constrained() {
        return Timing::Immediate;
    }
    match ctx.environment.local_hour {
        Some(hour) if !(6..22).contains(&hour) => Timing::Deferred,
        _ => Timing::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::Urgency;
    use crate::domain::foundation::Timestamp;

    fn ctx() -> CommunicationContext {
        CommunicationContext::fallback(Timestamp::now())
    }

    #[test]
    fn defaults_are_professional_and_moderate() {
        let recs = CommunicationRecommendations::for_context(&ctx());
        assert_eq!(recs.tone, Tone::Professional);
        assert_eq!(recs.length.target, LengthTarget::Moderate);
        assert_eq!(recs.timing, Timing::Standard);
        assert_eq!(recs.examples, ExampleDensity::Few);
    }

    #[test]
    fn beginners_get_encouragement_and_steps() {
        let mut c = ctx();
        c.experience_level = ExperienceLevel::Beginner;
        let recs = CommunicationRecommendations::for_context(&c);
        assert_eq!(recs.tone, Tone::Encouraging);
        assert!(recs.detail.explain_steps);
    }

    #[test]
    fn urgency_makes_it_direct_and_immediate() {
        let mut c = ctx();
        c.experience_level = ExperienceLevel::Beginner;
        c.environment.urgency = Urgency::Critical;
        let recs = CommunicationRecommendations::for_context(&c);
        assert_eq!(recs.tone, Tone::Direct);
        assert_eq!(recs.timing, Timing::Immediate);
    }

    #[test]
    fn late_night_defers() {
        let mut c = ctx();
        c.environment.local_hour = Some(23);
        assert_eq!(CommunicationRecommendations::for_context(&c).timing, Timing::Deferred);
    }

    #[test]
    fn recommendations_do_not_mutate_context() {
        let c = ctx();
        let before = c.clone();
        let _ = CommunicationRecommendations::for_context(&c);
        assert_eq!(c, before);
    }
}
