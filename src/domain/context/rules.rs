//! Style rule registry.
//!
//! Each message type owns an ordered list of `{predicate, adjustments}`
//! rules. Lookup falls back to the default list for message types without
//! their own. All matching rules contribute (no short-circuit), and the
//! union is applied in the fixed order of [`StyleAdjustment`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::{CommunicationContext, ComplexityLevel, OutputFormat, Verbosity};

const CONTEXT_MARKER: &str = "_Context:";
const EXAMPLES_MARKER: &str = "_Tip: ask for an example";
const TRUNCATION_SUFFIX: &str = "...";

/// Kind of message being adapted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Default,
    Progress,
    Error,
    Success,
    Feedback,
    Handoff,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Default => "default",
            MessageType::Progress => "progress",
            MessageType::Error => "error",
            MessageType::Success => "success",
            MessageType::Feedback => "feedback",
            MessageType::Handoff => "handoff",
        };
        write!(f, "{}", s)
    }
}

/// A content transformation. Declaration order is application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleAdjustment {
    Shorten,
    Expand,
    AddStructure,
    SimplifyFormat,
    AddExamples,
}

impl fmt::Display for StyleAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StyleAdjustment::Shorten => "shorten",
            StyleAdjustment::Expand => "expand",
            StyleAdjustment::AddStructure => "add_structure",
            StyleAdjustment::SimplifyFormat => "simplify_format",
            StyleAdjustment::AddExamples => "add_examples",
        };
        write!(f, "{}", s)
    }
}

type Predicate = fn(&CommunicationContext, &str) -> bool;

/// One entry in the registry.
#[derive(Clone)]
pub struct StyleRule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub adjustments: &'static [StyleAdjustment],
}

impl fmt::Debug for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRule")
            .field("name", &self.name)
            .field("adjustments", &self.adjustments)
            .finish()
    }
}

/// Content after adaptation plus what was done to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptedContent {
    pub content: String,
    pub applied: Vec<StyleAdjustment>,
    pub hints: Vec<String>,
}

fn over_budget(ctx: &CommunicationContext, content: &str) -> bool {
    content.chars().count() > ctx.length_budget()
}

fn is_concise(ctx: &CommunicationContext, _: &str) -> bool {
    ctx.preferences.verbosity == Verbosity::Concise
}

fn is_verbose(ctx: &CommunicationContext, _: &str) -> bool {
    ctx.preferences.verbosity == Verbosity::Verbose
}

fn wants_examples(ctx: &CommunicationContext, _: &str) -> bool {
    ctx.is_beginner() || ctx.preferences.example_density == super::ExampleDensity::Many
}

fn wants_plain(ctx: &CommunicationContext, _: &str) -> bool {
    ctx.preferences.format == OutputFormat::Plain || ctx.environment.is_narrow()
}

fn complex_and_multi_sentence(ctx: &CommunicationContext, content: &str) -> bool {
    ctx.task_complexity == ComplexityLevel::High && sentences(content).len() > 1
}

fn multi_sentence(_: &CommunicationContext, content: &str) -> bool {
    sentences(content).len() > 1
}

fn shows_technical_details(ctx: &CommunicationContext, _: &str) -> bool {
    ctx.preferences.show_technical_details
}

fn always(_: &CommunicationContext, _: &str) -> bool {
    true
}

macro_rules! rule {
    ($name:expr, $pred:expr, [$($adj:ident),+ $(,)?]) => {
        StyleRule {
            name: $name,
            predicate: $pred,
            adjustments: &[$(StyleAdjustment::$adj),+],
        }
    };
}

/// Rules keyed by message type, with a default list.
#[derive(Debug, Clone)]
pub struct StyleRuleRegistry {
    rules: HashMap<MessageType, Vec<StyleRule>>,
}

impl Default for StyleRuleRegistry {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            MessageType::Default,
            vec![
                rule!("over-budget", over_budget, [Shorten]),
                rule!("verbose-reader", is_verbose, [Expand]),
                rule!("complex-prose", complex_and_multi_sentence, [AddStructure]),
                rule!("plain-output", wants_plain, [SimplifyFormat]),
                rule!("needs-examples", wants_examples, [AddExamples]),
            ],
        );
        rules.insert(
            MessageType::Progress,
            vec![
                rule!("over-budget", over_budget, [Shorten]),
                rule!("concise-reader", is_concise, [Shorten]),
                rule!("plain-output", wants_plain, [SimplifyFormat]),
            ],
        );
        rules.insert(
            MessageType::Error,
            vec![
                rule!("over-budget", over_budget, [Shorten]),
                rule!("technical-reader", shows_technical_details, [Expand]),
                rule!("needs-examples", wants_examples, [Expand, AddExamples]),
                rule!("plain-output", wants_plain, [SimplifyFormat]),
            ],
        );
        rules.insert(
            MessageType::Success,
            vec![
                rule!("over-budget", over_budget, [Shorten]),
                rule!("concise-reader", is_concise, [Shorten]),
                rule!("verbose-reader", is_verbose, [Expand]),
                rule!("plain-output", wants_plain, [SimplifyFormat]),
            ],
        );
        rules.insert(
            MessageType::Feedback,
            vec![
                rule!("question-list", multi_sentence, [AddStructure]),
                rule!("needs-examples", wants_examples, [AddExamples]),
                rule!("plain-output", wants_plain, [SimplifyFormat]),
            ],
        );
        rules.insert(
            MessageType::Handoff,
            vec![
                rule!("steps", always, [AddStructure]),
                rule!("over-budget", over_budget, [Shorten]),
                rule!("plain-output", wants_plain, [SimplifyFormat]),
            ],
        );
        Self { rules }
    }
}

impl StyleRuleRegistry {
    /// Rules for a message type, falling back to the default list.
    pub fn rules_for(&self, message_type: MessageType) -> &[StyleRule] {
        self.rules
            .get(&message_type)
            .or_else(|| self.rules.get(&MessageType::Default))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registers or replaces the rule list of a message type.
    pub fn register(&mut self, message_type: MessageType, rules: Vec<StyleRule>) {
        self.rules.insert(message_type, rules);
    }

    /// Union of the adjustments of every matching rule, in application order.
    pub fn adjustments_for(
        &self,
        ctx: &CommunicationContext,
        message_type: MessageType,
        content: &str,
    ) -> BTreeSet<StyleAdjustment> {
        self.rules_for(message_type)
            .iter()
            .filter(|rule| (rule.predicate)(ctx, content))
            .flat_map(|rule| rule.adjustments.iter().copied())
            .collect()
    }

    /// Adapts `content` for the reader.
    pub fn adapt(
        &self,
        ctx: &CommunicationContext,
        message_type: MessageType,
        content: &str,
    ) -> AdaptedContent {
        let adjustments = self.adjustments_for(ctx, message_type, content);
        let mut out = content.to_string();
        let mut hints = Vec::new();
        for adjustment in &adjustments {
            out = apply(*adjustment, ctx, &out);
            if *adjustment == StyleAdjustment::AddExamples {
                hints.push("include_examples".to_string());
            }
        }
        AdaptedContent {
            content: out,
            applied: adjustments.into_iter().collect(),
            hints,
        }
    }
}

/// Applies one adjustment. Applying the same adjustment twice gives the
/// same result as applying it once.
pub fn apply(adjustment: StyleAdjustment, ctx: &CommunicationContext, content: &str) -> String {
    match adjustment {
        StyleAdjustment::Shorten => shorten(content, ctx.length_budget()),
        StyleAdjustment::Expand => {
            if content.contains(CONTEXT_MARKER) {
                content.to_string()
            } else {
                format!(
                    "{}\n\n{} {} task, {} complexity._",
                    content.trim_end(),
                    CONTEXT_MARKER,
                    ctx.task_type,
                    ctx.task_complexity
                )
            }
        }
        StyleAdjustment::AddStructure => add_structure(content),
        StyleAdjustment::SimplifyFormat => simplify_format(content),
        StyleAdjustment::AddExamples => {
            if content.contains(EXAMPLES_MARKER) {
                content.to_string()
            } else {
                format!(
                    "{}\n\n{} of any step above._",
                    content.trim_end(),
                    EXAMPLES_MARKER
                )
            }
        }
    }
}

/// Cuts `content` to at most `max_chars` characters, preferring the last
/// sentence end inside the limit.
pub fn shorten(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let prefix: String = content.chars().take(max_chars).collect();
    let sentence_end = prefix
        .char_indices()
        .filter(|&(i, c)| {
            matches!(c, '.' | '!' | '?')
                && prefix[i + c.len_utf8()..]
                    .chars()
                    .next()
                    .map_or(true, char::is_whitespace)
        })
        .map(|(i, c)| i + c.len_utf8())
        .last();

    match sentence_end {
        Some(end) if end > 0 => prefix[..end].to_string(),
        _ => {
            let keep = max_chars.saturating_sub(TRUNCATION_SUFFIX.len());
            let mut cut: String = content.chars().take(keep).collect();
            cut.push_str(TRUNCATION_SUFFIX);
            cut
        }
    }
}

fn sentences(content: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in content.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let next_is_break = content[end..].chars().next().map_or(true, char::is_whitespace);
            if next_is_break {
                let s = content[start..end].trim();
                if !s.is_empty() {
                    out.push(s);
                }
                start = end;
            }
        }
    }
    let rest = content[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

fn is_structured(content: &str) -> bool {
    content.lines().any(|line| {
        let l = line.trim_start();
        l.starts_with('#')
            || l.starts_with("- ")
            || l.starts_with("* ")
            || l.split_once(". ")
                .map_or(false, |(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}

fn add_structure(content: &str) -> String {
    if is_structured(content) {
        return content.to_string();
    }
    let parts = sentences(content);
    if parts.len() < 2 {
        return content.to_string();
    }
    parts
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

fn simplify_format(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let stripped = line.trim_start_matches('#');
            let line = if stripped.len() != line.len() {
                stripped.trim_start()
            } else {
                line
            };
            line.replace("**", "").replace("__", "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ExperienceLevel, ResolvedPreferences};
    use crate::domain::foundation::Timestamp;

    fn ctx() -> CommunicationContext {
        CommunicationContext::fallback(Timestamp::now())
    }

    mod lookup {
        use super::*;

        #[test]
        fn unknown_type_falls_back_to_default() {
            let mut registry = StyleRuleRegistry::default();
            registry.rules.remove(&MessageType::Progress);
            let names: Vec<_> = registry
                .rules_for(MessageType::Progress)
                .iter()
                .map(|r| r.name)
                .collect();
            assert_eq!(names[0], "over-budget");
            assert_eq!(names.len(), 5);
        }

        #[test]
        fn matching_rules_are_unioned() {
            let mut c = ctx();
            c.experience_level = ExperienceLevel::Beginner;
            c.preferences.show_technical_details = true;
            let adjustments =
                StyleRuleRegistry::default().adjustments_for(&c, MessageType::Error, "Boom.");
            assert_eq!(
                adjustments.into_iter().collect::<Vec<_>>(),
                vec![StyleAdjustment::Expand, StyleAdjustment::AddExamples]
            );
        }

        #[test]
        fn nothing_matches_for_plain_default_context() {
            let adapted = StyleRuleRegistry::default().adapt(&ctx(), MessageType::Success, "Done.");
            assert!(adapted.applied.is_empty());
            assert_eq!(adapted.content, "Done.");
        }
    }

    mod adjustments {
        use super::*;

        #[test]
        fn shorten_prefers_sentence_boundary() {
            let text = "First sentence. Second sentence is longer.";
            assert_eq!(shorten(text, 20), "First sentence.");
        }

        #[test]
        fn shorten_hard_cuts_without_boundary() {
            let out = shorten("abcdefghijklmnop", 10);
            assert_eq!(out, "abcdefg...");
            assert!(out.chars().count() <= 10);
        }

        #[test]
        fn every_adjustment_is_idempotent() {
            let mut c = ctx();
            c.preferences = ResolvedPreferences {
                max_length: 40,
                ..Default::default()
            };
            let text = "## Result\nThe **build** passed. Tests are green! Deploy next?";
            for adj in [
                StyleAdjustment::Shorten,
                StyleAdjustment::Expand,
                StyleAdjustment::AddStructure,
                StyleAdjustment::SimplifyFormat,
                StyleAdjustment::AddExamples,
            ] {
                let once = apply(adj, &c, text);
                let twice = apply(adj, &c, &once);
                assert_eq!(once, twice, "{adj:?}");
            }
        }

        #[test]
        fn add_structure_bullets_sentences() {
            assert_eq!(add_structure("One. Two! Three?"), "- One.\n- Two!\n- Three?");
            assert_eq!(add_structure("- already\n- a list"), "- already\n- a list");
        }

        #[test]
        fn simplify_strips_emphasis_and_headings() {
            assert_eq!(simplify_format("## Title\n**bold** text"), "Title\nbold text");
        }
    }
}
