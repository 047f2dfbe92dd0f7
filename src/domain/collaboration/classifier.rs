//! Deterministic keyword classification of reviewer feedback.
//!
//! Every list below is matched case-insensitively on word boundaries. The
//! lists and thresholds are part of the observable behaviour: changing a
//! word changes how sessions progress.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const APPROVAL_KEYWORDS: &[&str] = &[
    "approve",
    "approved",
    "yes",
    "lgtm",
    "looks good",
    "great",
    "perfect",
    "proceed",
    "accept",
    "agreed",
    "ok",
    "okay",
    "sounds good",
    "go ahead",
    "ship it",
];

pub const REJECTION_KEYWORDS: &[&str] = &[
    "no",
    "reject",
    "rejected",
    "wrong",
    "incorrect",
    "don't",
    "do not",
    "stop",
    "disagree",
    "not acceptable",
    "bad",
];

pub const UNCERTAIN_KEYWORDS: &[&str] = &[
    "maybe",
    "not sure",
    "unsure",
    "unclear",
    "confused",
    "perhaps",
    "possibly",
    "hmm",
    "question",
];

pub const SUGGESTION_KEYWORDS: &[&str] = &[
    "suggest",
    "should",
    "could",
    "would be better",
    "consider",
    "instead",
    "recommend",
    "prefer",
    "what if",
    "how about",
    "add",
    "change",
];

pub const CERTAINTY_KEYWORDS: &[&str] = &[
    "definitely",
    "absolutely",
    "certainly",
    "sure",
    "clearly",
    "exactly",
    "must",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "good", "great", "excellent", "perfect", "love", "like", "nice", "awesome", "helpful",
    "clear", "yes", "approve", "happy", "works",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "bad", "poor", "wrong", "terrible", "hate", "dislike", "broken", "confusing", "unclear", "no",
    "fail", "fails", "issue", "problem", "bug",
];

pub const CHANGE_VERBS: &[&str] = &[
    "add",
    "create",
    "implement",
    "modify",
    "update",
    "change",
    "remove",
    "delete",
    "fix",
    "refactor",
    "rename",
    "move",
    "replace",
    "major",
    "complete",
    "overhaul",
    "improve",
    "rewrite",
];

const URGENT_KEYWORDS: &[&str] = &[
    "must",
    "critical",
    "urgent",
    "asap",
    "immediately",
    "required",
];

const TENTATIVE_KEYWORDS: &[&str] = &["could", "maybe", "nice to have"];

/// Builds a case-insensitive word-boundary alternation.
fn keyword_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("keyword regex should compile")
}

static APPROVAL_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(APPROVAL_KEYWORDS));
static REJECTION_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(REJECTION_KEYWORDS));
static UNCERTAIN_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(UNCERTAIN_KEYWORDS));
static SUGGESTION_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(SUGGESTION_KEYWORDS));
static CERTAINTY_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(CERTAINTY_KEYWORDS));
static POSITIVE_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(POSITIVE_KEYWORDS));
static NEGATIVE_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(NEGATIVE_KEYWORDS));
static CHANGE_VERB_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(CHANGE_VERBS));
static URGENT_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(URGENT_KEYWORDS));
static TENTATIVE_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(TENTATIVE_KEYWORDS));

static EFFORT_MAJOR_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(&["major", "complete", "overhaul"]));
static EFFORT_NEW_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(&["add", "create", "implement"]));
static EFFORT_EDIT_RE: Lazy<Regex> = Lazy::new(|| keyword_regex(&["modify", "update", "change"]));

/// What a reviewer's answer is trying to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Approval,
    Rejection,
    Uncertain,
    Suggestion,
    Neutral,
}

impl Intent {
    pub fn is_concern(&self) -> bool {
        matches!(self, Intent::Rejection | Intent::Uncertain)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Approval => "approval",
            Intent::Rejection => "rejection",
            Intent::Uncertain => "uncertain",
            Intent::Suggestion => "suggestion",
            Intent::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// Aggregate tone of a feedback round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

/// Urgency of an action item derived from feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

/// Classifies intent with priority approval > rejection > uncertain >
/// suggestion > neutral.
pub fn classify_intent(text: &str) -> Intent {
    if APPROVAL_RE.is_match(text) {
        Intent::Approval
    } else if REJECTION_RE.is_match(text) {
        Intent::Rejection
    } else if UNCERTAIN_RE.is_match(text) {
        Intent::Uncertain
    } else if SUGGESTION_RE.is_match(text) {
        Intent::Suggestion
    } else {
        Intent::Neutral
    }
}

/// Confidence in a classification, in `[0, 1]`.
///
/// Base 0.5; +0.1 past 20 chars, +0.2 past 50 (not cumulative); +0.3 for an
/// exact option match; +0.1 for a certainty word. Neutral caps at 0.4.
pub fn confidence(text: &str, intent: Intent, options: &[String]) -> f64 {
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    let mut score: f64 = 0.5;
    if length > 50 {
        score += 0.2;
    } else if length > 20 {
        score += 0.1;
    }
    if options.iter().any(|o| o.trim().eq_ignore_ascii_case(trimmed)) {
        score += 0.3;
    }
    if CERTAINTY_RE.is_match(trimmed) {
        score += 0.1;
    }
    if intent == Intent::Neutral {
        score = score.min(0.4);
    }
    score.clamp(0.0, 1.0)
}

/// Sentiment over the concatenated answer texts.
///
/// When one side has no hits the other wins; otherwise a ratio above 1.5
/// in either direction decides.
pub fn sentiment<'a, I>(texts: I) -> Sentiment
where
    I: IntoIterator<Item = &'a str>,
{
    let (positive, negative) = texts.into_iter().fold((0usize, 0usize), |(p, n), text| {
        (
            p + POSITIVE_RE.find_iter(text).count(),
            n + NEGATIVE_RE.find_iter(text).count(),
        )
    });

    match (positive, negative) {
        (0, 0) => Sentiment::Neutral,
        (_, 0) => Sentiment::Positive,
        (0, _) => Sentiment::Negative,
        (p, n) => {
            let ratio = p as f64 / n as f64;
            if ratio > 1.5 {
                Sentiment::Positive
            } else if ratio < 1.0 / 1.5 {
                Sentiment::Negative
            } else {
                Sentiment::Neutral
            }
        }
    }
}

/// True when the text asks for a change.
pub fn mentions_change(text: &str) -> bool {
    CHANGE_VERB_RE.is_match(text)
}

/// Effort points for a requested change.
pub fn effort(text: &str) -> u8 {
    if EFFORT_MAJOR_RE.is_match(text) {
        5
    } else if EFFORT_NEW_RE.is_match(text) {
        3
    } else if EFFORT_EDIT_RE.is_match(text) {
        2
    } else {
        1
    }
}

/// Priority of an action item given its text and classified intent.
pub fn action_priority(text: &str, intent: Intent) -> ActionPriority {
    if intent == Intent::Rejection || URGENT_RE.is_match(text) {
        ActionPriority::High
    } else if intent == Intent::Suggestion && TENTATIVE_RE.is_match(text) {
        ActionPriority::Low
    } else {
        ActionPriority::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod intent {
        use super::*;

        #[test]
        fn approval_wins_over_rejection() {
            assert_eq!(classify_intent("No wait, looks good"), Intent::Approval);
        }

        #[test]
        fn each_class_is_reachable() {
            assert_eq!(classify_intent("LGTM"), Intent::Approval);
            assert_eq!(classify_intent("this is wrong"), Intent::Rejection);
            assert_eq!(classify_intent("I'm not sure about it"), Intent::Uncertain);
            assert_eq!(classify_intent("consider caching"), Intent::Suggestion);
            assert_eq!(classify_intent("the build ran"), Intent::Neutral);
        }

        #[test]
        fn matches_whole_words_only() {
            // "know" contains "no", "token" contains "ok"
            assert_eq!(classify_intent("I know the token"), Intent::Neutral);
        }

        #[test]
        fn apostrophe_keywords_match() {
            assert_eq!(classify_intent("please don't"), Intent::Rejection);
            assert_eq!(classify_intent("I don't know"), Intent::Rejection);
        }

        #[test]
        fn every_uncertain_keyword_classifies_as_uncertain() {
            for keyword in UNCERTAIN_KEYWORDS {
                assert_eq!(classify_intent(keyword), Intent::Uncertain, "{keyword}");
            }
        }
    }

    mod scoring {
        use super::*;

        #[test]
        fn short_text_has_base_confidence() {
            assert_eq!(confidence("yes", Intent::Approval, &[]), 0.5);
        }

        #[test]
        fn length_bonus_tiers() {
            let medium = "a".repeat(30);
            let long = "a".repeat(60);
            assert!((confidence(&medium, Intent::Approval, &[]) - 0.6).abs() < 1e-9);
            assert!((confidence(&long, Intent::Approval, &[]) - 0.7).abs() < 1e-9);
        }

        #[test]
        fn option_match_and_certainty_add_up() {
            let options = vec!["yes".to_string(), "no".to_string()];
            assert!((confidence("Yes", Intent::Approval, &options) - 0.8).abs() < 1e-9);
            assert!(
                (confidence("definitely", Intent::Neutral, &[]) - 0.4).abs() < 1e-9,
                "neutral is capped"
            );
        }

        #[test]
        fn confidence_never_exceeds_one() {
            let options = vec!["absolutely yes, ship it right now without further delay".to_string()];
            let score = confidence(&options[0], Intent::Approval, &options);
            assert_eq!(score, 1.0);
        }
    }

    mod sentiment_tests {
        use super::*;

        #[test]
        fn one_sided_counts_decide() {
            assert_eq!(sentiment(["yes looks great"]), Sentiment::Positive);
            assert_eq!(sentiment(["broken", "another bug"]), Sentiment::Negative);
            assert_eq!(sentiment(["the build ran"]), Sentiment::Neutral);
        }

        #[test]
        fn mixed_needs_clear_ratio() {
            assert_eq!(sentiment(["good but wrong"]), Sentiment::Neutral);
            assert_eq!(sentiment(["good great nice but wrong"]), Sentiment::Positive);
            assert_eq!(sentiment(["nice but broken and bad"]), Sentiment::Negative);
        }
    }

    mod actions {
        use super::*;

        #[test]
        fn effort_tiers() {
            assert_eq!(effort("major overhaul of auth"), 5);
            assert_eq!(effort("add a retry"), 3);
            assert_eq!(effort("update the docs"), 2);
            assert_eq!(effort("fix typo"), 1);
        }

        #[test]
        fn priority_rules() {
            assert_eq!(action_priority("fix it asap", Intent::Neutral), ActionPriority::High);
            assert_eq!(action_priority("remove this", Intent::Rejection), ActionPriority::High);
            assert_eq!(
                action_priority("could add a flag", Intent::Suggestion),
                ActionPriority::Low
            );
            assert_eq!(action_priority("add a flag", Intent::Suggestion), ActionPriority::Medium);
        }

        #[test]
        fn change_verbs_detected() {
            assert!(mentions_change("please rename the module"));
            assert!(!mentions_change("all fine"));
        }
    }
}
