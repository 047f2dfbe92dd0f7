//! Communication preferences and their resolution.
//!
//! Preferences arrive from several sources with partial information. Each
//! source is a [`UserPreferences`] with optional fields; resolution merges
//! them in precedence order, every later source filling only what is still
//! unset, and finally falls back to [`ResolvedPreferences::default`].

use serde::{Deserialize, Serialize};

/// Default maximum response length in characters.
pub const DEFAULT_MAX_LENGTH: usize = 4000;

/// How much prose a user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Concise,
    Normal,
    Verbose,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Normal
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concise => write!(f, "concise"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

/// Output format the user reads best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Markdown,
    Plain,
    Structured,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Markdown
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Plain => write!(f, "plain"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// How many examples to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleDensity {
    None,
    Few,
    Many,
}

impl Default for ExampleDensity {
    fn default() -> Self {
        Self::Few
    }
}

impl std::fmt::Display for ExampleDensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Few => write!(f, "few"),
            Self::Many => write!(f, "many"),
        }
    }
}

/// Self-reported or assumed experience of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        Self::Intermediate
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

/// Partially specified preferences from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub verbosity: Option<Verbosity>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub show_technical_details: Option<bool>,
    #[serde(default)]
    pub example_density: Option<ExampleDensity>,
}

impl UserPreferences {
    /// Fills every unset field from `other`, leaving set fields alone.
    pub fn fill_from(mut self, other: &UserPreferences) -> Self {
        self.verbosity = self.verbosity.or(other.verbosity);
        self.format = self.format.or(other.format);
        self.max_length = self.max_length.or(other.max_length);
        self.show_technical_details = self.show_technical_details.or(other.show_technical_details);
        self.example_density = self.example_density.or(other.example_density);
        self
    }

    /// Overwrites fields with every value set in `other`.
    pub fn overlay(&mut self, other: &UserPreferences) {
        if other.verbosity.is_some() {
            self.verbosity = other.verbosity;
        }
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.max_length.is_some() {
            self.max_length = other.max_length;
        }
        if other.show_technical_details.is_some() {
            self.show_technical_details = other.show_technical_details;
        }
        if other.example_density.is_some() {
            self.example_density = other.example_density;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == UserPreferences::default()
    }

    /// Defaults implied by an experience level.
    pub fn for_experience(level: ExperienceLevel) -> Self {
        match level {
            ExperienceLevel::Beginner => Self {
                verbosity: Some(Verbosity::Verbose),
                example_density: Some(ExampleDensity::Many),
                show_technical_details: Some(false),
                ..Self::default()
            },
            ExperienceLevel::Intermediate => Self {
                verbosity: Some(Verbosity::Normal),
                example_density: Some(ExampleDensity::Few),
                ..Self::default()
            },
            ExperienceLevel::Expert => Self {
                verbosity: Some(Verbosity::Concise),
                example_density: Some(ExampleDensity::Few),
                show_technical_details: Some(true),
                ..Self::default()
            },
        }
    }

    /// Fills remaining gaps from the hard defaults.
    pub fn resolve(&self) -> ResolvedPreferences {
        let d = ResolvedPreferences::default();
        ResolvedPreferences {
            verbosity: self.verbosity.unwrap_or(d.verbosity),
            format: self.format.unwrap_or(d.format),
            max_length: self.max_length.unwrap_or(d.max_length),
            show_technical_details: self.show_technical_details.unwrap_or(d.show_technical_details),
            example_density: self.example_density.unwrap_or(d.example_density),
        }
    }
}

/// Fully resolved preferences used for one communication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPreferences {
    pub verbosity: Verbosity,
    pub format: OutputFormat,
    pub max_length: usize,
    pub show_technical_details: bool,
    pub example_density: ExampleDensity,
}

impl Default for ResolvedPreferences {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            format: OutputFormat::Markdown,
            max_length: DEFAULT_MAX_LENGTH,
            show_technical_details: false,
            example_density: ExampleDensity::Few,
        }
    }
}

/// Merges preference sources in precedence order.
///
/// explicit request, stored profile, history inference, experience
/// defaults, then hard defaults.
pub fn resolve_preferences(
    explicit: &UserPreferences,
    stored: Option<&UserPreferences>,
    inferred: &UserPreferences,
    experience: ExperienceLevel,
) -> ResolvedPreferences {
    let mut merged = explicit.clone();
    if let Some(stored) = stored {
        merged = merged.fill_from(stored);
    }
    merged
        .fill_from(inferred)
        .fill_from(&UserPreferences::for_experience(experience))
        .resolve()
}
