//! FormattedResponse - ordered sections plus derived metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{ResponseTemplate, Section};

/// Separator placed between rendered sections.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Marker appended when sections were dropped to fit a length budget.
pub const TRUNCATION_NOTICE: &str = "_[... response truncated ...]_";

pub const WORDS_PER_MINUTE: usize = 200;

/// Output projection of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFormat {
    Markdown,
    Plain,
    Json,
    Yaml,
}

impl Default for RenderFormat {
    fn default() -> Self {
        Self::Markdown
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RenderFormat::Markdown => "markdown",
            RenderFormat::Plain => "plain",
            RenderFormat::Json => "json",
            RenderFormat::Yaml => "yaml",
        };
        write!(f, "{}", s)
    }
}

/// Metadata derived from the markdown render.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub word_count: usize,
    pub char_count: usize,
    pub read_time_minutes: usize,
    pub section_count: usize,
    pub template: Option<ResponseTemplate>,
    pub truncated: bool,
    pub degraded: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// A composed response.
///
/// Sections are only changed through methods that recompute the metadata,
/// so `metadata()` always describes the current render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedResponse {
    sections: Vec<Section>,
    metadata: ResponseMetadata,
}

impl FormattedResponse {
    pub fn new(template: ResponseTemplate) -> Self {
        Self {
            sections: Vec::new(),
            metadata: ResponseMetadata {
                template: Some(template),
                ..Default::default()
            },
        }
    }

    /// Builds a response from sections in one go.
    pub fn from_sections(template: ResponseTemplate, sections: Vec<Section>) -> Self {
        let mut response = Self::new(template);
        response.sections = sections;
        response.refresh_metadata();
        response
    }

    /// Minimal valid response used when composition failed upstream.
    pub fn fallback(message: impl Into<String>) -> Self {
        let mut response = Self::from_sections(
            ResponseTemplate::Fallback,
            vec![Section::paragraph(message)],
        );
        response.metadata.degraded = true;
        response
    }

    // ─── Accessors ───

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    pub fn template(&self) -> Option<ResponseTemplate> {
        self.metadata.template
    }

    pub fn is_degraded(&self) -> bool {
        self.metadata.degraded
    }

    pub fn is_truncated(&self) -> bool {
        self.metadata.truncated
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.metadata.attributes.get(key).map(String::as_str)
    }

    /// True when there is nothing but whitespace to show.
    pub fn is_blank(&self) -> bool {
        self.sections.iter().all(Section::is_blank)
    }

    // ─── Mutations ───

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
        self.refresh_metadata();
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.push(section);
        self
    }

    pub fn extend<I: IntoIterator<Item = Section>>(&mut self, sections: I) {
        self.sections.extend(sections);
        self.refresh_metadata();
    }

    /// Replaces every section through `f`, keeping order.
    pub fn map_sections<F: FnMut(Section) -> Section>(&mut self, f: F) {
        let sections = std::mem::take(&mut self.sections);
        self.sections = sections.into_iter().map(f).collect();
        self.refresh_metadata();
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.attributes.insert(key.into(), value.into());
    }

    pub fn mark_degraded(&mut self) {
        self.metadata.degraded = true;
    }

    // ─── Rendering ───

    pub fn render(&self, format: RenderFormat) -> String {
        match format {
            RenderFormat::Markdown => self.render_markdown(),
            RenderFormat::Plain => self
                .sections
                .iter()
                .map(Section::render_plain)
                .collect::<Vec<_>>()
                .join(SECTION_SEPARATOR),
            RenderFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            RenderFormat::Yaml => serde_yaml::to_string(self).unwrap_or_default(),
        }
    }

    pub fn render_markdown(&self) -> String {
        self.sections
            .iter()
            .map(Section::render_markdown)
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }

    /// Returns a copy whose markdown render fits in `max_chars`.
    ///
    /// Whole sections are packed greedily in order while there is still room
    /// for the separator and [`TRUNCATION_NOTICE`]; the notice then closes the
    /// response. A response that already fits is returned unchanged.
    pub fn truncate(&self, max_chars: usize) -> FormattedResponse {
        if self.metadata.char_count <= max_chars {
            return self.clone();
        }

        let notice_len = TRUNCATION_NOTICE.chars().count();
        let separator_len = SECTION_SEPARATOR.chars().count();
        let mut kept = Vec::new();
        let mut used = 0usize;

        for section in &self.sections {
            let len = section.render_markdown().chars().count();
            let projected = if kept.is_empty() {
                len
            } else {
                used + separator_len + len
            };
            if projected + separator_len + notice_len > max_chars {
                break;
            }
            kept.push(section.clone());
            used = projected;
        }

        let notice = if max_chars >= notice_len {
            TRUNCATION_NOTICE.to_string()
        } else {
            TRUNCATION_NOTICE.chars().take(max_chars).collect()
        };
        kept.push(Section::paragraph(notice));

        let mut truncated = FormattedResponse {
            sections: kept,
            metadata: self.metadata.clone(),
        };
        truncated.metadata.truncated = true;
        truncated.refresh_metadata();
        truncated
    }

    fn refresh_metadata(&mut self) {
        let rendered = self.render_markdown();
        let words = rendered.split_whitespace().count();
        self.metadata.word_count = words;
        self.metadata.char_count = rendered.chars().count();
        self.metadata.read_time_minutes = words.div_ceil(WORDS_PER_MINUTE);
        self.metadata.section_count = self.sections.len();
    }
}
