//! Section - one ordered block of a formatted response.

use serde::{Deserialize, Serialize};

/// A block of response content.
///
/// Sections render independently; a response joins them with a blank line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Heading {
        level: u8,
        title: String,
        #[serde(default)]
        content: String,
    },
    Code {
        #[serde(default)]
        language: String,
        code: String,
    },
    List {
        #[serde(default)]
        ordered: bool,
        items: Vec<String>,
    },
    Paragraph {
        text: String,
    },
}

impl Section {
    pub fn heading(level: u8, title: impl Into<String>, content: impl Into<String>) -> Self {
        Section::Heading {
            level: level.max(1),
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn code(language: impl Into<String>, code: impl Into<String>) -> Self {
        Section::Code {
            language: language.into(),
            code: code.into(),
        }
    }

    pub fn bullets<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Section::List {
            ordered: false,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numbered<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Section::List {
            ordered: true,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Section::Paragraph { text: text.into() }
    }

    /// Heading level, `None` for non-heading sections.
    pub fn level(&self) -> Option<u8> {
        match self {
            Section::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// True when the section would render nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Section::Heading { title, content, .. } => {
                title.trim().is_empty() && content.trim().is_empty()
            }
            Section::Code { code, .. } => code.trim().is_empty(),
            Section::List { items, .. } => items.iter().all(|i| i.trim().is_empty()),
            Section::Paragraph { text } => text.trim().is_empty(),
        }
    }

    pub fn render_markdown(&self) -> String {
        match self {
            Section::Heading {
                level,
                title,
                content,
            } => {
                let marker = "#".repeat(usize::from(*level));
                format!("{} {}\n\n{}", marker, title, content)
            }
            Section::Code { language, code } => format!("```{}\n{}\n```", language, code),
            Section::List { ordered, items } => render_list(*ordered, items),
            Section::Paragraph { text } => text.clone(),
        }
    }

    /// Markup-free rendering: headings lose their markers and code is indented.
    pub fn render_plain(&self) -> String {
        match self {
            Section::Heading { title, content, .. } => {
                if content.is_empty() {
                    title.clone()
                } else {
                    format!("{}\n\n{}", title, content)
                }
            }
            Section::Code { code, .. } => code
                .lines()
                .map(|line| format!("    {}", line))
                .collect::<Vec<_>>()
                .join("\n"),
            Section::List { ordered, items } => render_list(*ordered, items),
            Section::Paragraph { text } => text.clone(),
        }
    }
}

fn render_list(ordered: bool, items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if ordered {
                format!("{}. {}", i + 1, item)
            } else {
                format!("- {}", item)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
