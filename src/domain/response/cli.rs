//! Terminal-oriented limits applied after composition.

use serde::{Deserialize, Serialize};

use super::{FormattedResponse, Section};

pub const HARD_MAX_LENGTH: usize = 8_000;
pub const MAX_HEADING_DEPTH: u8 = 3;
pub const DEFAULT_WIDTH: u16 = 80;
pub const MIN_WIDTH: u16 = 40;
pub const MAX_WIDTH: u16 = 120;

/// Bounds a response must respect before it reaches a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliLimits {
    pub hard_max_length: usize,
    pub max_depth: u8,
    pub default_width: u16,
    pub min_width: u16,
    pub max_width: u16,
}

impl Default for CliLimits {
    fn default() -> Self {
        Self {
            hard_max_length: HARD_MAX_LENGTH,
            max_depth: MAX_HEADING_DEPTH,
            default_width: DEFAULT_WIDTH,
            min_width: MIN_WIDTH,
            max_width: MAX_WIDTH,
        }
    }
}

impl CliLimits {
    pub fn width_for(&self, terminal_width: Option<u16>) -> usize {
        let width = terminal_width.unwrap_or(self.default_width);
        usize::from(width.clamp(self.min_width, self.max_width))
    }

    pub fn length_for(&self, max_length: usize) -> usize {
        max_length.min(self.hard_max_length)
    }

    /// Clamps heading depth, wraps prose to the terminal width and then
    /// truncates to the smaller of `max_length` and the hard cap.
    pub fn optimize(
        &self,
        response: &FormattedResponse,
        max_length: usize,
        terminal_width: Option<u16>,
    ) -> FormattedResponse {
        let width = self.width_for(terminal_width);
        let max_depth = self.max_depth.max(1);
        let mut optimized = response.clone();
        optimized.map_sections(|section| match section {
            Section::Heading {
                level,
                title,
                content,
            } => Section::Heading {
                level: level.clamp(1, max_depth),
                title,
                content: wrap_text(&content, width),
            },
            Section::Paragraph { text } => Section::Paragraph {
                text: wrap_text(&text, width),
            },
            Section::List { ordered, items } => Section::List {
                ordered,
                items: items.iter().map(|item| wrap_text(item, width)).collect(),
            },
            code @ Section::Code { .. } => code,
        });
        optimized.truncate(self.length_for(max_length))
    }
}

/// Greedy word wrap per line. Words longer than `width` stay whole.
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}
