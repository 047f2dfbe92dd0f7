//! Response composition configuration

use serde::Deserialize;

use crate::domain::response::{cli, CliLimits};

use super::error::ValidationError;

/// Response length and terminal layout limits
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseConfig {
    /// Length budget when the reader states no preference
    #[serde(default = "default_max_length")]
    pub default_max_length: usize,

    /// Absolute ceiling on any rendered response
    #[serde(default = "default_hard_max_length")]
    pub hard_max_length: usize,

    /// Deepest heading level kept in CLI output
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,

    #[serde(default = "default_width")]
    pub default_width: u16,

    #[serde(default = "default_min_width")]
    pub min_width: u16,

    #[serde(default = "default_max_width")]
    pub max_width: u16,
}

impl ResponseConfig {
    pub fn cli_limits(&self) -> CliLimits {
        CliLimits {
            hard_max_length: self.hard_max_length,
            max_depth: self.max_depth,
            default_width: self.default_width,
            min_width: self.min_width,
            max_width: self.max_width,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_max_length > self.hard_max_length {
            return Err(ValidationError::MaxLengthExceedsHardCap);
        }
        if self.min_width == 0
            || self.min_width > self.max_width
            || !(self.min_width..=self.max_width).contains(&self.default_width)
        {
            return Err(ValidationError::InvalidWidthBounds);
        }
        if !(1..=6).contains(&self.max_depth) {
            return Err(ValidationError::InvalidMaxDepth);
        }
        Ok(())
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_max_length: default_max_length(),
            hard_max_length: default_hard_max_length(),
            max_depth: default_max_depth(),
            default_width: default_width(),
            min_width: default_min_width(),
            max_width: default_max_width(),
        }
    }
}

fn default_max_length() -> usize {
    crate::domain::context::DEFAULT_MAX_LENGTH
}

fn default_hard_max_length() -> usize {
    cli::HARD_MAX_LENGTH
}

fn default_max_depth() -> u8 {
    cli::MAX_HEADING_DEPTH
}

fn default_width() -> u16 {
    cli::DEFAULT_WIDTH
}

fn default_min_width() -> u16 {
    cli::MIN_WIDTH
}

fn default_max_width() -> u16 {
    cli::MAX_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_limits() {
        let config = ResponseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cli_limits(), CliLimits::default());
    }

    #[test]
    fn default_length_above_hard_cap_is_rejected() {
        let config = ResponseConfig {
            default_max_length: 10_000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::MaxLengthExceedsHardCap));
    }

    #[test]
    fn inverted_widths_are_rejected() {
        let config = ResponseConfig {
            min_width: 100,
            max_width: 60,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWidthBounds));
    }
}
