//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Interval must be greater than zero: {0}")]
    ZeroInterval(&'static str),

    #[error("Default estimate must be at least one minute")]
    InvalidDefaultEstimate,

    #[error("History limit must be greater than zero")]
    InvalidHistoryLimit,

    #[error("Default max length exceeds the hard maximum length")]
    MaxLengthExceedsHardCap,

    #[error("Render width bounds are inconsistent")]
    InvalidWidthBounds,

    #[error("Heading depth must be between 1 and 6")]
    InvalidMaxDepth,

    #[error("History trim target must be below capacity")]
    InvalidHistoryTrim,

    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}
