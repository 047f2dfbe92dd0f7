//! Orchestrator history and cleanup configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Orchestrator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// History entries kept before trimming
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Entries kept after a trim, most recent first
    #[serde(default = "default_history_trim_to")]
    pub history_trim_to: usize,

    /// Seconds between cleanup sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Entries idle for longer than this are purged by cleanup
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

impl OrchestratorConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_capacity == 0 || self.history_trim_to >= self.history_capacity {
            return Err(ValidationError::InvalidHistoryTrim);
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ValidationError::ZeroInterval(
                "orchestrator.cleanup_interval_secs",
            ));
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            history_trim_to: default_history_trim_to(),
            cleanup_interval_secs: default_cleanup_interval(),
            max_age_secs: default_max_age(),
        }
    }
}

fn default_history_capacity() -> usize {
    1_000
}

fn default_history_trim_to() -> usize {
    500
}

fn default_cleanup_interval() -> u64 {
    3_600
}

fn default_max_age() -> u64 {
    24 * 3_600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_1000_trim_to_500() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.history_capacity, 1_000);
        assert_eq!(config.history_trim_to, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trim_target_must_be_below_capacity() {
        let config = OrchestratorConfig {
            history_trim_to: 1_000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidHistoryTrim));
    }
}
