//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Accepts a bare level or a directive list such as `info,agent_comms=debug`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let valid = self.level.split(',').all(|directive| {
            let level = directive.rsplit('=').next().unwrap_or_default().trim();
            LEVELS.contains(&level.to_ascii_lowercase().as_str())
        });
        if valid {
            Ok(())
        } else {
            Err(ValidationError::InvalidLogLevel(self.level.clone()))
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_directives() {
        let config = LoggingConfig {
            level: "info,agent_comms=debug".to_string(),
            json: true,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            json: false,
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLogLevel("loud".to_string()))
        );
    }
}
