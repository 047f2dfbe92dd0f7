//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `AGENT_COMMS` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working config.
//!
//! # Example
//!
//! ```no_run
//! use agent_comms::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("History capacity: {}", config.orchestrator.history_capacity);
//! ```

mod error;
mod logging;
mod orchestrator;
mod profile;
mod response;
mod tracker;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use orchestrator::OrchestratorConfig;
pub use profile::ProfileConfig;
pub use response::ResponseConfig;
pub use tracker::TrackerConfig;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "AGENT_COMMS";
const ENV_SEPARATOR: &str = "__";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Milestone tracking and the real-time sweep
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// User profile history
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Response length and layout limits
    #[serde(default)]
    pub response: ResponseConfig,

    /// History bounds and cleanup schedule
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `AGENT_COMMS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `AGENT_COMMS__TRACKER__REALTIME_UPDATES=true` -> `tracker.realtime_updates = true`
    /// - `AGENT_COMMS__LOGGING__LEVEL=debug` -> `logging.level = "debug"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a TOML or YAML file, with environment
    /// variables layered on top.
    ///
    /// The format is inferred from the file extension.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tracker.validate()?;
        self.profile.validate()?;
        self.response.validate()?;
        self.orchestrator.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("AGENT_COMMS__TRACKER__REALTIME_UPDATES");
        env::remove_var("AGENT_COMMS__ORCHESTRATOR__HISTORY_CAPACITY");
        env::remove_var("AGENT_COMMS__LOGGING__LEVEL");
    }

    #[test]
    fn test_load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.orchestrator.history_capacity, 1_000);
        assert_eq!(config.profile.history_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AGENT_COMMS__TRACKER__REALTIME_UPDATES", "true");
        env::set_var("AGENT_COMMS__ORCHESTRATOR__HISTORY_CAPACITY", "2000");
        env::set_var("AGENT_COMMS__LOGGING__LEVEL", "debug");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.tracker.realtime_updates);
        assert_eq!(config.orchestrator.history_capacity, 2_000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[tracker]\ndefault_estimate_minutes = 45\n\n[response]\ndefault_max_length = 2000"
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.tracker.default_estimate_minutes, 45);
        assert_eq!(config.response.default_max_length, 2_000);
        assert_eq!(config.response.hard_max_length, 8_000);
    }

    #[test]
    fn test_validate_reports_first_error() {
        let mut config = AppConfig::default();
        config.orchestrator.history_trim_to = 5_000;
        assert_eq!(config.validate(), Err(ValidationError::InvalidHistoryTrim));
    }
}
