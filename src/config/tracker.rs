//! Progress tracker configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Progress tracking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Run the real-time progress sweep
    #[serde(default)]
    pub realtime_updates: bool,

    /// Seconds between real-time sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Estimate for milestones specified without one
    #[serde(default = "default_estimate_minutes")]
    pub default_estimate_minutes: u64,
}

impl TrackerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn default_estimate(&self) -> Duration {
        Duration::from_secs(self.default_estimate_minutes.saturating_mul(60))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::ZeroInterval("tracker.sweep_interval_secs"));
        }
        if self.default_estimate_minutes == 0 {
            return Err(ValidationError::InvalidDefaultEstimate);
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            realtime_updates: false,
            sweep_interval_secs: default_sweep_interval(),
            default_estimate_minutes: default_estimate_minutes(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_estimate_minutes() -> u64 {
    30
}
