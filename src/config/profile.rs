//! User profile configuration

use serde::Deserialize;

use super::error::ValidationError;

/// User profile configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Interactions kept per profile
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_limit == 0 {
            return Err(ValidationError::InvalidHistoryLimit);
        }
        Ok(())
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(ProfileConfig::default().history_limit, 50);
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let config = ProfileConfig { history_limit: 0 };
        assert_eq!(config.validate(), Err(ValidationError::InvalidHistoryLimit));
    }
}
