//! Automation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POLL_INTERVAL_SECS: u64 = 86_400;
const MAX_GRACE_DAYS: i64 = 365;

/// Settings for the periodic automation pass and activation defaults
#[derive(Debug, Clone, Deserialize)]
pub struct AutomationConfig {
    /// Run the scheduler at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between automation passes
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Days added to the equalization deadline to derive the end date on
    /// activation; passed to `CycleLifecycleService::with_end_date_grace_days`
    #[serde(default = "default_grace_days")]
    pub end_date_grace_days: i64,
}

impl AutomationConfig {
    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate automation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 || self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(ValidationError::InvalidPollInterval);
        }
        if !(0..=MAX_GRACE_DAYS).contains(&self.end_date_grace_days) {
            return Err(ValidationError::InvalidGracePeriod);
        }
        Ok(())
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_secs: default_poll_interval(),
            end_date_grace_days: default_grace_days(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    60
}

fn default_grace_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automation_config_defaults() {
        let config = AutomationConfig::default();
        assert!(config.enabled);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.end_date_grace_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_poll_interval_bounds() {
        let config = AutomationConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPollInterval));

        let config = AutomationConfig {
            poll_interval_secs: 86_401,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPollInterval));
    }

    #[test]
    fn test_validation_negative_grace() {
        let config = AutomationConfig {
            end_date_grace_days: -1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidGracePeriod));
    }

    #[test]
    fn test_validation_grace_above_a_year() {
        let config = AutomationConfig {
            end_date_grace_days: 366,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidGracePeriod));
    }
}
