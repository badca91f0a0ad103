//! Watchdog thresholds.

use crate::errors::WatchdogError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default warning threshold in milliseconds.
pub const DEFAULT_WARNING_THRESHOLD_MS: u64 = 1_000;

/// Default expiry threshold in milliseconds.
pub const DEFAULT_EXPIRY_THRESHOLD_MS: u64 = 5_000;

/// Thresholds of the execution-time watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Runs older than this are reported as overtime.
    #[serde(alias = "warningThresholdMs")]
    pub warning_threshold_ms: u64,
    /// Runs older than this are expired and cancelled.
    #[serde(alias = "expiryThresholdMs")]
    pub expiry_threshold_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            warning_threshold_ms: DEFAULT_WARNING_THRESHOLD_MS,
            expiry_threshold_ms: DEFAULT_EXPIRY_THRESHOLD_MS,
        }
    }
}

impl WatchdogConfig {
    /// Creates a config with the given thresholds.
    #[must_use]
    pub const fn new(warning_threshold_ms: u64, expiry_threshold_ms: u64) -> Self {
        Self {
            warning_threshold_ms,
            expiry_threshold_ms,
        }
    }

    /// Checks that the warning threshold is positive and not above the
    /// expiry threshold.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::InvalidThresholds`] otherwise.
    pub fn validate(&self) -> Result<(), WatchdogError> {
        if self.warning_threshold_ms == 0 || self.expiry_threshold_ms < self.warning_threshold_ms {
            return Err(WatchdogError::InvalidThresholds {
                warning_ms: self.warning_threshold_ms,
                expiry_ms: self.expiry_threshold_ms,
            });
        }
        Ok(())
    }

    /// The warning threshold.
    #[must_use]
    pub const fn warning_threshold(&self) -> Duration {
        Duration::from_millis(self.warning_threshold_ms)
    }

    /// The expiry threshold.
    #[must_use]
    pub const fn expiry_threshold(&self) -> Duration {
        Duration::from_millis(self.expiry_threshold_ms)
    }

    /// How often the poller scans: a tenth of the warning threshold, at
    /// least one millisecond.
    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis((self.warning_threshold_ms / 10).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = WatchdogConfig::default();
        assert_eq!(config.warning_threshold(), Duration::from_secs(1));
        assert_eq!(config.expiry_threshold(), Duration::from_secs(5));
        assert_eq!(config.poll_period(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_period_floor() {
        assert_eq!(WatchdogConfig::new(5, 10).poll_period(), Duration::from_millis(1));
    }

    #[test]
    fn test_validate() {
        assert!(WatchdogConfig::new(10, 10).validate().is_ok());
        assert_eq!(
            WatchdogConfig::new(0, 10).validate(),
            Err(WatchdogError::InvalidThresholds {
                warning_ms: 0,
                expiry_ms: 10
            })
        );
        assert!(WatchdogConfig::new(20, 10).validate().is_err());
    }

    #[test]
    fn test_deserialize_aliases_and_defaults() {
        let config: WatchdogConfig =
            serde_json::from_str(r#"{"warningThresholdMs": 200}"#).unwrap();
        assert_eq!(config, WatchdogConfig::new(200, DEFAULT_EXPIRY_THRESHOLD_MS));

        let config: WatchdogConfig =
            serde_json::from_str(r#"{"warning_threshold_ms": 1, "expiry_threshold_ms": 2}"#)
                .unwrap();
        assert_eq!(config, WatchdogConfig::new(1, 2));
    }
}
