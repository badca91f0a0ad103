//! Engine configuration.
//!
//! ```json
//! {
//!   "watchdog": { "warningThresholdMs": 1000, "expiryThresholdMs": 5000 },
//!   "logging": { "filter": "logpipe=debug,info", "format": "json" }
//! }
//! ```
//!
//! Every section and field is optional.

use crate::errors::ConfigError;
use crate::watchdog::WatchdogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Watchdog thresholds.
    pub watchdog: WatchdogConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or the values are
    /// inconsistent.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or
    /// [`from_json_str`](Self::from_json_str) fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that the values are consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if the watchdog thresholds are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watchdog.validate()?;
        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `"logpipe=debug,info"`.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WatchdogError;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.watchdog.warning_threshold_ms, 1_000);
        assert_eq!(config.watchdog.expiry_threshold_ms, 5_000);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_parse_sections() {
        let config = EngineConfig::from_json_str(
            r#"{
                "watchdog": {"warningThresholdMs": 200, "expiryThresholdMs": 800},
                "logging": {"filter": "logpipe=debug", "format": "json"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.watchdog, WatchdogConfig::new(200, 800));
        assert_eq!(config.logging.filter, "logpipe=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_thresholds() {
        let err = EngineConfig::from_json_str(
            r#"{"watchdog": {"warning_threshold_ms": 500, "expiry_threshold_ms": 100}}"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid(WatchdogError::InvalidThresholds {
                warning_ms: 500,
                expiry_ms: 100
            })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{ watchdog"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"watchdog": {{"warningThresholdMs": 50, "expiryThresholdMs": 50}}}}"#)
            .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.watchdog, WatchdogConfig::new(50, 50));

        assert!(matches!(
            EngineConfig::from_file(file.path().with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
