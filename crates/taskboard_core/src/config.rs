//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe lock-wait and retry tuning for ordering transactions.
//! - Carry optional logging settings for hosts that bootstrap from a file.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - `max_attempts` is at least 1 after `validate()`.

use crate::db::tx::RetryPolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 25;

/// Errors from loading or validating [`CoreConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(std::io::Error),
    /// Config text is not valid JSON for this shape.
    Parse(serde_json::Error),
    /// Config parsed but violates a field constraint.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Tuning knobs for storage access and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// How long SQLite waits on a held lock before reporting `BUSY`.
    pub busy_timeout_ms: u64,
    /// Transaction attempts before a lock conflict is surfaced.
    pub max_attempts: u32,
    /// Pause between transaction attempts.
    pub retry_backoff_ms: u64,
    /// Log level passed to `init_logging` by hosts.
    pub log_level: Option<String>,
    /// Absolute log directory passed to `init_logging` by hosts.
    pub log_dir: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            log_level: None,
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(level) = self.log_level.as_deref() {
            if level.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "log_level must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Returns the transaction retry policy derived from this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::time::Duration;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_policy().max_attempts, 3);
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = CoreConfig::from_json_str(r#"{"max_attempts": 7, "retry_backoff_ms": 1}"#)
            .expect("partial config should parse");
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.retry_policy().backoff, Duration::from_millis(1));
        assert_eq!(config.busy_timeout_ms, 5_000);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let err = CoreConfig::from_json_str(r#"{"max_attempts": 0}"#)
            .expect_err("zero attempts must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = CoreConfig::from_json_str(r#"{"retries": 2}"#)
            .expect_err("unknown field must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
