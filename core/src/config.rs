//! Engine configuration.
//!
//! ```toml
//! initial_phase = "to-pickup"
//! transition_timeout_ms = 30000
//! max_retries = 2
//! retry_delay_ms = 1000
//! # action_timeout_ms = 10000
//! ```

use crate::phase::NavigationPhase;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TRANSITION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
/// Upper bound on `max_retries`; more than this is almost certainly a typo.
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Timeouts, retry policy and starting phase of a phase engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub initial_phase: NavigationPhase,
    /// Cumulative budget shared by every action of one transition
    pub transition_timeout_ms: u64,
    /// Optional cap on a single attempt, still bounded by the budget
    pub action_timeout_ms: Option<u64>,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_phase: NavigationPhase::ToPickup,
            transition_timeout_ms: DEFAULT_TRANSITION_TIMEOUT_MS,
            action_timeout_ms: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transition_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "transition_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.retry_delay_ms >= self.transition_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "retry_delay_ms ({}) must be shorter than transition_timeout_ms ({})",
                self.retry_delay_ms, self.transition_timeout_ms
            )));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_retries ({}) exceeds the limit of {}",
                self.max_retries, MAX_RETRIES_LIMIT
            )));
        }
        if self.action_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "action_timeout_ms must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }

    pub fn with_initial_phase(mut self, phase: NavigationPhase) -> Self {
        self.initial_phase = phase;
        self
    }

    pub fn with_transition_timeout(mut self, timeout: Duration) -> Self {
        self.transition_timeout_ms = millis(timeout);
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout_ms = Some(millis(timeout));
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = millis(delay);
        self
    }

    pub fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }

    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_ms.map(Duration::from_millis)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_huge_durations_saturate() {
        let config = EngineConfig::default()
            .with_transition_timeout(Duration::MAX)
            .with_action_timeout(Duration::MAX)
            .with_retry_delay(Duration::from_millis(1500));
        assert_eq!(config.transition_timeout_ms, u64::MAX);
        assert_eq!(config.action_timeout_ms, Some(u64::MAX));
        assert_eq!(config.retry_delay_ms, 1500);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.transition_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.action_timeout(), None);
        assert_eq!(config.initial_phase, NavigationPhase::ToPickup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            initial_phase = "picking-up"
            max_retries = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.initial_phase, NavigationPhase::PickingUp);
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.retry_delay_ms, DEFAULT_RETRY_DELAY_MS);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = EngineConfig::from_toml_str("retries = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_delay_longer_than_budget_is_invalid() {
        let err = EngineConfig::from_toml_str(
            r#"
            transition_timeout_ms = 500
            retry_delay_ms = 1000
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "action_timeout_ms = 5000").unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.action_timeout(), Some(Duration::from_secs(5)));

        let missing = EngineConfig::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
