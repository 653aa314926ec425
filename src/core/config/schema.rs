//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g. concurrency must be at
//! least 1, log filters must not be blank).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [engine]
/// metric_concurrency = 4
/// cleanup_policy = "strict"
/// library_page_size = 30
///
/// [store]
/// path = "/var/lib/cascadework/store.json"
///
/// [log]
/// filter = "cascadework=debug"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Engine behaviour
    pub engine: Option<EngineConfig>,

    /// Store location
    pub store: Option<StoreConfig>,

    /// Logging
    pub log: Option<LogConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(engine) = &self.engine {
            engine.validate()?;
        }
        if let Some(log) = &self.log {
            if let Some(filter) = &log.filter {
                if filter.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "log.filter cannot be empty".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum in-flight metric calls while building a channel tree.
    pub metric_concurrency: Option<usize>,

    /// What to do when removing generated files fails during deletion.
    pub cleanup_policy: Option<CleanupPolicy>,

    /// Default page size of media library queries.
    pub library_page_size: Option<usize>,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.metric_concurrency == Some(0) {
            return Err(ConfigError::InvalidValue(
                "engine.metric_concurrency must be at least 1".into(),
            ));
        }
        if self.library_page_size == Some(0) {
            return Err(ConfigError::InvalidValue(
                "engine.library_page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Path of the JSON store file.
    pub path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"cascadework=debug"`.
    pub filter: Option<String>,
}

/// Handling of failed physical-file cleanup while deleting contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Log failures and keep going; recycling always happens.
    #[default]
    BestEffort,
    /// Abort the batch before recycling if any item failed.
    Strict,
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupPolicy::BestEffort => write!(f, "best_effort"),
            CleanupPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for CleanupPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best_effort" | "best-effort" => Ok(CleanupPolicy::BestEffort),
            "strict" => Ok(CleanupPolicy::Strict),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid cleanup policy '{}', must be one of: best_effort, strict",
                other
            ))),
        }
    }
}
