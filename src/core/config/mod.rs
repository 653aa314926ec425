//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. `$CASCADEWORK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cascadework/config.toml`
//! 3. `~/.cascadework/config.toml`
//!
//! Missing files are not an error; defaults are used.
//!
//! # Precedence
//!
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Example
//!
//! ```no_run
//! use cascadework::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("metric concurrency: {}", config.metric_concurrency());
//! println!("cleanup policy: {}", config.cleanup_policy());
//! ```

pub mod schema;

pub use schema::{CleanupPolicy, ConfigFile, EngineConfig, LogConfig, StoreConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CASCADEWORK_CONFIG";

/// Default store file name, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "cascadework.json";

const DEFAULT_LIBRARY_PAGE_SIZE: usize = 30;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: ConfigFile,
    /// Path the file was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file = Self::parse(&contents).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap already-parsed file contents.
    pub fn from_file(file: ConfigFile) -> Self {
        Self { file, path: None }
    }

    /// Parse and validate config file contents.
    pub fn parse(contents: &str) -> Result<ConfigFile, ConfigError> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("cascadework/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".cascadework/config.toml"))
            .filter(|path| path.exists())
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Maximum in-flight metric calls per tree build (default 1).
    pub fn metric_concurrency(&self) -> usize {
        self.file
            .engine
            .as_ref()
            .and_then(|e| e.metric_concurrency)
            .unwrap_or(1)
    }

    /// Cleanup failure policy (default best-effort).
    pub fn cleanup_policy(&self) -> CleanupPolicy {
        self.file
            .engine
            .as_ref()
            .and_then(|e| e.cleanup_policy)
            .unwrap_or_default()
    }

    /// Default library page size (default 30).
    pub fn library_page_size(&self) -> usize {
        self.file
            .engine
            .as_ref()
            .and_then(|e| e.library_page_size)
            .unwrap_or(DEFAULT_LIBRARY_PAGE_SIZE)
    }

    /// Store file path (default `./cascadework.json`).
    pub fn store_path(&self) -> PathBuf {
        self.file
            .store
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }

    /// Configured log filter directive, if any.
    pub fn log_filter(&self) -> Option<&str> {
        self.file.log.as_ref().and_then(|l| l.filter.as_deref())
    }
}
