//! Configuration management for the case runner.
//!
//! Configuration is read from a JSON document, merged over the defaults in
//! [`schema`], and validated. There is no process-wide configuration: the
//! loaded [`RunnerConfig`] is handed to a `RunContext` explicitly.

pub mod schema;

pub use schema::{RunnerConfig, TokenScheme};

use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    IoError(String),

    /// The configuration document is not valid JSON or has wrong field types.
    ParseError(String),

    /// The configuration parsed but failed validation.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Failed to read configuration: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl RunnerConfig {
    /// Builds a validated configuration from an in-memory JSON value.
    ///
    /// # Example
    ///
    /// ```
    /// use rest_case_runner::config::RunnerConfig;
    /// use serde_json::json;
    ///
    /// let config = RunnerConfig::from_json(json!({
    ///     "baseUrl": "http://api.example.com",
    ///     "timeoutMs": 2000
    /// }))
    /// .unwrap();
    /// assert_eq!(config.timeout_ms, 2000);
    /// ```
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        let config: RunnerConfig = serde_json::from_value(value)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Loads and validates configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<RunnerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;
    let config = RunnerConfig::from_json(raw)?;

    log::debug!(
        "loaded configuration from {} (base url {})",
        path.display(),
        config.base_url
    );

    Ok(config)
}
