//! Configuration schema for the case runner.
//!
//! This module defines the static configuration consumed by the executor and
//! credential manager, together with its defaults and validation rules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static configuration for a test run.
///
/// Missing keys fall back to the defaults below; [`RunnerConfig::validate`]
/// must pass before the configuration is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Base URL that relative request URLs and the login path are joined to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the password-login endpoint, appended to `base_url`.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Account name sent to the login endpoint.
    #[serde(default)]
    pub account: String,

    /// Password sent to the login endpoint.
    #[serde(default)]
    pub password: String,

    /// Per-attempt request timeout in milliseconds.
    ///
    /// Applies to every HTTP attempt, including login calls. Must be > 0.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Dotted path of the token inside a successful login response.
    #[serde(default = "default_token_field")]
    pub token_field: String,

    /// Variable-store key the token is written under.
    #[serde(default = "default_token_key")]
    pub token_key: String,

    /// Body substrings that mark the current credential as no longer accepted.
    #[serde(default = "default_invalid_markers")]
    pub invalid_markers: Vec<String>,

    /// How the stored token is rendered into the `Authorization` header.
    #[serde(default)]
    pub token_scheme: TokenScheme,

    /// Whether suite bootstrap logs in before the first case.
    #[serde(default = "default_true")]
    pub auto_login: bool,

    /// How many times a case failing validation is re-run.
    #[serde(default = "default_max_case_retries")]
    pub max_case_retries: u32,

    /// Maximum number of cases executing at the same time. Must be > 0.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Whether failure summaries are forwarded to the notifier.
    #[serde(default)]
    pub notify_enabled: bool,

    /// Headers added to every request unless the row sets them.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

/// Rendering of the stored token in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScheme {
    /// The token is sent verbatim.
    #[default]
    Raw,
    /// The token is sent as `Bearer <token>`.
    Bearer,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            account: String::new(),
            password: String::new(),
            timeout_ms: default_timeout_ms(),
            token_field: default_token_field(),
            token_key: default_token_key(),
            invalid_markers: default_invalid_markers(),
            token_scheme: TokenScheme::default(),
            auto_login: true,
            max_case_retries: default_max_case_retries(),
            parallelism: default_parallelism(),
            notify_enabled: false,
            default_headers: HashMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Validates the configuration and returns a message for the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeoutMs must be greater than 0".to_string());
        }

        if self.parallelism == 0 {
            return Err("parallelism must be greater than 0".to_string());
        }

        match url::Url::parse(&self.base_url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(parsed) => {
                return Err(format!(
                    "baseUrl must use http or https, got: {}",
                    parsed.scheme()
                ))
            }
            Err(e) => return Err(format!("baseUrl is not a valid URL: {}", e)),
        }

        if self.token_field.trim().is_empty() {
            return Err("tokenField must not be empty".to_string());
        }

        if self.token_key.trim().is_empty() {
            return Err("tokenKey must not be empty".to_string());
        }

        Ok(())
    }

    /// Returns the per-attempt timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// Full URL of the login endpoint.
    pub fn login_url(&self) -> String {
        join_base_url(&self.base_url, &self.login_path)
    }

    /// Joins a relative path to the base URL; absolute http(s) URLs pass through.
    pub fn absolute_url(&self, url: &str) -> String {
        if is_absolute_http(url) {
            url.to_string()
        } else {
            join_base_url(&self.base_url, url)
        }
    }
}

fn is_absolute_http(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Concatenates base and path with exactly one `/` between them.
fn join_base_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// Default value functions for serde

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_login_path() -> String {
    "/MerchantUsers/PasswordLogin".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_token_field() -> String {
    "data.AccessToken".to_string()
}

fn default_token_key() -> String {
    "login_token".to_string()
}

fn default_invalid_markers() -> Vec<String> {
    vec!["token失效".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_max_case_retries() -> u32 {
    1
}

fn default_parallelism() -> usize {
    4
}
