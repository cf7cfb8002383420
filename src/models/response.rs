//! HTTP response data models.
//!
//! The executor hands back a [`ResponseDescriptor`] for every completed
//! attempt. It is immutable once returned; validation and extraction read the
//! body text through the `validator` module.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Number of body characters included in log previews.
const BODY_PREVIEW_CHARS: usize = 200;

/// Represents the final HTTP response of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status_code: u16,

    /// Response body decoded as UTF-8 text.
    pub body: String,

    /// Response headers. Repeated headers are joined with `;`.
    pub headers: HashMap<String, String>,

    /// Wall-clock time of the attempt in milliseconds.
    pub duration_ms: u64,
}

impl ResponseDescriptor {
    /// Creates a new response with the given status code and body.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            headers: HashMap::new(),
            duration_ms: 0,
        }
    }

    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Looks up a header value, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Reads the top-level `code` field of a JSON object body.
    ///
    /// Accepts both numeric and numeric-string codes. Returns `None` when the
    /// body is not a JSON object or carries no usable `code`.
    pub fn body_code(&self) -> Option<i64> {
        let json: JsonValue = serde_json::from_str(&self.body).ok()?;
        match json.get("code")? {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns at most the first 200 characters of the body, for logging.
    pub fn body_preview(&self) -> String {
        if self.body.chars().count() > BODY_PREVIEW_CHARS {
            let head: String = self.body.chars().take(BODY_PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.body.clone()
        }
    }
}
