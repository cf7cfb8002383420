//! HTTP request data models.
//!
//! This module defines the per-call request descriptor handed to the executor,
//! together with the `K=V;K=V` raw header format used by test-case rows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP request method.
///
/// Only the methods a test-case row may name are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    /// Parses a method name, ignoring case and surrounding whitespace.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string names a supported method, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            _ => None,
        }
    }

    /// Whether requests with this method carry a body on the wire.
    ///
    /// GET and DELETE are always sent without one.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single request as handed to the executor.
///
/// All text fields may still contain `${name}` placeholders; they are resolved
/// by the executor right before dispatch. Constructed per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: HttpMethod,

    /// Absolute URL, or a path relative to the configured base URL.
    pub url: String,

    /// Optional request body text.
    pub body: Option<String>,

    /// Headers in `K1=V1;K2=V2` form.
    pub raw_headers: String,
}

impl RequestDescriptor {
    /// Creates a descriptor without body or headers.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            raw_headers: String::new(),
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the raw header string.
    pub fn with_headers(mut self, raw_headers: impl Into<String>) -> Self {
        self.raw_headers = raw_headers.into();
        self
    }
}

/// Parses a raw `K=V;K=V` header string into a map.
///
/// Pairs are split on `;`, each pair on its first `=`, and both sides are
/// trimmed. Pairs without `=` or with an empty name are dropped. A later
/// duplicate name overwrites an earlier one.
///
/// # Examples
///
/// ```
/// use rest_case_runner::models::request::parse_raw_headers;
///
/// let headers = parse_raw_headers("Content-Type=application/json; X-Trace = a=b");
/// assert_eq!(headers.get("Content-Type").unwrap(), "application/json");
/// assert_eq!(headers.get("X-Trace").unwrap(), "a=b");
/// ```
pub fn parse_raw_headers(raw: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    if raw.trim().is_empty() {
        return headers;
    }

    for pair in raw.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            headers.insert(name.to_string(), value.trim().to_string());
        }
    }

    headers
}

/// Finds a header value by name, ignoring ASCII case.
pub fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
