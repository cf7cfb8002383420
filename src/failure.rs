//! Failure classification shared by every stage of the pipeline.
//!
//! Each error type in the crate maps onto one [`FailureClass`]. The class is
//! what an outer retry policy branches on and what prefixes the reason string
//! handed to result sinks and notifiers.

use crate::models::ResponseDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a failed request or test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureClass {
    /// Network or IO failure, including timeouts.
    Transport,
    /// The server answered 404.
    ResourceNotFound,
    /// The credential was rejected even after one refresh.
    CredentialInvalid,
    /// Login or refresh itself failed.
    AuthBootstrapFailure,
    /// Status code or field value did not match.
    ValidationFailure,
    /// A field path did not resolve against the response.
    PathNotFound,
    /// Parallel path/value lists differ in length.
    CountMismatch,
    /// A field could not be extracted into the variable store.
    ExtractionFailure,
    /// The test-case row itself is unusable.
    InvalidCase,
}

impl FailureClass {
    /// Whether an outer per-case retry may re-run a case that failed this way.
    ///
    /// Only validation-type failures are retried; 404, credential, auth
    /// bootstrap and transport failures never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureClass::ValidationFailure
                | FailureClass::PathNotFound
                | FailureClass::CountMismatch
                | FailureClass::ExtractionFailure
        )
    }

    /// Status-label prefix for this class.
    ///
    /// Validation-type failures take their prefix from the `code` field of the
    /// response body when it carries a known error code.
    pub fn label_prefix(&self, response: Option<&ResponseDescriptor>) -> String {
        match self {
            FailureClass::ResourceNotFound => "FAIL-404".to_string(),
            FailureClass::CredentialInvalid => "FAIL-401".to_string(),
            FailureClass::AuthBootstrapFailure => "FAIL-AUTH".to_string(),
            FailureClass::Transport => "FAIL-TRANSPORT".to_string(),
            FailureClass::InvalidCase => "FAIL-CASE".to_string(),
            _ => match response.and_then(ResponseDescriptor::body_code) {
                Some(code @ (400 | 401 | 404 | 500)) => format!("FAIL-{}", code),
                _ => "FAIL".to_string(),
            },
        }
    }

    /// Builds the `"<prefix>: <message>"` reason string.
    pub fn reason(&self, message: &str, response: Option<&ResponseDescriptor>) -> String {
        format!("{}: {}", self.label_prefix(response), message)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureClass::Transport => "TransportError",
            FailureClass::ResourceNotFound => "ResourceNotFound",
            FailureClass::CredentialInvalid => "CredentialInvalid",
            FailureClass::AuthBootstrapFailure => "AuthBootstrapFailure",
            FailureClass::ValidationFailure => "ValidationFailure",
            FailureClass::PathNotFound => "PathNotFound",
            FailureClass::CountMismatch => "CountMismatch",
            FailureClass::ExtractionFailure => "ExtractionFailure",
            FailureClass::InvalidCase => "InvalidCase",
        };
        write!(f, "{}", name)
    }
}
