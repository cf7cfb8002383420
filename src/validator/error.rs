//! Field accessor error types.

use crate::failure::FailureClass;
use std::fmt;

/// Errors raised while navigating, validating or extracting response fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// The response body is not valid JSON.
    InvalidJson(String),

    /// The path expression is malformed (empty segment, bad index, ...).
    InvalidPath { path: String, reason: String },

    /// A segment of the path does not exist in the document.
    PathNotFound { path: String, segment: String },

    /// The resolved value does not satisfy the directive.
    ValidationFailure { path: String, message: String },

    /// A `regex:` directive carries a pattern that does not compile.
    InvalidPattern { pattern: String, message: String },

    /// The path list and value list have different lengths.
    CountMismatch { paths: usize, values: usize },

    /// A value could not be extracted into the variable store.
    ExtractionFailure { path: String, cause: Box<FieldError> },
}

impl FieldError {
    /// Classification used for retry decisions and status labels.
    pub fn class(&self) -> FailureClass {
        match self {
            FieldError::InvalidPath { .. } | FieldError::PathNotFound { .. } => {
                FailureClass::PathNotFound
            }
            FieldError::CountMismatch { .. } => FailureClass::CountMismatch,
            FieldError::ExtractionFailure { .. } => FailureClass::ExtractionFailure,
            FieldError::InvalidJson(_)
            | FieldError::ValidationFailure { .. }
            | FieldError::InvalidPattern { .. } => FailureClass::ValidationFailure,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidJson(msg) => write!(f, "Response body is not valid JSON: {}", msg),
            FieldError::InvalidPath { path, reason } => {
                write!(f, "Invalid field path '{}': {}", path, reason)
            }
            FieldError::PathNotFound { path, segment } => {
                write!(f, "Path segment '{}' not found (full path: {})", segment, path)
            }
            FieldError::ValidationFailure { path, message } => {
                write!(f, "Field [{}] {}", path, message)
            }
            FieldError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid regex '{}': {}", pattern, message)
            }
            FieldError::CountMismatch { paths, values } => write!(
                f,
                "Field count mismatch: {} paths but {} expected values",
                paths, values
            ),
            FieldError::ExtractionFailure { path, cause } => {
                write!(f, "Failed to extract field '{}': {}", path, cause)
            }
        }
    }
}

impl std::error::Error for FieldError {}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::InvalidJson(err.to_string())
    }
}
