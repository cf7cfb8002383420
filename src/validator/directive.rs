//! Expected-value directives.
//!
//! An expected value is interpreted as:
//! - `not_null` (any case): the field must be non-null and non-empty
//! - `regex:<p>`: the whole field text must match `<p>`
//! - `contains:<s>`: the field text must contain `<s>`
//! - anything else: the field text must equal it exactly

use super::error::FieldError;
use regex::Regex;

/// How an expected value is compared against a field's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationDirective {
    NotNull,
    Regex(String),
    Contains(String),
    Exact(String),
}

impl ValidationDirective {
    /// Interprets an expected-value string.
    pub fn parse(expected: &str) -> Self {
        if expected.eq_ignore_ascii_case("not_null") {
            ValidationDirective::NotNull
        } else if let Some(pattern) = expected.strip_prefix("regex:") {
            ValidationDirective::Regex(pattern.to_string())
        } else if let Some(needle) = expected.strip_prefix("contains:") {
            ValidationDirective::Contains(needle.to_string())
        } else {
            ValidationDirective::Exact(expected.to_string())
        }
    }

    /// Checks `text` (the field's textual form, `None` for JSON null).
    ///
    /// Returns a failure message on mismatch.
    pub fn check(&self, path: &str, text: Option<&str>) -> Result<(), FieldError> {
        let fail = |message: String| FieldError::ValidationFailure {
            path: path.to_string(),
            message,
        };

        match self {
            ValidationDirective::NotNull => match text {
                Some(t) if !t.is_empty() => Ok(()),
                Some(_) => Err(fail("expected a non-empty value".to_string())),
                None => Err(fail("expected a non-null value".to_string())),
            },
            ValidationDirective::Regex(pattern) => {
                let anchored = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                    FieldError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    }
                })?;
                match text {
                    Some(t) if anchored.is_match(t) => Ok(()),
                    Some(t) => Err(fail(format!(
                        "value '{}' does not match regex '{}'",
                        t, pattern
                    ))),
                    None => Err(fail(format!("null does not match regex '{}'", pattern))),
                }
            }
            ValidationDirective::Contains(needle) => match text {
                Some(t) if t.contains(needle.as_str()) => Ok(()),
                Some(t) => Err(fail(format!("value '{}' does not contain '{}'", t, needle))),
                None => Err(fail(format!("null does not contain '{}'", needle))),
            },
            ValidationDirective::Exact(expected) => match text {
                Some(t) if t == expected => Ok(()),
                Some(t) => Err(fail(format!("expected '{}' but was '{}'", expected, t))),
                None => Err(fail(format!("expected '{}' but was null", expected))),
            },
        }
    }
}
