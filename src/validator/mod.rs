//! Response field access: navigation, validation and extraction.
//!
//! Every operation takes the raw response body, parses it as JSON and walks a
//! [`FieldPath`] through it. Validation compares the field's textual form
//! against a [`ValidationDirective`]; extraction copies it into the shared
//! [`VariableStore`].

pub mod directive;
pub mod error;
pub mod path;

pub use directive::ValidationDirective;
pub use error::FieldError;
pub use path::{FieldPath, PathSegment};

use crate::variables::VariableStore;
use serde_json::Value;

/// Textual form of a JSON node.
///
/// Strings are returned raw, numbers and booleans in their canonical form,
/// objects and arrays as compact JSON. `null` has no text.
pub fn node_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Splits a `;` list into trimmed items, dropping trailing empty ones.
fn split_list(raw: &str) -> Vec<&str> {
    let mut items: Vec<&str> = raw.split(';').map(str::trim).collect();
    while items.last().map_or(false, |item| item.is_empty()) {
        items.pop();
    }
    items
}

fn parse_body(json: &str) -> Result<Value, FieldError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads, checks and captures fields of JSON response bodies.
#[derive(Debug, Clone)]
pub struct ResponseFieldAccessor {
    store: VariableStore,
}

impl ResponseFieldAccessor {
    /// Creates an accessor that extracts into `store`
    pub fn new(store: VariableStore) -> Self {
        Self { store }
    }

    /// Returns the node at `path`.
    ///
    /// # Errors
    ///
    /// [`FieldError::InvalidJson`] if the body does not parse,
    /// [`FieldError::InvalidPath`] for a malformed path and
    /// [`FieldError::PathNotFound`] when a segment is missing.
    pub fn navigate(&self, json: &str, path: &str) -> Result<Value, FieldError> {
        let root = parse_body(json)?;
        let path = FieldPath::parse(path)?;
        path.walk(&root).cloned()
    }

    /// Validates one field against an expected-value directive.
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_case_runner::validator::ResponseFieldAccessor;
    /// use rest_case_runner::variables::VariableStore;
    ///
    /// let accessor = ResponseFieldAccessor::new(VariableStore::new());
    /// let body = r#"{"data":{"id":12345}}"#;
    ///
    /// assert!(accessor.validate(body, "data.id", "regex:\\d+").is_ok());
    /// assert!(accessor.validate(body, "data.id", "not_null").is_ok());
    /// assert!(accessor.validate(body, "data.id", "123").is_err());
    /// ```
    pub fn validate(&self, json: &str, path: &str, expected: &str) -> Result<(), FieldError> {
        let root = parse_body(json)?;
        check_field(&root, path, expected)
    }

    /// Validates several fields at once.
    ///
    /// `paths` and `expected` are `;`-separated lists paired by position; each
    /// item is trimmed and trailing empty items are dropped. The counts are
    /// compared before anything is evaluated, then pairs are checked in order
    /// and the first failure is returned.
    pub fn validate_multiple(
        &self,
        json: &str,
        paths: &str,
        expected: &str,
    ) -> Result<(), FieldError> {
        let path_list = split_list(paths);
        let value_list = split_list(expected);

        if path_list.len() != value_list.len() {
            return Err(FieldError::CountMismatch {
                paths: path_list.len(),
                values: value_list.len(),
            });
        }

        let root = parse_body(json)?;
        for (path, value) in path_list.iter().zip(value_list.iter()) {
            check_field(&root, path, value)?;
        }
        Ok(())
    }

    /// Copies the text of the field at `path` into the store under `key`.
    ///
    /// Returns the stored text. A JSON `null` field is stored as the empty
    /// string.
    pub fn extract(&self, json: &str, path: &str, key: &str) -> Result<String, FieldError> {
        let wrap = |cause: FieldError| FieldError::ExtractionFailure {
            path: path.to_string(),
            cause: Box::new(cause),
        };

        let node = self.navigate(json, path).map_err(wrap)?;
        let text = node_text(&node).unwrap_or_default();
        self.store.put(key, text.clone());
        log::debug!("extracted '{}' into variable '{}'", path, key);
        Ok(text)
    }
}

fn check_field(root: &Value, path: &str, expected: &str) -> Result<(), FieldError> {
    let field_path = FieldPath::parse(path)?;
    let node = field_path.walk(root)?;
    let text = node_text(node);
    ValidationDirective::parse(expected).check(field_path.as_str(), text.as_deref())
}
