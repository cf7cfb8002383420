//! Dot-separated field paths with optional array indices.
//!
//! Grammar: segments separated by `.`; each segment is `name` or `name[index]`
//! where `index` is a non-negative integer. Examples: `data.AccessToken`,
//! `data.list[0].id`.

use super::error::FieldError;
use serde_json::Value;

/// One step of a path walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object field access (e.g., "data", "id")
    Field(String),

    /// Array element access (e.g., [0], [3])
    ArrayIndex(usize),
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidPath`] for an empty path, an empty
    /// segment, a bracket without a field name, or a non-numeric index.
    pub fn parse(path: &str) -> Result<Self, FieldError> {
        let raw = path.trim();
        let invalid = |reason: &str| FieldError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }

            match part.find('[') {
                None => {
                    if part.contains(']') {
                        return Err(invalid("unbalanced ']'"));
                    }
                    segments.push(PathSegment::Field(part.to_string()));
                }
                Some(open) => {
                    let name = &part[..open];
                    if name.is_empty() {
                        return Err(invalid("index without a field name"));
                    }
                    let rest = &part[open + 1..];
                    let inner = rest
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("missing closing ']'"))?;
                    let index = inner
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| invalid(&format!("'{}' is not a valid index", inner)))?;

                    segments.push(PathSegment::Field(name.to_string()));
                    segments.push(PathSegment::ArrayIndex(index));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The trimmed source text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walks `root` along this path.
    ///
    /// A field whose value is JSON `null` counts as present. An index step
    /// requires the current node to be an array with enough elements.
    pub fn walk<'a>(&self, root: &'a Value) -> Result<&'a Value, FieldError> {
        let mut current = root;
        let mut last_field = "";

        for segment in &self.segments {
            current = match segment {
                PathSegment::Field(name) => {
                    last_field = name.as_str();
                    current.get(name.as_str()).ok_or_else(|| FieldError::PathNotFound {
                        path: self.raw.clone(),
                        segment: name.clone(),
                    })?
                }
                PathSegment::ArrayIndex(index) => {
                    let items = current.as_array().ok_or_else(|| FieldError::PathNotFound {
                        path: self.raw.clone(),
                        segment: format!("{}[{}] (not an array)", last_field, index),
                    })?;
                    items.get(*index).ok_or_else(|| FieldError::PathNotFound {
                        path: self.raw.clone(),
                        segment: format!(
                            "{}[{}] (index out of range, length {})",
                            last_field,
                            index,
                            items.len()
                        ),
                    })?
                }
            };
        }

        Ok(current)
    }
}
