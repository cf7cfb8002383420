//! Static property file loader.
//!
//! A property file is a JSON object: the `shared` key holds common
//! properties, the optional `active` key names the profile to use, and every
//! other key is a profile:
//!
//! ```json
//! {
//!   "shared": { "login.user": "qa" },
//!   "dev":    { "tenant": "dev-tenant" },
//!   "active": "dev"
//! }
//! ```

use super::models::{Profile, StaticProperties};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Errors that can occur during property loading
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesError {
    /// Failed to parse JSON content
    ParseError(String),

    /// Invalid format or structure in the property file
    InvalidFormat(String),

    /// IO error occurred while reading file
    IoError(String),
}

impl std::fmt::Display for PropertiesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertiesError::ParseError(msg) => write!(f, "Failed to parse property file: {}", msg),
            PropertiesError::InvalidFormat(msg) => write!(f, "Invalid property format: {}", msg),
            PropertiesError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for PropertiesError {}

impl From<io::Error> for PropertiesError {
    fn from(err: io::Error) -> Self {
        PropertiesError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for PropertiesError {
    fn from(err: serde_json::Error) -> Self {
        PropertiesError::ParseError(err.to_string())
    }
}

/// Loads static properties from a JSON file.
///
/// A missing file yields empty properties; a file that exists but cannot be
/// parsed is an error.
pub fn load_properties(path: &Path) -> Result<StaticProperties, PropertiesError> {
    if !path.is_file() {
        log::debug!("no property file at {}, using empty properties", path.display());
        return Ok(StaticProperties::new());
    }

    let content = fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&content)?;
    parse_properties(raw)
}

/// Parses a JSON value into validated static properties.
pub fn parse_properties(raw: serde_json::Value) -> Result<StaticProperties, PropertiesError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| PropertiesError::InvalidFormat("Root must be a JSON object".to_string()))?;

    let mut props = StaticProperties::new();
    let mut active = None;

    for (key, value) in obj.iter() {
        match key.as_str() {
            "shared" => {
                props.shared = parse_property_map(value, "shared")?;
            }
            "active" => {
                active = value.as_str().map(|s| s.to_string());
            }
            profile_name => {
                let properties = parse_property_map(value, profile_name)?;
                props.add_profile(Profile {
                    name: profile_name.to_string(),
                    properties,
                });
            }
        }
    }

    if let Some(name) = active {
        if !props.set_active(name.clone()) {
            return Err(PropertiesError::InvalidFormat(format!(
                "Active profile '{}' does not exist",
                name
            )));
        }
    }

    Ok(props)
}

/// Converts a JSON object of scalars into a string map
fn parse_property_map(
    value: &serde_json::Value,
    context: &str,
) -> Result<HashMap<String, String>, PropertiesError> {
    let obj = value.as_object().ok_or_else(|| {
        PropertiesError::InvalidFormat(format!("'{}' must be a JSON object", context))
    })?;

    let mut map = HashMap::new();

    for (key, val) in obj.iter() {
        let value_str = match val {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            _ => {
                return Err(PropertiesError::InvalidFormat(format!(
                    "Property '{}' in '{}' has invalid type (must be string, number, or boolean)",
                    key, context
                )));
            }
        };

        map.insert(key.clone(), value_str);
    }

    Ok(map)
}
