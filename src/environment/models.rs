//! Static property data models.
//!
//! Static properties are the fallback source for `${name}` placeholders that
//! the variable store cannot answer. They are layered: a shared property set
//! applies to every run and a named profile (e.g. `dev`, `test`) overrides it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named set of properties for one deployment profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Profile name (e.g., "dev", "test", "prod")
    pub name: String,

    /// Property key-value pairs for this profile
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Profile {
    /// Creates a new profile with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// Gets a property value by key
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }

    /// Sets a property value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}

/// Shared properties plus named profiles, with at most one profile active.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StaticProperties {
    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Properties available regardless of profile
    #[serde(default)]
    pub shared: HashMap<String, String>,

    /// Currently active profile name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl StaticProperties {
    /// Creates an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a property set holding only shared properties
    pub fn from_shared(shared: HashMap<String, String>) -> Self {
        Self {
            shared,
            ..Self::default()
        }
    }

    /// Adds a profile to the collection
    pub fn add_profile(&mut self, profile: Profile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Sets the active profile, returning `false` if it is unknown
    pub fn set_active(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.profiles.contains_key(&name) {
            self.active = Some(name);
            true
        } else {
            false
        }
    }

    /// Gets the currently active profile
    pub fn active_profile(&self) -> Option<&Profile> {
        self.active.as_ref().and_then(|name| self.profiles.get(name))
    }

    /// Looks up a property, preferring the active profile over shared values
    pub fn get(&self, key: &str) -> Option<&str> {
        self.active_profile()
            .and_then(|profile| profile.get(key))
            .or_else(|| self.shared.get(key))
            .map(String::as_str)
    }

    /// Sets a shared property
    pub fn set_shared(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.shared.insert(key.into(), value.into());
    }

    /// Returns `true` when there are neither shared properties nor profiles
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.profiles.is_empty()
    }
}
