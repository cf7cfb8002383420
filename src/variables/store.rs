//! Shared variable store.
//!
//! Holds values extracted from earlier responses (tokens, ids) so later
//! requests can reference them as `${name}`. The store is a cheap-clone handle:
//! every clone sees the same map, and separate stores never share state.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrent key/value store of runtime variables.
///
/// Writes are last-write-wins per key. There is no cross-key atomicity and no
/// key ever expires on its own.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    values: Arc<DashMap<String, String>>,
}

impl VariableStore {
    /// Creates an empty store
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_case_runner::variables::VariableStore;
    ///
    /// let store = VariableStore::new();
    /// store.put("user_id", "42");
    /// assert_eq!(store.get("user_id").as_deref(), Some("42"));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns a copy of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|entry| entry.value().clone())
    }

    /// Removes `key`, returning its previous value
    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.remove(key).map(|(_, value)| value)
    }

    /// Checks whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes every variable
    pub fn clear(&self) {
        self.values.clear();
    }

    /// Copies the current contents into a plain map
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of stored variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
