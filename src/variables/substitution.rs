//! Placeholder substitution for request text.
//!
//! Replaces `${name}` tokens in URLs, bodies and raw header strings. The scan
//! is a single left-to-right pass over the original text: substituted values
//! are inserted verbatim and never scanned again, so a value that itself looks
//! like `${other}` is left as-is.

use super::store::VariableStore;
use crate::environment::StaticProperties;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::Arc;

/// Matches `${name}`; the name runs up to the first closing brace.
static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("Failed to compile placeholder regex"));

/// Which sources a resolution may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveScope {
    /// Variable store first, then static properties.
    Dynamic,
    /// Static properties only.
    StaticOnly,
}

/// Resolves `${name}` placeholders against the variable store and static properties.
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    store: VariableStore,
    properties: Arc<StaticProperties>,
}

impl ParameterResolver {
    /// Creates a resolver over the given sources
    pub fn new(store: VariableStore, properties: Arc<StaticProperties>) -> Self {
        Self { store, properties }
    }

    /// Substitutes every placeholder in `text`.
    ///
    /// Lookup order per placeholder: the variable store (only with
    /// [`ResolveScope::Dynamic`]), then static properties, then the empty
    /// string. Empty input is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_case_runner::environment::StaticProperties;
    /// use rest_case_runner::variables::{ParameterResolver, ResolveScope, VariableStore};
    /// use std::sync::Arc;
    ///
    /// let store = VariableStore::new();
    /// store.put("u", "bob");
    /// let resolver = ParameterResolver::new(store, Arc::new(StaticProperties::new()));
    ///
    /// assert_eq!(resolver.resolve("/users/${u}", ResolveScope::Dynamic), "/users/bob");
    /// assert_eq!(resolver.resolve("/users/${u}", ResolveScope::StaticOnly), "/users/");
    /// ```
    pub fn resolve(&self, text: &str, scope: ResolveScope) -> String {
        if text.is_empty() || !text.contains("${") {
            return text.to_string();
        }

        PLACEHOLDER_REGEX
            .replace_all(text, |caps: &Captures| self.lookup(&caps[1], scope))
            .into_owned()
    }

    /// Like [`resolve`](Self::resolve) but passes an absent text through.
    pub fn resolve_opt(&self, text: Option<&str>, scope: ResolveScope) -> Option<String> {
        text.map(|t| self.resolve(t, scope))
    }

    fn lookup(&self, name: &str, scope: ResolveScope) -> String {
        if scope == ResolveScope::Dynamic {
            if let Some(value) = self.store.get(name) {
                return value;
            }
        }

        if let Some(value) = self.properties.get(name) {
            return value.to_string();
        }

        log::warn!("placeholder ${{{}}} is unresolved, substituting empty string", name);
        String::new()
    }
}
