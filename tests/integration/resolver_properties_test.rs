//! Placeholder resolution and static property integration tests
//!
//! These tests load profile-layered properties from disk and check the
//! resolver's lookup order, plus property-based checks of its identity and
//! single-pass guarantees.

use rest_case_runner::environment::{load_properties, StaticProperties};
use rest_case_runner::validator::ResponseFieldAccessor;
use rest_case_runner::variables::{ParameterResolver, ResolveScope, VariableStore};

use proptest::prelude::*;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn resolver(store: &VariableStore, properties: StaticProperties) -> ParameterResolver {
    ParameterResolver::new(store.clone(), Arc::new(properties))
}

#[test]
fn test_profile_overrides_shared_and_store_overrides_both() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("properties.json");
    fs::write(
        &path,
        r#"{
            "shared": {"base.path": "/api", "login.user": "shared-user"},
            "dev": {"login.user": "dev-user"},
            "active": "dev"
        }"#,
    )
    .unwrap();

    let properties = load_properties(&path).unwrap();
    let store = VariableStore::new();
    let resolver = resolver(&store, properties);

    assert_eq!(
        resolver.resolve("${base.path}/users/${login.user}", ResolveScope::Dynamic),
        "/api/users/dev-user"
    );

    store.put("login.user", "runtime-user");
    assert_eq!(
        resolver.resolve("${login.user}", ResolveScope::Dynamic),
        "runtime-user"
    );
    assert_eq!(
        resolver.resolve("${login.user}", ResolveScope::StaticOnly),
        "dev-user"
    );
}

#[test]
fn test_missing_properties_file_resolves_to_empty() {
    let temp_dir = TempDir::new().unwrap();
    let properties = load_properties(&temp_dir.path().join("absent.json")).unwrap();
    assert!(properties.is_empty());

    let resolver = resolver(&VariableStore::new(), properties);
    assert_eq!(resolver.resolve("id=${id}", ResolveScope::Dynamic), "id=");
}

#[test]
fn test_extracted_value_feeds_later_request() {
    let store = VariableStore::new();
    let accessor = ResponseFieldAccessor::new(store.clone());
    accessor
        .extract(
            r#"{"data":{"AccessToken":"abc123"}}"#,
            "data.AccessToken",
            "login_token",
        )
        .unwrap();

    assert_eq!(store.get("login_token").as_deref(), Some("abc123"));

    let resolver = resolver(&store, StaticProperties::new());
    assert_eq!(
        resolver.resolve("Authorization=${login_token}", ResolveScope::Dynamic),
        "Authorization=abc123"
    );
}

#[test]
fn test_navigate_indexed_path() {
    let accessor = ResponseFieldAccessor::new(VariableStore::new());
    let body = r#"{"a":{"b":[{"c":1},{"c":2}]}}"#;
    assert_eq!(accessor.navigate(body, "a.b[1].c").unwrap(), serde_json::json!(2));
    assert!(accessor.navigate(body, "a.b[5].c").is_err());
}

proptest! {
    #[test]
    fn prop_text_without_placeholders_is_unchanged(text in "[^$]*") {
        let store = VariableStore::new();
        store.put("a", "1");
        let resolver = resolver(&store, StaticProperties::new());
        prop_assert_eq!(resolver.resolve(&text, ResolveScope::Dynamic), text);
    }

    #[test]
    fn prop_substituted_values_are_not_rescanned(value in "\\$\\{[a-z]{1,8}\\}") {
        let store = VariableStore::new();
        store.put("outer", value.clone());
        store.put("inner", "should-not-appear");
        let resolver = resolver(&store, StaticProperties::new());
        prop_assert_eq!(resolver.resolve("${outer}", ResolveScope::Dynamic), value);
    }
}
