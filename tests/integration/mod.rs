//! Integration tests module for REST Case Runner
//!
//! Shared helpers for tests that drive the executor and suite against a
//! `wiremock` server.

pub mod case_pipeline_test;
pub mod executor_retry_test;
pub mod resolver_properties_test;

use rest_case_runner::config::RunnerConfig;
use rest_case_runner::context::RunContext;
use rest_case_runner::environment::StaticProperties;
use std::sync::Once;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Configuration pointing at `server`, with test credentials.
pub fn config_for(server: &MockServer) -> RunnerConfig {
    RunnerConfig {
        base_url: server.uri(),
        account: "qa".to_string(),
        password: "secret".to_string(),
        timeout_ms: 2000,
        ..RunnerConfig::default()
    }
}

pub fn context_for(server: &MockServer) -> RunContext {
    init_test_env();
    RunContext::new(config_for(server), StaticProperties::new())
}

/// Mounts a login endpoint that hands out `token`, expecting `calls` calls.
pub async fn mount_login(server: &MockServer, token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/MerchantUsers/PasswordLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "data": { "AccessToken": token }
        })))
        .expect(calls)
        .mount(server)
        .await;
}
