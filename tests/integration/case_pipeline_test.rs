//! Test-case pipeline integration tests
//!
//! These tests run whole suites against a mock server: bootstrap login,
//! chained extraction between rows, result labels, notifications and the
//! per-case retry policy.

use super::{config_for, init_test_env, mount_login};
use rest_case_runner::config::RunnerConfig;
use rest_case_runner::context::RunContext;
use rest_case_runner::environment::StaticProperties;
use rest_case_runner::failure::FailureClass;
use rest_case_runner::runner::{
    CaseOutcome, JsonRowSource, MemoryNotifier, MemoryResultSink, Suite, SuiteError,
};

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    suite: Suite,
    sink: Arc<MemoryResultSink>,
    notifier: Arc<MemoryNotifier>,
}

fn harness(config: RunnerConfig) -> Harness {
    init_test_env();
    let sink = Arc::new(MemoryResultSink::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let suite = Suite::new(
        RunContext::new(config, StaticProperties::new()),
        sink.clone(),
        notifier.clone(),
    )
    .unwrap();
    Harness {
        suite,
        sink,
        notifier,
    }
}

#[tokio::test]
async fn test_chained_rows_with_labels_and_notifications() {
    let server = MockServer::start().await;
    mount_login(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("Authorization", "tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": {"id": "u-1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u-1"))
        .and(header("Authorization", "tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 0, "data": {"name": "alice"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = RunnerConfig {
        parallelism: 1,
        notify_enabled: true,
        ..config_for(&server)
    };
    let h = harness(config);

    let source = JsonRowSource::from_value(json!([
        {
            "rowIndex": 1, "method": "POST", "url": "/users", "body": "{\"name\":\"alice\"}",
            "expectedStatus": 200, "checkField": "code", "expectedValue": "0",
            "extractField": "data.id", "storeAs": "user_id"
        },
        {
            "rowIndex": 2, "method": "GET", "url": "/users/${user_id}",
            "checkFields": "code;data.name", "expectedValues": "0;regex:a.*"
        },
        { "rowIndex": 3, "method": "GET", "url": "/missing" },
        { "rowIndex": 4, "method": "GET", "url": "/never", "skip": "true" },
        { "rowIndex": 5, "method": "GET" }
    ]));

    h.suite.bootstrap().await.unwrap();
    let report = h.suite.run_all(&source).await.unwrap();

    assert_eq!(report.cases.len(), 5);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.skipped(), 1);
    assert!(!report.is_success());
    assert_eq!(report.run_id, h.suite.run_id());

    assert_eq!(report.cases[2].status, "FAIL-404: Resource not found: ".to_string() + &server.uri() + "/missing");
    assert_eq!(report.cases[4].class, Some(FailureClass::InvalidCase));

    let records = h.sink.records();
    let written: Vec<(i64, String)> = records
        .iter()
        .map(|r| (r.row_id, r.status_label.clone()))
        .collect();
    assert_eq!(written.len(), 4);
    assert_eq!(written[0], (1, "PASS".to_string()));
    assert_eq!(written[1], (2, "PASS".to_string()));
    assert_eq!(written[2].0, 3);
    assert!(written[2].1.starts_with("FAIL-404: "));
    assert_eq!(written[3].0, 5);
    assert!(written[3].1.starts_with("FAIL-CASE: "));

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("row 3 GET /missing: FAIL-404: "));
    assert!(messages[1].starts_with("row 5: FAIL-CASE: "));

    assert_eq!(h.suite.context().store.get("user_id").as_deref(), Some("u-1"));
}

#[tokio::test]
async fn test_row_expecting_401_passes_without_refresh() {
    let server = MockServer::start().await;
    mount_login(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(config_for(&server));
    let source = JsonRowSource::from_value(json!([
        { "rowIndex": 1, "method": "GET", "url": "/admin", "expectedStatus": 401 }
    ]));

    h.suite.bootstrap().await.unwrap();
    let report = h.suite.run_all(&source).await.unwrap();

    assert!(report.cases[0].outcome.is_passed());
    assert_eq!(h.sink.records()[0].status_label, "PASS");
    assert_eq!(
        h.suite.context().store.get("login_token").as_deref(),
        Some("tok")
    );
}

#[tokio::test]
async fn test_invalid_row_is_written_and_notified_in_parallel_mode() {
    let server = MockServer::start().await;
    mount_login(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let config = RunnerConfig {
        parallelism: 4,
        notify_enabled: true,
        ..config_for(&server)
    };
    let h = harness(config);
    let source = JsonRowSource::from_value(json!([
        { "rowIndex": 3, "method": "GET", "url": "/ok" },
        { "rowIndex": 4, "url": "/x", "expectedStatus": "abc" }
    ]));

    h.suite.bootstrap().await.unwrap();
    let report = h.suite.run_all(&source).await.unwrap();

    assert_eq!(report.cases[1].row_index, 4);
    assert_eq!(report.cases[1].class, Some(FailureClass::InvalidCase));

    let rejected: Vec<_> = h
        .sink
        .records()
        .into_iter()
        .filter(|r| r.row_id == 4)
        .collect();
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].status_label.starts_with("FAIL-CASE: "));

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("row 4: FAIL-CASE: "));
}

#[tokio::test]
async fn test_validation_failure_retried_once() {
    let server = MockServer::start().await;
    mount_login(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(config_for(&server));
    let source = JsonRowSource::from_value(json!([
        { "method": "GET", "url": "/flaky", "checkField": "code", "expectedValue": "0" }
    ]));

    h.suite.bootstrap().await.unwrap();
    let report = h.suite.run_all(&source).await.unwrap();

    assert!(report.cases[0].outcome.is_passed());
}

#[tokio::test]
async fn test_status_mismatch_label_uses_body_code() {
    let server = MockServer::start().await;
    mount_login(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": 500})))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(config_for(&server));
    let source = JsonRowSource::from_value(json!([{ "url": "/orders", "body": "{}" }]));

    h.suite.bootstrap().await.unwrap();
    let report = h.suite.run_all(&source).await.unwrap();

    match &report.cases[0].outcome {
        CaseOutcome::Failed {
            class,
            reason,
            body,
        } => {
            assert_eq!(*class, FailureClass::ValidationFailure);
            assert_eq!(reason, "FAIL-500: Status code mismatch: expected 200 but was 500");
            assert_eq!(body, r#"{"code":500}"#);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    // Notifications are off by default.
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_bootstrap_clears_store_and_aborts_on_login_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/MerchantUsers/PasswordLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1, "data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(config_for(&server));
    h.suite.context().store.put("left_over", "x");

    let err = h.suite.bootstrap().await.unwrap_err();
    assert!(matches!(err, SuiteError::Bootstrap(_)));
    assert!(!h.suite.context().store.contains("left_over"));
}

#[tokio::test]
async fn test_parallel_rows_all_reported_in_source_order() {
    let server = MockServer::start().await;
    mount_login(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(6)
        .mount(&server)
        .await;

    let config = RunnerConfig {
        parallelism: 3,
        ..config_for(&server)
    };
    let h = harness(config);
    let rows: Vec<_> = (1..=6)
        .map(|i| json!({ "rowIndex": i, "method": "GET", "url": format!("/p/{}", i) }))
        .collect();
    let source = JsonRowSource::from_value(json!(rows));

    h.suite.bootstrap().await.unwrap();
    let report = h.suite.run_all(&source).await.unwrap();

    assert_eq!(report.passed(), 6);
    let order: Vec<i64> = report.cases.iter().map(|c| c.row_index).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(h.sink.records().len(), 6);
}
