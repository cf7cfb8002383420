//! Credential refresh and retry integration tests
//!
//! These tests verify the refresh-and-retry path of `RequestExecutor::execute`
//! against a mock server: exactly one refresh per call, no retry on 404, and a
//! single login when several workers see the same rejected credential.

use super::{context_for, mount_login};
use rest_case_runner::executor::{ExecuteError, RequestExecutor};
use rest_case_runner::failure::FailureClass;
use rest_case_runner::models::{HttpMethod, RequestDescriptor};

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_refresh_and_retry_once_on_body_code_401() {
    let server = MockServer::start().await;
    mount_login(&server, "xyz789", 1).await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("Authorization", "stale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 401})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("Authorization", "xyz789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_for(&server);
    ctx.store.put("login_token", "stale");
    let executor = RequestExecutor::new(ctx.clone()).unwrap();

    let response = executor
        .execute(&RequestDescriptor::new(HttpMethod::GET, "/orders"))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body_code(), Some(0));
    assert_eq!(ctx.store.get("login_token").as_deref(), Some("xyz789"));
    assert_eq!(executor.credentials().generation(), 1);
}

#[tokio::test]
async fn test_retry_replaces_explicit_authorization_header() {
    let server = MockServer::start().await;
    mount_login(&server, "xyz789", 1).await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("Authorization", "stale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 401})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("Authorization", "xyz789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = RequestExecutor::new(context_for(&server)).unwrap();
    let request =
        RequestDescriptor::new(HttpMethod::GET, "/orders").with_headers("Authorization=stale");
    let response = executor.execute(&request).await.unwrap();

    assert_eq!(response.body_code(), Some(0));
    assert_eq!(executor.credentials().generation(), 1);
}

#[tokio::test]
async fn test_plain_401_status_is_returned_without_refresh() {
    let server = MockServer::start().await;
    mount_login(&server, "unused", 0).await;

    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = RequestExecutor::new(context_for(&server)).unwrap();
    let response = executor
        .execute(&RequestDescriptor::new(HttpMethod::GET, "/admin"))
        .await
        .unwrap();

    assert_eq!(response.status_code, 401);
    assert_eq!(executor.credentials().generation(), 0);
}

#[tokio::test]
async fn test_not_found_fails_fast_without_refresh() {
    let server = MockServer::start().await;
    mount_login(&server, "unused", 0).await;

    Mock::given(method("DELETE"))
        .and(path("/orders/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such order"))
        .expect(1)
        .mount(&server)
        .await;

    let executor = RequestExecutor::new(context_for(&server)).unwrap();
    let err = executor
        .execute(&RequestDescriptor::new(HttpMethod::DELETE, "/orders/9"))
        .await
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::ResourceNotFound);
    assert_eq!(err.response().map(|r| r.body.as_str()), Some("no such order"));
}

#[tokio::test]
async fn test_still_invalid_after_refresh_is_final() {
    let server = MockServer::start().await;
    mount_login(&server, "fresh", 1).await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"msg":"token失效"}"#))
        .expect(2)
        .mount(&server)
        .await;

    let executor = RequestExecutor::new(context_for(&server)).unwrap();
    let err = executor
        .execute(&RequestDescriptor::new(HttpMethod::GET, "/profile"))
        .await
        .unwrap_err();

    match err {
        ExecuteError::CredentialInvalid { response, .. } => {
            assert!(response.body.contains("token失效"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_refresh_failure_surfaces_as_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/MerchantUsers/PasswordLogin"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 401})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = RequestExecutor::new(context_for(&server)).unwrap();
    let err = executor
        .execute(&RequestDescriptor::new(HttpMethod::GET, "/profile"))
        .await
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::AuthBootstrapFailure);
}

#[tokio::test]
async fn test_retry_re_resolves_body() {
    let server = MockServer::start().await;
    mount_login(&server, "new", 1).await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_json(json!({"token": "old"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 401})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_json(json!({"token": "new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_for(&server);
    ctx.store.put("login_token", "old");
    let executor = RequestExecutor::new(ctx).unwrap();

    let request = RequestDescriptor::new(HttpMethod::POST, "/echo")
        .with_body(r#"{"token":"${login_token}"}"#);
    let response = executor.execute(&request).await.unwrap();
    assert_eq!(response.status_code, 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rejections_share_one_login() {
    let server = MockServer::start().await;
    mount_login(&server, "shared-new", 1).await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("Authorization", "expired"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 401})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("Authorization", "shared-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
        .mount(&server)
        .await;

    let ctx = context_for(&server);
    ctx.store.put("login_token", "expired");
    let executor = RequestExecutor::new(ctx).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .execute(&RequestDescriptor::new(HttpMethod::GET, "/items"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status_code, 200);
    }

    assert_eq!(executor.credentials().generation(), 1);
}
