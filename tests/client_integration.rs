mod common;

use mockito::{Matcher, Server};
use soulseer_client::pages::load_cms_page;
use soulseer_client::payments::PaymentMode;
use soulseer_client::store::AUTH_TOKEN_KEY;

use common::{build_app, load_test_config, notifications_body};

const FILE_STORE_CONFIG: &str = r#"
version: "1.0.0"
backend_url: "{backend}"
token_sources:
  - type: stored
store:
  enabled: true
  type: file
  path: "{path}"
"#;

const IDENTITY_CONFIG: &str = r#"
version: "1.0.0"
backend_url: "{backend}"
identity:
  frontend_api: "{backend}/identity"
  template: "soulseer"
token_sources:
  - type: identity
  - type: stored
store:
  enabled: true
  type: memory
payments:
  publishable_key: "pk_test_51soulseer"
"#;

#[tokio::test]
async fn saved_token_survives_restart_and_is_sent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/api/notifications")
        .match_header("authorization", "Bearer saved-token")
        .with_status(200)
        .with_body(notifications_body())
        .create_async()
        .await;

    let yaml = FILE_STORE_CONFIG.replace("{path}", &path.to_string_lossy());

    {
        let (state, _) = build_app(load_test_config(&yaml, &server.url()));
        assert_eq!(state.api.current_token().await, None);
        state.store.set(AUTH_TOKEN_KEY, "saved-token").await.unwrap();
    }

    let (state, _) = build_app(load_test_config(&yaml, &server.url()));
    assert_eq!(state.api.current_token().await.as_deref(), Some("saved-token"));
    state.notifications.load_notifications().await.unwrap();
    list.assert_async().await;

    state.store.remove(AUTH_TOKEN_KEY).await.unwrap();
    assert_eq!(state.api.current_token().await, None);
}

#[tokio::test]
async fn identity_session_token_is_preferred() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/identity/v1/environment")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("GET", "/identity/v1/client")
        .with_status(200)
        .with_body(r#"{"response": {"last_active_session_id": "sess_1"}}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/identity/v1/client/sessions/sess_1/tokens/soulseer")
        .with_status(200)
        .with_body(r#"{"jwt": "identity-jwt"}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/api/notifications")
        .match_header("authorization", "Bearer identity-jwt")
        .with_status(200)
        .with_body(r#"{"notifications": []}"#)
        .create_async()
        .await;

    let (state, _) = build_app(load_test_config(IDENTITY_CONFIG, &server.url()));
    state.store.set(AUTH_TOKEN_KEY, "stored-token").await.unwrap();

    state.notifications.load_notifications().await.unwrap();
    list.assert_async().await;
    assert_eq!(state.notifications.snapshot().unread_count, 0);
}

#[tokio::test]
async fn failed_identity_load_falls_back_to_stored_token() {
    let mut server = Server::new_async().await;
    let environment = server
        .mock("GET", "/identity/v1/environment")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/api/notifications")
        .match_header("authorization", "Bearer stored-token")
        .with_status(200)
        .with_body(notifications_body())
        .expect(2)
        .create_async()
        .await;

    let (state, _) = build_app(load_test_config(IDENTITY_CONFIG, &server.url()));
    state.store.set(AUTH_TOKEN_KEY, "stored-token").await.unwrap();

    state.notifications.load_notifications().await.unwrap();
    state.notifications.load_notifications().await.unwrap();

    environment.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn signed_out_requests_go_unauthenticated() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/identity/v1/environment")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("GET", "/identity/v1/client")
        .with_status(200)
        .with_body(r#"{"response": {"last_active_session_id": null}}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/api/notifications")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .create_async()
        .await;

    let (state, _) = build_app(load_test_config(IDENTITY_CONFIG, &server.url()));

    let err = state.notifications.load_notifications().await.unwrap_err();
    assert!(err.is_status(401));
    list.assert_async().await;

    let snapshot = state.notifications.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.notifications.is_empty());
}

#[tokio::test]
async fn cms_page_is_fetched_without_credentials() {
    let mut server = Server::new_async().await;
    let page = server
        .mock("GET", "/cms/terms-of-service")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(
            r#"{"slug": "terms-of-service", "title": "Terms of Service", "html_content": "<h1>Terms</h1>"}"#,
        )
        .create_async()
        .await;

    let (state, _) = build_app(load_test_config(IDENTITY_CONFIG, &server.url()));
    state.store.set(AUTH_TOKEN_KEY, "stored-token").await.unwrap();

    let loaded = load_cms_page(&state.api, "terms-of-service").await.unwrap();
    page.assert_async().await;
    assert_eq!(loaded.title, "Terms of Service");
}

#[tokio::test]
async fn payments_handle_comes_from_config() {
    let server = Server::new_async().await;
    let (state, _) = build_app(load_test_config(IDENTITY_CONFIG, &server.url()));

    let sdk = state.payments.get().await.expect("payments configured");
    assert_eq!(sdk.mode(), PaymentMode::Test);
    assert_eq!(sdk.publishable_key(), "pk_test_51soulseer");
}
