//! Integration tests for credential resolution: the service-account token
//! exchange, its cache, the priority order, and fail-closed behavior.

mod common;
use common::*;

use genai_dispatch::{AuthConfig, Error, ServiceAccountCredentials};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_account_for(server: &MockServer) -> ServiceAccountCredentials {
    let mut creds = ServiceAccountCredentials::new(
        "svc@example.iam.gserviceaccount.com",
        "unused under assertion override",
    );
    creds.token_uri = Some(format!("{}/token", server.uri()));
    creds
}

fn generate_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": "ok"}], "role": "model"}}]
    }))
}

#[tokio::test]
async fn test_service_account_exchange_and_cache() {
    let mock_server = MockServer::start().await;

    // The exchange runs once; the second API call reuses the cached token.
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type="))
        .and(body_string_contains("test-assertion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "sa-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate_content"))
        .and(header("Authorization", "Bearer sa-token"))
        .respond_with(generate_ok())
        .expect(2)
        .mount(&mock_server)
        .await;

    let auth = AuthConfig::service_account(service_account_for(&mock_server))
        .with_service_account_assertion("test-assertion");
    let client = client_for(&mock_server, auth, RecordingSleeper::new());

    for _ in 0..2 {
        client
            .with_model("dialogue")
            .with_text("hi")
            .generate()
            .await
            .expect("request failed");
    }
}

#[tokio::test]
async fn test_api_key_takes_priority_over_service_account() {
    let mock_server = MockServer::start().await;

    // The token endpoint must never be consulted when a key is present.
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate_content"))
        .and(header("X-Goog-Api-Key", "explicit-key"))
        .respond_with(generate_ok())
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = AuthConfig::api_key("explicit-key")
        .with_service_account(service_account_for(&mock_server))
        .with_service_account_assertion("test-assertion");
    let client = client_for(&mock_server, auth, RecordingSleeper::new());

    client
        .with_model("dialogue")
        .with_text("hi")
        .generate()
        .await
        .expect("request failed");
}

#[tokio::test]
async fn test_failed_exchange_fails_closed() {
    let mock_server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("exchange unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;
    // No unauthenticated request may reach the API.
    Mock::given(method("POST"))
        .and(path("/generate_content"))
        .respond_with(generate_ok())
        .expect(0)
        .mount(&mock_server)
        .await;

    let auth = AuthConfig::service_account(service_account_for(&mock_server))
        .with_service_account_assertion("test-assertion");
    let client = client_for(&mock_server, auth, sleeper.clone());

    let err = client
        .with_model("dialogue")
        .with_text("hi")
        .generate()
        .await
        .unwrap_err();

    match err {
        Error::Credential(message) => assert!(message.contains("500")),
        other => panic!("expected Credential error, got {other:?}"),
    }
    assert!(
        sleeper.recorded().is_empty(),
        "credential failures are not retried"
    );
}

#[tokio::test]
async fn test_no_credentials_configured() {
    let mock_server = MockServer::start().await;

    let client = client_for(&mock_server, AuthConfig::default(), RecordingSleeper::new());
    let err = client
        .with_model("dialogue")
        .with_text("hi")
        .generate()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Credential(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
