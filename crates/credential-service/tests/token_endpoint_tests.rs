//! Integration tests for `POST /api/token`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::types::ErrorResponse;
use credential_service::config::Config;
use credential_service::routes::{build_routes, AppState};
use cs_test_utils::*;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with_signer(signer: Arc<CountingSigner>) -> axum::Router {
    let config = Config::from_vars(&test_config_vars()).unwrap();
    let state = Arc::new(AppState {
        config,
        signer,
        address_probe: Arc::new(FixedAddressProbe::empty()),
    });
    build_routes(state, test_metrics_handle())
}

async fn post_token(app: axum::Router, body: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/token")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_host_credential_can_publish() -> Result<(), anyhow::Error> {
    let server = TestCredentialServer::spawn().await?;

    let token = server.issue("host-1700000000000", "Host", "host").await?;

    token
        .assert_valid_credential()
        .assert_can_publish()
        .assert_room(TEST_ROOM_NAME)
        .assert_identity("host-1700000000000");

    let claims = decode_test_credential(&token);
    assert_eq!(claims.iss, TEST_API_KEY);
    assert_eq!(claims.name, "Host");

    Ok(())
}

#[tokio::test]
async fn test_viewer_credential_is_subscribe_only() -> Result<(), anyhow::Error> {
    let server = TestCredentialServer::spawn().await?;

    let token = server.issue("viewer-1", "Viewer", "viewer").await?;

    token
        .assert_valid_credential()
        .assert_subscribe_only()
        .assert_room(TEST_ROOM_NAME)
        .assert_identity("viewer-1");

    Ok(())
}

#[tokio::test]
async fn test_unknown_role_gets_viewer_grant() -> Result<(), anyhow::Error> {
    let server = TestCredentialServer::spawn().await?;

    for role in ["admin", "HOST", ""] {
        let token = server.issue("someone", "Someone", role).await?;
        token.assert_subscribe_only();
    }

    Ok(())
}

#[tokio::test]
async fn test_absent_role_gets_viewer_grant() {
    let app = build_routes(
        Arc::new(AppState::from_config(
            Config::from_vars(&test_config_vars()).unwrap(),
        )),
        test_metrics_handle(),
    );

    let (status, body) = post_token(app, r#"{"identity": "v-1", "name": "Viewer"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["token"]
        .as_str()
        .unwrap()
        .to_string()
        .assert_subscribe_only();
}

#[tokio::test]
async fn test_non_string_role_gets_viewer_grant() {
    let bodies = [
        r#"{"identity": "v-1", "name": "Viewer", "role": 1}"#,
        r#"{"identity": "v-1", "name": "Viewer", "role": true}"#,
        r#"{"identity": "v-1", "name": "Viewer", "role": null}"#,
        r#"{"identity": "v-1", "name": "Viewer", "role": {"role": "host"}}"#,
    ];

    for body in bodies {
        let app = build_routes(
            Arc::new(AppState::from_config(
                Config::from_vars(&test_config_vars()).unwrap(),
            )),
            test_metrics_handle(),
        );

        let (status, bytes) = post_token(app, body).await;
        assert_eq!(status, StatusCode::OK, "body: {}", body);

        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["token"]
            .as_str()
            .unwrap()
            .to_string()
            .assert_valid_credential()
            .assert_subscribe_only()
            .assert_identity("v-1");
    }
}

#[tokio::test]
async fn test_missing_fields_rejected_without_signing() {
    let bodies = [
        r#"{"name": "Host", "role": "host"}"#,
        r#"{"identity": "host-1", "role": "host"}"#,
        r#"{"identity": "", "name": "Host", "role": "host"}"#,
        r#"{"identity": "host-1", "name": "", "role": "host"}"#,
        r#"{}"#,
    ];

    for body in bodies {
        let signer = Arc::new(CountingSigner::succeeding());
        let (status, bytes) = post_token(app_with_signer(signer.clone()), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error.error, "Missing identity or name");
        assert_eq!(signer.call_count(), 0, "signer invoked for body: {}", body);
    }
}

#[tokio::test]
async fn test_malformed_body_rejected_without_signing() {
    let signer = Arc::new(CountingSigner::succeeding());

    let (status, bytes) = post_token(app_with_signer(signer.clone()), "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.error, "Missing identity or name");
    assert_eq!(signer.call_count(), 0);
}

#[tokio::test]
async fn test_valid_request_invokes_signer_once() {
    let signer = Arc::new(CountingSigner::succeeding());

    let (status, bytes) = post_token(
        app_with_signer(signer.clone()),
        r#"{"identity": "host-1", "name": "Host", "role": "host"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["token"], "mock-token-host-host-1");
    assert_eq!(signer.call_count(), 1);
}

#[tokio::test]
async fn test_signer_failure_returns_500() {
    let signer = Arc::new(CountingSigner::failing());

    let (status, bytes) = post_token(
        app_with_signer(signer.clone()),
        r#"{"identity": "host-1", "name": "Host", "role": "host"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.error, "Failed to generate token");
    assert!(!error.error.contains("mock signer failure"));
}

#[tokio::test]
async fn test_missing_secrets_return_500() -> Result<(), anyhow::Error> {
    let server = TestCredentialServer::spawn_with_vars(unsigned_config_vars()).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/token", server.url()))
        .json(&serde_json::json!({"identity": "host-1", "name": "Host", "role": "host"}))
        .send()
        .await?;

    assert_eq!(response.status(), 500);
    let error: ErrorResponse = response.json().await?;
    assert_eq!(error.error, "Failed to generate token");

    Ok(())
}

#[tokio::test]
async fn test_missing_fields_take_precedence_over_missing_secrets() -> Result<(), anyhow::Error> {
    let server = TestCredentialServer::spawn_with_vars(unsigned_config_vars()).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/token", server.url()))
        .json(&serde_json::json!({"role": "host"}))
        .send()
        .await?;

    assert_eq!(response.status(), 400);

    Ok(())
}
