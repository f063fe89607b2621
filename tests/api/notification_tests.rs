//! Notification Inbox API Tests
//!
//! Only the authentication and validation paths; everything past them needs
//! a database.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{create_test_token, TestApp};

#[tokio::test]
async fn test_inbox_requires_token() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/notifications").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let json: Value = response.json();
    assert_eq!(json["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_inbox_rejects_malformed_header() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/v1/notifications")
        .add_header("Authorization", "Token abc")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mark_read_rejects_invalid_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .put("/api/v1/notifications/1/read")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let json: Value = response.json();
    assert_eq!(json["message"], "Invalid token");
}

#[tokio::test]
async fn test_push_token_is_validated_before_storage() {
    let app = TestApp::new().await;
    let token = create_test_token(2);

    let response = app
        .server
        .put("/api/v1/users/me/fcm-token")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "token": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["message"], "token: Token must be 1-4096 characters");
}
