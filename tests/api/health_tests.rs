//! Health Check API Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_components() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/ready").await;

    // No database is reachable in tests
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert_eq!(json["checks"]["database"]["status"], "unhealthy");
    assert_eq!(json["checks"]["flash"]["status"], "healthy");
    assert_eq!(json["checks"]["flash"]["subscribers"], 0);
    assert_eq!(json["checks"]["push"]["provider"], "disabled");
    assert_eq!(json["checks"]["push"]["configured"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new().await;
    app.state.hub.snapshot().await;

    let response = app.server.get("/metrics").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("chattr_flash_subscribers_active"));
}
