//! Flash WebSocket Tests

use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use chattr_server::domain::{BroadcastEvent, BroadcastKind};
use chattr_server::presentation::websocket::BroadcastHub;

use crate::common::TestApp;

/// Registration happens after the upgrade completes; wait for the hub to see it.
async fn wait_for_subscribers(hub: &BroadcastHub, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while hub.subscriber_count().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("hub never reached {} subscribers", expected));
}

#[tokio::test]
async fn test_flash_subscribers_receive_published_event() {
    let app = TestApp::new().await;

    let mut first = app.server.get_websocket("/flash").await.into_websocket().await;
    let mut second = app.server.get_websocket("/flash").await.into_websocket().await;
    wait_for_subscribers(&app.state.hub, 2).await;

    let occurred_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let accepted = app.state.hub.publish(BroadcastEvent::new(
        BroadcastKind::Post,
        "New Post!",
        "alice shared something new",
        "alice",
        "/uploads/a.png",
        occurred_at,
    ));
    assert!(accepted);

    let expected = json!({
        "type": "post",
        "title": "New Post!",
        "body": "alice shared something new",
        "username": "alice",
        "avatar": "/uploads/a.png",
        "created_at": "2024-05-01T10:00:00+00:00"
    });

    let received: Value = serde_json::from_str(&first.receive_text().await).unwrap();
    assert_eq!(received, expected);
    let received: Value = serde_json::from_str(&second.receive_text().await).unwrap();
    assert_eq!(received, expected);
}

#[tokio::test]
async fn test_closed_flash_connection_is_unregistered() {
    let app = TestApp::new().await;

    let staying = app.server.get_websocket("/flash").await.into_websocket().await;
    let leaving = app.server.get_websocket("/flash").await.into_websocket().await;
    wait_for_subscribers(&app.state.hub, 2).await;

    leaving.close().await;

    wait_for_subscribers(&app.state.hub, 1).await;
    drop(staying);
}

#[tokio::test]
async fn test_hub_shutdown_closes_flash_connections() {
    let app = TestApp::new().await;

    let _client = app.server.get_websocket("/flash").await.into_websocket().await;
    wait_for_subscribers(&app.state.hub, 1).await;

    app.state.hub.shutdown().await;

    assert!(app.state.hub.snapshot().await.is_empty());
    assert!(!app.state.hub.publish(BroadcastEvent::new(
        BroadcastKind::Trend,
        "Trending",
        "#rust",
        "chattr",
        "",
        Utc::now(),
    )));
}
