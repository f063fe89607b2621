//! Broadcast hub scenarios

use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use tokio_test::assert_ok;

use chattr_server::config::FlashSettings;
use chattr_server::domain::{BroadcastEvent, BroadcastKind};
use chattr_server::presentation::websocket::{BroadcastHub, Subscriber};

use crate::common::{ChannelSink, StalledSink, TEST_WRITE_TIMEOUT_MS};

fn flash_settings() -> FlashSettings {
    FlashSettings {
        write_timeout_ms: TEST_WRITE_TIMEOUT_MS,
        command_buffer: 64,
        max_message_size: 4096,
    }
}

fn post(title: &str) -> BroadcastEvent {
    BroadcastEvent::new(BroadcastKind::Post, title, "body", "alice", "", Utc::now())
}

fn title(payload: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(payload).unwrap();
    value["title"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_severed_subscriber_removed_others_delivered() {
    let (hub, _task) = BroadcastHub::spawn(&flash_settings());

    let (sink_a, mut rx_a, _) = ChannelSink::new();
    let (sink_b, mut rx_b, _) = ChannelSink::new();
    let (sink_c, rx_c, closed_c) = ChannelSink::new();

    let (a, _signal_a) = Subscriber::new(sink_a);
    let (b, _signal_b) = Subscriber::new(sink_b);
    let (c, signal_c) = Subscriber::new(sink_c);
    let severed = c.id();

    assert!(hub.register(a).await);
    assert!(hub.register(b).await);
    assert!(hub.register(c).await);

    // Third connection is gone before the event is published
    drop(rx_c);

    assert!(hub.publish(post("New Post!")));

    let snapshot = hub.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert!(!snapshot.contains(&severed));

    assert_eq!(title(&rx_a.recv().await.unwrap()), "New Post!");
    assert_eq!(title(&rx_b.recv().await.unwrap()), "New Post!");
    assert!(closed_c.load(Ordering::SeqCst));
    assert_ok!(signal_c.await);
}

#[tokio::test]
async fn test_events_arrive_in_publish_order() {
    let (hub, _task) = BroadcastHub::spawn(&flash_settings());
    let (sink, mut rx, _) = ChannelSink::new();
    hub.register(Subscriber::new(sink).0).await;

    for i in 0..20 {
        assert!(hub.publish(post(&format!("event-{}", i))));
    }
    hub.snapshot().await;

    for i in 0..20 {
        assert_eq!(title(&rx.recv().await.unwrap()), format!("event-{}", i));
    }
}

#[tokio::test]
async fn test_stalled_subscriber_does_not_block_producers() {
    let (hub, _task) = BroadcastHub::spawn(&flash_settings());
    let (sink, mut rx, _) = ChannelSink::new();

    hub.register(Subscriber::new(StalledSink).0).await;
    hub.register(Subscriber::new(sink).0).await;

    let first = hub.clone();
    let second = hub.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { first.publish(post("one")) }),
        tokio::spawn(async move { second.publish(post("two")) }),
    );
    assert!(a.unwrap() && b.unwrap());

    let received = tokio::time::timeout(Duration::from_secs(2), async {
        vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()]
    })
    .await
    .expect("live subscriber starved by stalled peer");

    assert_eq!(received.len(), 2);
    assert_eq!(hub.subscriber_count().await, 1);
}

#[tokio::test]
async fn test_read_loop_and_hub_unregister_race() {
    let (hub, _task) = BroadcastHub::spawn(&flash_settings());
    let (sink, rx, closed) = ChannelSink::new();
    let (subscriber, _signal) = Subscriber::new(sink);
    let id = subscriber.id();
    hub.register(subscriber).await;

    // Hub drops it on a failed write while the read loop also unregisters
    drop(rx);
    hub.publish(post("x"));
    hub.unregister(id).await;
    hub.unregister(id).await;

    assert!(hub.snapshot().await.is_empty());
    assert!(closed.load(Ordering::SeqCst));
}
