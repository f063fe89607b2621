//! Mention resolver and activity scenarios

use std::sync::Arc;

use chrono::Utc;
use pretty_assertions::assert_eq;

use chattr_server::application::services::{
    ActivityService, ActivityServiceImpl, MentionService, MentionServiceImpl,
    NotificationServiceImpl,
};
use chattr_server::config::FlashSettings;
use chattr_server::domain::{Activity, NotificationKind};
use chattr_server::infrastructure::push::DisabledPushClient;
use chattr_server::presentation::websocket::{BroadcastHub, Subscriber};

use crate::common::{user, ChannelSink, InMemoryNotificationRepository, InMemoryUserRepository};

type Gateway = NotificationServiceImpl<InMemoryNotificationRepository, InMemoryUserRepository>;

struct Fixture {
    users: Arc<InMemoryUserRepository>,
    notifications: Arc<InMemoryNotificationRepository>,
    gateway: Arc<Gateway>,
}

fn fixture() -> Fixture {
    let users = Arc::new(InMemoryUserRepository::with_users(vec![
        user(1, "carol", Some("Carol"), None),
        user(2, "alice", Some("Alice A"), None),
        user(3, "Bob", None, None),
    ]));
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let gateway = Arc::new(NotificationServiceImpl::new(
        notifications.clone(),
        users.clone(),
        Arc::new(DisabledPushClient),
        std::time::Duration::from_millis(100),
    ));
    Fixture {
        users,
        notifications,
        gateway,
    }
}

#[tokio::test]
async fn test_mentions_notify_each_resolved_user_once() {
    let f = fixture();
    let resolver = MentionServiceImpl::new(f.users.clone(), f.gateway.clone());

    let notified = resolver
        .resolve_mentions("hi @alice and @bob, not @alice again", 1, "a post")
        .await
        .unwrap();

    // "bob" does not match "Bob": usernames are case-sensitive
    assert_eq!(notified, vec![2]);

    let rows = f.notifications.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].recipient_id, 2);
    assert_eq!(rows[0].kind, NotificationKind::Mention);
    assert_eq!(rows[0].title, "New Mention");
    assert_eq!(rows[0].body, "Carol mentioned you in a post");
}

#[tokio::test]
async fn test_self_mention_never_notifies() {
    let f = fixture();
    let resolver = MentionServiceImpl::new(f.users.clone(), f.gateway.clone());

    let notified = resolver
        .resolve_mentions("@carol reminding myself", 1, "a comment")
        .await
        .unwrap();

    assert!(notified.is_empty());
    assert!(f.notifications.rows().is_empty());
}

#[tokio::test]
async fn test_unresolved_mentions_are_not_errors() {
    let f = fixture();
    let resolver = MentionServiceImpl::new(f.users.clone(), f.gateway.clone());

    let notified = resolver
        .resolve_mentions("email me at someone@example.com or ping @nobody", 1, "a post")
        .await
        .unwrap();

    assert!(notified.is_empty());
}

#[tokio::test]
async fn test_activity_record_and_announce() {
    let f = fixture();
    let flash = FlashSettings {
        write_timeout_ms: 50,
        command_buffer: 16,
        max_message_size: 4096,
    };
    let (hub, _task) = BroadcastHub::spawn(&flash);
    let (sink, mut rx, _) = ChannelSink::new();
    hub.register(Subscriber::new(sink).0).await;

    let activities = ActivityServiceImpl::new(f.users.clone(), f.gateway.clone(), Arc::new(hub.clone()));

    let followed = activities.record(3, 2, Activity::Follow).await.unwrap();
    let own = activities.record(2, 2, Activity::Follow).await.unwrap();
    assert!(followed.is_some());
    assert!(own.is_none());

    let rows = f.notifications.rows_for(2);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].body, "Bob started following you!");

    assert!(activities.announce_follow(3, 2).await.unwrap());
    assert!(activities.announce_post(2, Utc::now()).await.unwrap());
    hub.snapshot().await;

    let follow: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(follow["type"], "follow");
    assert_eq!(follow["body"], "Bob started following alice");

    let post: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(post["type"], "post");
    assert_eq!(post["title"], "New Post!");
}
