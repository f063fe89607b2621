//! Delivery gateway scenarios

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use chattr_server::application::services::{
    NotificationError, NotificationService, NotificationServiceImpl,
};
use chattr_server::domain::{NotificationKind, PushMessage};
use chattr_server::infrastructure::push::{DisabledPushClient, PushClient};

use crate::common::{
    user, InMemoryNotificationRepository, InMemoryUserRepository, PushBehavior,
    RecordingPushClient,
};

const PUSH_TIMEOUT: Duration = Duration::from_millis(100);

type Service = NotificationServiceImpl<InMemoryNotificationRepository, InMemoryUserRepository>;

fn service(
    notifications: Arc<InMemoryNotificationRepository>,
    push: Arc<dyn PushClient>,
) -> Service {
    let users = InMemoryUserRepository::with_users(vec![
        user(1, "bob", Some("Bob"), None),
        user(2, "alice", None, Some("alice-device")),
    ]);
    NotificationServiceImpl::new(notifications, Arc::new(users), push, PUSH_TIMEOUT)
}

async fn next_attempt(rx: &mut mpsc::UnboundedReceiver<PushMessage>) -> PushMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("push was never attempted")
        .expect("push client dropped")
}

#[tokio::test]
async fn test_notify_with_unconfigured_push_creates_one_row() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let service = service(notifications.clone(), Arc::new(DisabledPushClient));

    let dto = service
        .notify(2, NotificationKind::Follow, "New Follower", "Bob started following you!")
        .await
        .unwrap();

    let rows = notifications.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, dto.id);
    assert_eq!(rows[0].recipient_id, 2);
    assert_eq!(rows[0].kind, NotificationKind::Follow);
    assert!(!rows[0].is_read);
}

#[tokio::test]
async fn test_notify_with_failing_push_creates_one_row() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let (push, mut attempts) = RecordingPushClient::new(PushBehavior::Reject);
    let service = service(notifications.clone(), Arc::new(push));

    let result = service
        .notify(2, NotificationKind::Comment, "New Comment", "Bob commented on your post!")
        .await;

    assert!(result.is_ok());
    let attempt = next_attempt(&mut attempts).await;
    assert_eq!(attempt.target.token(), "alice-device");
    assert_eq!(notifications.rows_for(2).len(), 1);
}

#[tokio::test]
async fn test_notify_returns_before_hung_push() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let (push, mut attempts) = RecordingPushClient::new(PushBehavior::Hang);
    let service = service(notifications.clone(), Arc::new(push));

    let result = tokio::time::timeout(
        Duration::from_millis(500),
        service.notify(2, NotificationKind::Like, "New Like", "Bob liked your post!"),
    )
    .await
    .expect("notify waited on the push");

    assert!(result.is_ok());
    next_attempt(&mut attempts).await;
    assert_eq!(notifications.rows().len(), 1);
}

#[tokio::test]
async fn test_notify_skips_push_without_target() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let (push, mut attempts) = RecordingPushClient::new(PushBehavior::Accept);
    let service = service(notifications.clone(), Arc::new(push));

    service
        .notify(1, NotificationKind::Like, "New Like", "alice liked your post!")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(attempts.try_recv().is_err());
    assert_eq!(notifications.rows_for(1).len(), 1);
}

#[tokio::test]
async fn test_push_carries_kind_in_data() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let (push, mut attempts) = RecordingPushClient::new(PushBehavior::Accept);
    let service = service(notifications, Arc::new(push));

    service
        .notify(2, NotificationKind::Repost, "New Repost", "Bob shared your post!")
        .await
        .unwrap();

    let attempt = next_attempt(&mut attempts).await;
    assert_eq!(attempt.title, "New Repost");
    assert_eq!(attempt.data.get("type").map(String::as_str), Some("repost"));
}

#[tokio::test]
async fn test_persistence_failure_reaches_caller() {
    let notifications = Arc::new(InMemoryNotificationRepository::failing());
    let (push, mut attempts) = RecordingPushClient::new(PushBehavior::Accept);
    let service = service(notifications.clone(), Arc::new(push));

    let result = service
        .notify(2, NotificationKind::Tell, "New Anonymous Tell", "Someone sent you a new anonymous message!")
        .await;

    assert!(matches!(result, Err(NotificationError::Persistence(_))));
    assert!(notifications.rows().is_empty());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(attempts.try_recv().is_err());
}

#[tokio::test]
async fn test_inbox_and_mark_read() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let service = service(notifications, Arc::new(DisabledPushClient));

    let first = service
        .notify(2, NotificationKind::Like, "New Like", "Bob liked your post!")
        .await
        .unwrap();
    let second = service
        .notify(2, NotificationKind::Reply, "New Reply", "Bob replied to your comment!")
        .await
        .unwrap();

    let inbox = service.list_notifications(2).await.unwrap();
    assert_eq!(inbox.iter().map(|n| n.id).collect::<Vec<_>>(), vec![second.id, first.id]);

    assert!(matches!(
        service.mark_as_read(first.id, 1).await,
        Err(NotificationError::Forbidden)
    ));
    assert!(service.mark_as_read(first.id, 2).await.unwrap().is_read);
    assert!(matches!(
        service.mark_as_read(999, 2).await,
        Err(NotificationError::NotFound)
    ));
}

#[tokio::test]
async fn test_update_push_target_enables_push() {
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let (push, mut attempts) = RecordingPushClient::new(PushBehavior::Accept);
    let service = service(notifications, Arc::new(push));

    service.update_push_target(1, "bob-device").await.unwrap();
    service
        .notify(1, NotificationKind::Follow, "New Follower", "alice started following you!")
        .await
        .unwrap();

    assert_eq!(next_attempt(&mut attempts).await.target.token(), "bob-device");
    assert!(matches!(
        service.update_push_target(404, "token").await,
        Err(NotificationError::UserNotFound)
    ));
}
