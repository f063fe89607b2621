//! Flash Subscribers
//!
//! A subscriber is the write half of one live connection plus the signal
//! that tells its read loop when the hub has let go of it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Upper bound for the best-effort close of a released connection.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Opaque subscriber handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Write errors on a subscriber connection.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("connection closed")]
    Closed,

    #[error("write failed: {0}")]
    Write(String),
}

/// Outbound side of a subscriber connection.
#[async_trait]
pub trait EventSink: Send {
    /// Write one text frame.
    async fn send_text(&mut self, payload: &str) -> Result<(), SinkError>;

    /// Close the connection. Errors are ignored.
    async fn close(&mut self);
}

/// [`EventSink`] over the write half of an axum WebSocket.
pub struct WsSink {
    inner: SplitSink<WebSocket, Message>,
}

impl WsSink {
    pub fn new(inner: SplitSink<WebSocket, Message>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EventSink for WsSink {
    async fn send_text(&mut self, payload: &str) -> Result<(), SinkError> {
        self.inner
            .send(Message::Text(payload.to_owned().into()))
            .await
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.inner.send(Message::Close(None)).await;
        let _ = self.inner.close().await;
    }
}

/// Resolves once the hub has released the subscriber (or the hub is gone).
pub type ReleaseSignal = oneshot::Receiver<()>;

/// A live connection owned by the hub's registry.
pub struct Subscriber {
    id: SubscriberId,
    sink: Box<dyn EventSink>,
    released: Option<oneshot::Sender<()>>,
}

impl Subscriber {
    /// Wrap a connection. The returned signal fires when the hub releases it.
    pub fn new(sink: impl EventSink + 'static) -> (Self, ReleaseSignal) {
        let (tx, rx) = oneshot::channel();
        let subscriber = Self {
            id: SubscriberId::new(),
            sink: Box::new(sink),
            released: Some(tx),
        };
        (subscriber, rx)
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Write one serialized event, bounded by `deadline`.
    pub async fn deliver(&mut self, payload: &str, deadline: Duration) -> Result<(), SinkError> {
        match tokio::time::timeout(deadline, self.sink.send_text(payload)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Write(format!(
                "write exceeded {} ms deadline",
                deadline.as_millis()
            ))),
        }
    }

    /// Close the connection (best effort) and signal the read loop.
    pub async fn release(mut self) {
        let _ = tokio::time::timeout(CLOSE_TIMEOUT, self.sink.close()).await;
        if let Some(tx) = self.released.take() {
            let _ = tx.send(());
        }
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
