//! Broadcast Hub
//!
//! A single sequencer task owns the [`SubscriberRegistry`] and applies
//! register, unregister and publish commands one at a time, in the order they
//! reach its inbox. Producers only ever hold a cloneable [`BroadcastHub`]
//! handle.
//!
//! Lifecycle: spawned once at startup, runs until [`BroadcastHub::shutdown`]
//! or until every handle is dropped. Afterwards publishes are dropped and
//! registrations are refused.

use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::registry::SubscriberRegistry;
use super::subscriber::{Subscriber, SubscriberId};
use crate::application::services::EventPublisher;
use crate::config::FlashSettings;
use crate::domain::BroadcastEvent;
use crate::infrastructure::metrics;

/// Commands processed by the sequencer.
enum HubCommand {
    Register(Subscriber),
    Unregister(SubscriberId),
    Publish(BroadcastEvent),
    Snapshot(oneshot::Sender<Vec<SubscriberId>>),
    Shutdown,
}

/// Handle to the broadcast hub.
#[derive(Clone, Debug)]
pub struct BroadcastHub {
    commands: mpsc::Sender<HubCommand>,
}

impl BroadcastHub {
    /// Start the sequencer task.
    pub fn spawn(settings: &FlashSettings) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(settings.command_buffer.max(1));
        let sequencer = Sequencer {
            inbox: rx,
            registry: SubscriberRegistry::new(),
            write_timeout: settings.write_timeout(),
        };
        let task = tokio::spawn(sequencer.run());
        (Self { commands: tx }, task)
    }

    /// Add a live subscriber. Returns `false` if the hub has stopped, in
    /// which case the subscriber is dropped and its connection closed.
    pub async fn register(&self, subscriber: Subscriber) -> bool {
        let id = subscriber.id();
        match self.commands.send(HubCommand::Register(subscriber)).await {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(subscriber_id = %id, "Hub stopped, registration refused");
                false
            }
        }
    }

    /// Remove a subscriber and close its connection. Unknown or already
    /// removed subscribers are ignored.
    pub async fn unregister(&self, id: SubscriberId) {
        if self.commands.send(HubCommand::Unregister(id)).await.is_err() {
            tracing::debug!(subscriber_id = %id, "Hub stopped, unregister ignored");
        }
    }

    /// Hand an event to the sequencer without waiting for delivery.
    ///
    /// Never fails from the caller's point of view: when the inbox is full or
    /// the hub has stopped, the event is dropped. Returns whether it was
    /// accepted.
    pub fn publish(&self, event: BroadcastEvent) -> bool {
        match self.commands.try_send(HubCommand::Publish(event)) {
            Ok(()) => {
                metrics::record_flash_event("sequenced");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                metrics::record_flash_event("dropped");
                tracing::warn!("Hub inbox full, broadcast event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                metrics::record_flash_event("dropped");
                tracing::debug!("Hub stopped, broadcast event dropped");
                false
            }
        }
    }

    /// IDs of the live subscribers as seen by the sequencer after every
    /// command queued before this call. Empty once the hub has stopped.
    pub async fn snapshot(&self) -> Vec<SubscriberId> {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(HubCommand::Snapshot(tx)).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.snapshot().await.len()
    }

    /// Stop the sequencer and close every connection. Returns once the hub
    /// refuses new commands.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(HubCommand::Shutdown).await;
        self.commands.closed().await;
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

impl EventPublisher for BroadcastHub {
    fn publish(&self, event: BroadcastEvent) -> bool {
        BroadcastHub::publish(self, event)
    }
}

/// The hub's single serializing worker.
struct Sequencer {
    inbox: mpsc::Receiver<HubCommand>,
    registry: SubscriberRegistry,
    write_timeout: Duration,
}

impl Sequencer {
    async fn run(mut self) {
        tracing::info!(
            write_timeout_ms = self.write_timeout.as_millis() as u64,
            "Broadcast hub started"
        );

        while let Some(command) = self.inbox.recv().await {
            match command {
                HubCommand::Register(subscriber) => self.register(subscriber).await,
                HubCommand::Unregister(id) => self.unregister(id).await,
                HubCommand::Publish(event) => self.fan_out(event).await,
                HubCommand::Snapshot(reply) => {
                    let _ = reply.send(self.registry.snapshot());
                }
                HubCommand::Shutdown => break,
            }
        }

        self.inbox.close();
        let remaining = self.registry.drain();
        let count = remaining.len();
        join_all(remaining.into_iter().map(Subscriber::release)).await;
        metrics::set_flash_subscribers(0);

        tracing::info!(closed = count, "Broadcast hub stopped");
    }

    async fn register(&mut self, subscriber: Subscriber) {
        let id = subscriber.id();
        match self.registry.register(subscriber) {
            Ok(()) => {
                metrics::set_flash_subscribers(self.registry.len());
                tracing::info!(
                    subscriber_id = %id,
                    total = self.registry.len(),
                    "Flash subscriber connected"
                );
            }
            Err(duplicate) => {
                tracing::warn!(subscriber_id = %id, "Subscriber already registered, closing duplicate");
                duplicate.release().await;
            }
        }
    }

    async fn unregister(&mut self, id: SubscriberId) {
        if let Some(subscriber) = self.registry.unregister(id) {
            subscriber.release().await;
            metrics::set_flash_subscribers(self.registry.len());
            tracing::info!(
                subscriber_id = %id,
                total = self.registry.len(),
                "Flash subscriber disconnected"
            );
        }
    }

    /// Serialize once, write to every live subscriber concurrently with a
    /// per-write deadline, then drop the ones that failed. The whole call is
    /// bounded by one write deadline plus one close deadline.
    async fn fan_out(&mut self, event: BroadcastEvent) {
        let payload = match event.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, kind = event.kind().as_str(), "Failed to serialize broadcast event");
                return;
            }
        };

        if self.registry.is_empty() {
            return;
        }

        let deadline = self.write_timeout;
        let payload = payload.as_str();
        let results = join_all(self.registry.iter_mut().map(|(id, subscriber)| async move {
            (id, subscriber.deliver(payload, deadline).await)
        }))
        .await;

        let mut delivered = 0usize;
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(subscriber_id = %id, error = %e, "Flash write failed, dropping subscriber");
                    failed.push(id);
                }
            }
        }

        // Detach every failed subscriber before closing any, then close them
        // together: a hung close must not hold up the next command.
        let dropped: Vec<Subscriber> = failed
            .into_iter()
            .filter_map(|id| self.registry.unregister(id))
            .collect();
        if !dropped.is_empty() {
            metrics::set_flash_subscribers(self.registry.len());
            for subscriber in &dropped {
                metrics::record_flash_delivery_failure();
                tracing::info!(
                    subscriber_id = %subscriber.id(),
                    total = self.registry.len(),
                    "Flash subscriber disconnected"
                );
            }
            join_all(dropped.into_iter().map(Subscriber::release)).await;
        }

        tracing::debug!(
            kind = event.kind().as_str(),
            delivered,
            remaining = self.registry.len(),
            "Broadcast event delivered"
        );
    }
}
