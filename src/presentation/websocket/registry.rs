//! Subscriber Registry
//!
//! The set of live flash subscribers. Owned and mutated only by the hub's
//! sequencer task, so a snapshot is always either the view before or after a
//! mutation, never a partial one.

use std::collections::HashMap;

use super::subscriber::{Subscriber, SubscriberId};

#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<SubscriberId, Subscriber>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. A handle that is already registered is handed back.
    pub fn register(&mut self, subscriber: Subscriber) -> Result<(), Subscriber> {
        let id = subscriber.id();
        if self.subscribers.contains_key(&id) {
            return Err(subscriber);
        }
        self.subscribers.insert(id, subscriber);
        Ok(())
    }

    /// Remove a subscriber, returning it so the caller can release the
    /// connection. `None` if it was already removed.
    pub fn unregister(&mut self, id: SubscriberId) -> Option<Subscriber> {
        self.subscribers.remove(&id)
    }

    /// The current live set.
    pub fn snapshot(&self) -> Vec<SubscriberId> {
        self.subscribers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Mutable access to every subscriber, one borrow per subscriber.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SubscriberId, &mut Subscriber)> {
        self.subscribers.iter_mut().map(|(id, s)| (*id, s))
    }

    /// Remove every subscriber.
    pub fn drain(&mut self) -> Vec<Subscriber> {
        self.subscribers.drain().map(|(_, s)| s).collect()
    }
}
