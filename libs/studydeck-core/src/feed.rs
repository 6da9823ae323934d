//! Live progress updates for subscribers.
//!
//! A [`ProgressFeed`] fans saved progress out to callbacks registered for a
//! (user, deck) key. Subscribing returns a [`Subscription`] handle; dropping
//! the handle unregisters the callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::progress::DeckProgress;

/// Identifies one progress document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub user_id: String,
    pub deck_id: String,
}

impl ProgressKey {
    pub fn new(user_id: impl Into<String>, deck_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            deck_id: deck_id.into(),
        }
    }
}

type Callback = Arc<dyn Fn(&DeckProgress) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_id: HashMap<u64, (ProgressKey, Callback)>,
}

/// Registry of progress listeners.
#[derive(Default, Clone)]
pub struct ProgressFeed {
    listeners: Arc<Mutex<Listeners>>,
}

impl ProgressFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for updates to `key`.
    pub fn subscribe<F>(&self, key: ProgressKey, callback: F) -> Subscription
    where
        F: Fn(&DeckProgress) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.by_id.insert(id, (key, Arc::new(callback)));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver `progress` to every listener registered for `key`.
    pub fn publish(&self, key: &ProgressKey, progress: &DeckProgress) {
        // Callbacks run outside the lock so they may subscribe or unsubscribe.
        let callbacks: Vec<Callback> = {
            let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners
                .by_id
                .values()
                .filter(|(k, _)| k == key)
                .map(|(_, cb)| Arc::clone(cb))
                .collect()
        };

        tracing::trace!(
            user_id = %key.user_id,
            deck_id = %key.deck_id,
            listeners = callbacks.len(),
            "publishing progress update"
        );

        for callback in callbacks {
            callback(progress);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for a registered listener. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .by_id
                .remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delivers_only_to_matching_key() {
        let feed = ProgressFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let _sub = feed.subscribe(ProgressKey::new("ana", "bio"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        feed.publish(&ProgressKey::new("ana", "bio"), &DeckProgress::new());
        feed.publish(&ProgressKey::new("ana", "chem"), &DeckProgress::new());
        feed.publish(&ProgressKey::new("ben", "bio"), &DeckProgress::new());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let feed = ProgressFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = feed.subscribe(ProgressKey::new("ana", "bio"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(feed.len(), 1);

        sub.unsubscribe();
        assert!(feed.is_empty());

        feed.publish(&ProgressKey::new("ana", "bio"), &DeckProgress::new());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_feed_is_harmless() {
        let feed = ProgressFeed::new();
        let sub = feed.subscribe(ProgressKey::new("ana", "bio"), |_| {});
        drop(feed);
        drop(sub);
    }
}
