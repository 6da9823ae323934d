//! Persistence contracts for deck progress and deck lookup.
//!
//! Saves are whole-document overwrites with no version check: the last writer
//! wins. Two sessions on the same (user, deck) pair can silently clobber each
//! other's progress, and that race is accepted.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::StoreError;
use crate::feed::{ProgressFeed, ProgressKey, Subscription};
use crate::progress::DeckProgress;
use crate::types::Deck;

/// Storage for per-user deck progress documents.
pub trait ProgressStore: Send + Sync {
    /// Load progress for a deck. Returns an empty map when nothing is stored.
    fn load(&self, user_id: &str, deck_id: &str) -> Result<DeckProgress, StoreError>;

    /// Replace the stored progress for a deck.
    fn save(&self, user_id: &str, deck_id: &str, progress: &DeckProgress) -> Result<(), StoreError>;
}

/// Lookup of published decks.
pub trait DeckCatalog: Send + Sync {
    fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>, StoreError>;
}

/// In-memory progress store with live update subscriptions.
#[derive(Default)]
pub struct MemoryProgressStore {
    documents: RwLock<HashMap<ProgressKey, DeckProgress>>,
    feed: ProgressFeed,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get notified whenever progress for (user, deck) is saved.
    pub fn subscribe<F>(&self, user_id: &str, deck_id: &str, callback: F) -> Subscription
    where
        F: Fn(&DeckProgress) + Send + Sync + 'static,
    {
        self.feed.subscribe(ProgressKey::new(user_id, deck_id), callback)
    }

    /// Drop every user's progress for a deck, as deck deletion does.
    pub fn remove_deck(&self, deck_id: &str) -> usize {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        let before = documents.len();
        documents.retain(|key, _| key.deck_id != deck_id);
        before - documents.len()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, user_id: &str, deck_id: &str) -> Result<DeckProgress, StoreError> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        Ok(documents
            .get(&ProgressKey::new(user_id, deck_id))
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, user_id: &str, deck_id: &str, progress: &DeckProgress) -> Result<(), StoreError> {
        let key = ProgressKey::new(user_id, deck_id);
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), progress.clone());

        self.feed.publish(&key, progress);
        Ok(())
    }
}

/// In-memory deck catalog.
#[derive(Default)]
pub struct MemoryDeckCatalog {
    decks: RwLock<HashMap<String, Deck>>,
}

impl MemoryDeckCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, deck: Deck) {
        self.decks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(deck.id.clone(), deck);
    }

    pub fn remove(&self, deck_id: &str) -> Option<Deck> {
        self.decks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(deck_id)
    }
}

impl DeckCatalog for MemoryDeckCatalog {
    fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>, StoreError> {
        Ok(self
            .decks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(deck_id)
            .cloned())
    }
}
