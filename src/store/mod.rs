//! Conversation state: typed keys, a pluggable key-value store and the
//! request-id scheme used to pin an itinerary across the edit cycle.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use serde_json::Value;

use crate::error::Result;

/// How long cached conversation state stays valid.
pub const SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Typed store keys. Everything persisted goes under one of these, so key
/// collisions between features are impossible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// conversation-scoped scratch state
    Session { conversation: String },
    /// the itinerary currently being discussed in a conversation
    CurrentItinerary { conversation: String },
    /// an itinerary pinned by request id, surviving conversation resets
    PersistedItinerary { request_id: String },
    /// the most recent request id issued in a conversation
    LastRequest { conversation: String },
}

impl StoreKey {
    fn storage_key(&self) -> String {
        match self {
            StoreKey::Session { conversation } => format!("SESSION_{}", conversation),
            StoreKey::CurrentItinerary { conversation } => format!("ITIN_CUR_{}", conversation),
            StoreKey::PersistedItinerary { request_id } => format!("ITIN_REQ_{}", request_id),
            StoreKey::LastRequest { conversation } => format!("LAST_REQ_{}", conversation),
        }
    }
}

/// The persistence seam. Implementations must be safe to share across
/// request handlers.
pub trait StateStore: Send + Sync {
    fn put(&self, key: &StoreKey, value: &Value, ttl: Option<Duration>) -> Result<()>;
    fn get(&self, key: &StoreKey) -> Result<Option<Value>>;
    fn delete(&self, key: &StoreKey) -> Result<()>;
}

/// Process-local store with lazy TTL expiry.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, (Value, Option<Instant>)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Value, Option<Instant>)>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StateStore for InMemoryStore {
    fn put(&self, key: &StoreKey, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.lock()
            .insert(key.storage_key(), (value.clone(), deadline));
        Ok(())
    }

    fn get(&self, key: &StoreKey) -> Result<Option<Value>> {
        let mut entries = self.lock();
        let storage_key = key.storage_key();
        match entries.get(&storage_key) {
            Some((_, Some(deadline))) if *deadline <= Instant::now() => {
                entries.remove(&storage_key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &StoreKey) -> Result<()> {
        self.lock().remove(&key.storage_key());
        Ok(())
    }
}

/// Mint a new request id: "REQ-<UTC stamp>-<4 hex>". Unique enough to pin
/// one itinerary per generation within a conversation.
pub fn new_request_id() -> String {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let salt: u16 = rand::thread_rng().gen();
    format!("REQ-{}-{:04x}", stamp, salt)
}
