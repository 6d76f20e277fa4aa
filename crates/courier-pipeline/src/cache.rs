//! # Read-Through Cache
//!
//! Keyed lookup that falls back to a backing store and memoizes the first
//! successful read per key. Failed reads are not cached; the next `get`
//! for that key asks the store again.
//!
//! Each key owns a slot guarded by its own lock. A caller takes the map lock
//! only long enough to find or create the slot, then holds the slot lock
//! across the backing read, so concurrent callers for one key perform a
//! single read while other keys proceed independently. Locks are always
//! taken map first, slot second.
//!
//! A slot leaves the map once it is empty and no caller holds it, so failed
//! lookups do not accumulate.
//!
//! The cache is independent of the dispatch pipeline.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The store has no value for the key
    #[error("Key not found in backing store")]
    NotFound,

    /// The store could not be read
    #[error("Backing store read failed: {0}")]
    ReadFailed(String),
}

/// Source of truth behind a [`ReadThroughCache`].
pub trait BackingStore<K, V>: Send + Sync {
    /// Read the value for `key`.
    fn read(&self, key: &K) -> Result<V, CacheError>;
}

type Slot<V> = Arc<Mutex<Option<V>>>;

/// Memoizing read-through cache.
pub struct ReadThroughCache<K, V, S>
where
    S: BackingStore<K, V>,
{
    store: S,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V, S> ReadThroughCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BackingStore<K, V>,
{
    /// Create an empty cache over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, reading it through on a miss.
    pub fn get(&self, key: &K) -> Result<V, CacheError> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut value = slot.lock();
        if let Some(cached) = value.as_ref() {
            return Ok(cached.clone());
        }

        match self.store.read(key) {
            Ok(fresh) => {
                *value = Some(fresh.clone());
                Ok(fresh)
            }
            Err(err) => {
                drop(value);
                self.release_if_unused(key, &slot);
                Err(err)
            }
        }
    }

    /// Remove `slot` from the map if it is still the current, empty slot for
    /// `key` and only the map and the caller reference it.
    fn release_if_unused(&self, key: &K, slot: &Slot<V>) {
        let mut slots = self.slots.lock();
        let current = slots
            .get(key)
            .is_some_and(|existing| Arc::ptr_eq(existing, slot));
        if current && Arc::strong_count(slot) == 2 && slot.lock().is_none() {
            slots.remove(key);
        }
    }

    /// Whether a value for `key` has been memoized.
    pub fn contains(&self, key: &K) -> bool {
        let Some(slot) = self.slots.lock().get(key).cloned() else {
            return false;
        };
        let filled = slot.lock().is_some();
        filled
    }

    /// Drop the memoized value for `key`, if any.
    ///
    /// A slot another caller still holds is cleared in place, after any read
    /// in flight on it completes, so later callers keep sharing one read.
    pub fn invalidate(&self, key: &K) {
        let slot = {
            let mut slots = self.slots.lock();
            let Some(slot) = slots.get(key).cloned() else {
                return;
            };
            if Arc::strong_count(&slot) == 2 {
                slots.remove(key);
                return;
            }
            slot
        };
        *slot.lock() = None;
    }

    /// Number of memoized values.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = self.slots.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    /// Whether nothing has been memoized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
