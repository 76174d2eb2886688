//! Capacity-bounded LRU store with eviction notification.
//!
//! Ordering mechanics come from the `lru` crate; this wrapper adds the
//! engine's eviction contract: inserting a new key at capacity evicts
//! exactly the least-recently-used entry and notifies observers *before*
//! the new entry goes in. Replacing an existing key never evicts.

use std::hash::Hash;
use std::num::NonZeroUsize;

/// Fire-and-forget observer for cache evictions.
///
/// Observers must not block; an eviction never waits on them and ignores
/// anything they do.
pub trait EvictionObserver<K, V>: Send {
    fn on_evicted(&self, key: &K, value: &V);
}

impl<K, V, F: Fn(&K, &V) + Send> EvictionObserver<K, V> for F {
    fn on_evicted(&self, key: &K, value: &V) {
        self(key, value)
    }
}

/// Generic fixed-capacity key->value store with strict LRU eviction
pub struct LruCache<K: Hash + Eq, V> {
    inner: lru::LruCache<K, V>,
    observers: Vec<Box<dyn EvictionObserver<K, V>>>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Create a cache with the given capacity (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            inner: lru::LruCache::new(capacity),
            observers: Vec::new(),
        }
    }

    /// Register an eviction observer
    pub fn add_observer(&mut self, observer: Box<dyn EvictionObserver<K, V>>) {
        self.observers.push(observer);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// Look up a key, promoting it to most-recently-used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    /// Mutable lookup, promoting the key to most-recently-used
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    /// Look up a key without touching recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.inner.peek(key)
    }

    /// Insert a value.
    ///
    /// An existing key is replaced in place (and refreshed) with no
    /// eviction. A new key at capacity first evicts the single oldest
    /// entry and notifies observers with the evicted pair.
    pub fn put(&mut self, key: K, value: V) {
        if !self.inner.contains(&key) && self.inner.len() == self.inner.cap().get() {
            if let Some((old_key, old_value)) = self.inner.pop_lru() {
                for observer in &self.observers {
                    observer.on_evicted(&old_key, &old_value);
                }
            }
        }
        self.inner.put(key, value);
    }

    /// Remove a key, returning its value if present
    pub fn pop(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }
}
