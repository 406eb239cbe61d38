//! Key-value store with per-entry expiry.
//!
//! Keys are written with set-if-absent semantics: the first writer wins and an
//! entry is never overwritten while it lives, which gives at-most-once
//! execution per key without holding a lock across an await.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct StoredValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> StoredValue<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Concurrent map whose entries may expire.
#[derive(Debug)]
pub struct ExpiringStore<V> {
    entries: DashMap<String, StoredValue<V>>,
}

impl<V: Clone> Default for ExpiringStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ExpiringStore<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Live value for `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Write `value` unless a live entry exists. Returns whether it wrote.
    ///
    /// `ttl` of `None` keeps the entry until removed.
    pub fn set_if_absent(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> bool {
        let now = Instant::now();
        let stored = StoredValue {
            value,
            expires_at: ttl.map(|ttl| now + ttl),
        };
        match self.entries.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    occupied.insert(stored);
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
                true
            }
        }
    }

    /// Overwrite `key` in place, live or not.
    ///
    /// The entry is never vacant during the write, so a concurrent
    /// [`set_if_absent`](Self::set_if_absent) cannot slip in.
    pub fn replace(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let stored = StoredValue {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        match self.entries.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(stored);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
            }
        }
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
