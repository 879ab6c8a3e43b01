//! Cache Store Module
//!
//! Default bounded cache combining HashMap storage with LRU tracking and
//! per-entry max age.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::cache::{Cache, CacheEntry, CacheStats, DisposeFn, LengthFn, LruOptions, LruTracker};

// == LRU Cache ==
/// Bounded cache with LRU eviction and max-age expiry.
///
/// Capacity is measured with the configured length function, so `max` is a
/// bound on the summed length of all entries rather than on their count
/// when a length function is set.
pub struct LruCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Summed length of all entries
    total_length: usize,
    max: usize,
    max_age: Option<Duration>,
    length: Option<LengthFn<V>>,
    dispose: Option<DisposeFn<V>>,
    stale: bool,
}

impl<V> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache from the given options.
    pub fn new(options: LruOptions<V>) -> Self {
        let LruOptions {
            max,
            max_age,
            length,
            dispose,
            stale,
        } = options;

        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            total_length: 0,
            max: if max == 0 { usize::MAX } else { max },
            max_age: max_age.filter(|age| !age.is_zero()),
            length,
            dispose,
            stale,
        }
    }

    // == Insert ==
    /// Stores a value, evicting least recently used entries as needed.
    ///
    /// `max_age` overrides the cache's default for this entry. `None` or a
    /// zero duration keeps the default.
    ///
    /// Returns false if the value alone exceeds capacity. In that case any
    /// previous entry under `key` is dropped as well and nothing is stored.
    pub fn insert(&mut self, key: String, value: V, max_age: Option<Duration>) -> bool {
        let length = self.length_of(&value);

        if length > self.max {
            trace!(length, max = self.max, "value exceeds cache capacity, refusing");
            self.stats.record_rejection();
            if let Some(old) = self.take_entry(&key) {
                self.dispose_value(&key, old.value);
            }
            self.dispose_value(&key, value);
            return false;
        }

        let max_age = max_age.filter(|age| !age.is_zero()).or(self.max_age);
        let entry = CacheEntry::new(value, length, max_age);
        if let Some(old) = self.entries.insert(key.clone(), entry) {
            self.total_length = self.total_length.saturating_sub(old.length);
            self.dispose_value(&key, old.value);
        }
        // saturates only when unbounded, where trim never runs
        self.total_length = self.total_length.saturating_add(length);
        self.lru.touch(&key);

        self.trim();
        self.stats.set_total_entries(self.entries.len());
        true
    }

    // == Peek ==
    /// Returns a reference to the value without updating recency.
    ///
    /// Expired values are only visible when the cache was built with `stale`.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() && !self.stale {
            return None;
        }
        Some(&entry.value)
    }

    // == Remove ==
    /// Removes an entry, returning its value without disposing it.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.take_entry(key).map(|entry| entry.value)
    }

    // == Prune ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            if let Some(entry) = self.take_entry(&key) {
                self.stats.record_expiration();
                self.dispose_value(&key, entry.value);
            }
        }

        count
    }

    // == Reset ==
    /// Drops every entry, disposing each one.
    pub fn reset(&mut self) {
        let entries: Vec<(String, CacheEntry<V>)> = self.entries.drain().collect();
        self.lru.clear();
        self.total_length = 0;
        self.stats.set_total_entries(0);

        for (key, entry) in entries {
            self.dispose_value(&key, entry.value);
        }
    }

    /// Keys in the cache, most recently used first. May include expired
    /// entries that have not been pruned yet.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter_recent().cloned().collect()
    }

    /// Summed length of all entries.
    pub fn len(&self) -> usize {
        self.total_length
    }

    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    fn length_of(&self, value: &V) -> usize {
        self.length.as_ref().map_or(1, |length| length(value))
    }

    fn take_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.total_length = self.total_length.saturating_sub(entry.length);
        self.stats.set_total_entries(self.entries.len());
        Some(entry)
    }

    fn dispose_value(&mut self, key: &str, value: V) {
        if let Some(dispose) = self.dispose.as_mut() {
            dispose(key, value);
        }
    }

    // == Trim ==
    /// Evicts least recently used entries until the cache fits its capacity.
    fn trim(&mut self) {
        while self.total_length > self.max {
            let Some(key) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_length = self.total_length.saturating_sub(entry.length);
                self.stats.record_eviction();
                trace!(key = %key, "evicted least recently used entry");
                self.dispose_value(&key, entry.value);
            }
        }
    }
}

impl<V: Clone> Cache<V> for LruCache<V> {
    fn set(&mut self, key: String, value: V, expire: Option<Duration>) {
        self.insert(key, value, expire);
    }

    fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            let entry = self.take_entry(key)?;
            self.stats.record_expiration();
            self.stats.record_miss();
            let value = self.stale.then(|| entry.value.clone());
            self.dispose_value(key, entry.value);
            return value;
        }

        self.lru.touch(key);
        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    fn del(&mut self, key: &str) {
        if let Some(entry) = self.take_entry(key) {
            self.dispose_value(key, entry.value);
        }
    }
}

impl<V> Default for LruCache<V> {
    fn default() -> Self {
        Self::new(LruOptions::default())
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("item_count", &self.entries.len())
            .field("total_length", &self.total_length)
            .field("max", &self.max)
            .field("max_age", &self.max_age)
            .field("stale", &self.stale)
            .field("stats", &self.stats)
            .finish()
    }
}
