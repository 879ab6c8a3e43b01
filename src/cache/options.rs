//! Construction parameters for the built-in [`LruCache`](super::LruCache).

use std::fmt;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_AGE, DEFAULT_MAX_ENTRIES};

/// Measures the size of a value against the cache capacity.
pub type LengthFn<V> = Box<dyn Fn(&V) -> usize + Send>;

/// Receives every entry that leaves the cache.
pub type DisposeFn<V> = Box<dyn FnMut(&str, V) + Send>;

// == LRU Options ==
/// Parameters for building an [`LruCache`](super::LruCache).
///
/// Start from [`LruOptions::default`] and override only what you need;
/// every unset field keeps its default.
pub struct LruOptions<V> {
    /// Capacity, in units of `length`. Zero means unbounded.
    pub max: usize,
    /// Default lifetime of an entry. `None` or a zero duration means entries
    /// never age out.
    pub max_age: Option<Duration>,
    /// Size function; without one every value counts as 1.
    pub length: Option<LengthFn<V>>,
    /// Called with the key and value of every entry that is evicted,
    /// expired, deleted, overwritten, or refused.
    pub dispose: Option<DisposeFn<V>>,
    /// Return an expired value once from `get` before dropping it.
    pub stale: bool,
}

impl<V> LruOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_length(mut self, length: impl Fn(&V) -> usize + Send + 'static) -> Self {
        self.length = Some(Box::new(length));
        self
    }

    pub fn with_dispose(mut self, dispose: impl FnMut(&str, V) + Send + 'static) -> Self {
        self.dispose = Some(Box::new(dispose));
        self
    }

    pub fn with_stale(mut self, stale: bool) -> Self {
        self.stale = stale;
        self
    }
}

impl<V> Default for LruOptions<V> {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_ENTRIES,
            max_age: Some(DEFAULT_MAX_AGE),
            length: None,
            dispose: None,
            stale: false,
        }
    }
}

impl<V> fmt::Debug for LruOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruOptions")
            .field("max", &self.max)
            .field("max_age", &self.max_age)
            .field("length", &self.length.is_some())
            .field("dispose", &self.dispose.is_some())
            .field("stale", &self.stale)
            .finish()
    }
}
