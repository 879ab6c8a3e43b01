//! Cache Module
//!
//! Defines the bounded cache capability consumed by the secure key cache,
//! and the default LRU implementation with per-entry max age.

mod entry;
mod lru;
mod options;
mod shared;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use options::{DisposeFn, LengthFn, LruOptions};
pub use stats::CacheStats;
pub use store::LruCache;

// == Public Constants ==
/// Default capacity of the built-in cache
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Default maximum age of entries in the built-in cache
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(15 * 60);

// == Cache Capability ==
/// Minimal string-keyed cache contract.
///
/// Any type implementing these four operations can back a
/// [`CsrKeyCache`](crate::CsrKeyCache). Implementations decide their own
/// eviction and expiry rules; callers only rely on per-key consistency for
/// sequential access.
pub trait Cache<V> {
    /// Stores `value` under `key`.
    ///
    /// `expire` is an optional per-entry lifetime. Its exact meaning is
    /// defined by the implementation; `None` defers to the cache's default.
    /// [`LruCache`] also treats a zero duration as `None`.
    /// A cache may silently refuse to store a value.
    fn set(&mut self, key: String, value: V, expire: Option<Duration>);

    /// Returns the value stored under `key`, or `None` if absent or expired.
    fn get(&mut self, key: &str) -> Option<V>;

    /// Returns true if a live value is stored under `key`.
    fn has(&self, key: &str) -> bool;

    /// Removes the entry under `key`, if any.
    fn del(&mut self, key: &str);
}
