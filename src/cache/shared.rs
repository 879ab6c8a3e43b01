//! Shared backing caches.
//!
//! A cache wrapped in `Rc<RefCell<_>>` or `Arc<Mutex<_>>` is itself a
//! [`Cache`], so several secure key caches can draw from one key space, or
//! the caller can keep a handle on the backing cache it hands over. The
//! wrapper's borrow or lock is the only concurrency discipline applied.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::cache::Cache;

impl<V, C: Cache<V>> Cache<V> for Rc<RefCell<C>> {
    fn set(&mut self, key: String, value: V, expire: Option<Duration>) {
        self.borrow_mut().set(key, value, expire);
    }

    fn get(&mut self, key: &str) -> Option<V> {
        self.borrow_mut().get(key)
    }

    fn has(&self, key: &str) -> bool {
        self.borrow().has(key)
    }

    fn del(&mut self, key: &str) {
        self.borrow_mut().del(key);
    }
}

// A panic while holding the lock leaves a cache that is still structurally
// valid, so poisoning is ignored.
fn lock<C>(cache: &Mutex<C>) -> MutexGuard<'_, C> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V, C: Cache<V>> Cache<V> for Arc<Mutex<C>> {
    fn set(&mut self, key: String, value: V, expire: Option<Duration>) {
        lock(self).set(key, value, expire);
    }

    fn get(&mut self, key: &str) -> Option<V> {
        lock(self).get(key)
    }

    fn has(&self, key: &str) -> bool {
        lock(self).has(key)
    }

    fn del(&mut self, key: &str) {
        lock(self).del(key);
    }
}
