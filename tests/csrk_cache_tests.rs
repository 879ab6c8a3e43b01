//! Integration Tests for the Secure Key Cache
//!
//! Exercises the public factory against the default backing cache and
//! against caller-supplied backing caches.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use csrk_cache::{
    csr_key_cache, Cache, CacheSettings, CsrKeyCache, CsrKeyCacheConfig, LruCache, LruOptions,
    OsCsrng, Result,
};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "csrk_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Backing cache that records every call it receives.
#[derive(Default)]
struct RecordingCache {
    entries: std::collections::HashMap<String, String>,
    calls: Vec<String>,
}

impl Cache<String> for RecordingCache {
    fn set(&mut self, key: String, value: String, expire: Option<Duration>) {
        self.calls.push(format!("set:{:?}", expire));
        self.entries.insert(key, value);
    }

    fn get(&mut self, key: &str) -> Option<String> {
        self.calls.push("get".to_string());
        self.entries.get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn del(&mut self, key: &str) {
        self.calls.push("del".to_string());
        self.entries.remove(key);
    }
}

/// Backing cache that accepts writes but never keeps anything.
struct BlackHole;

impl Cache<String> for BlackHole {
    fn set(&mut self, _key: String, _value: String, _expire: Option<Duration>) {}

    fn get(&mut self, _key: &str) -> Option<String> {
        None
    }

    fn has(&self, _key: &str) -> bool {
        false
    }

    fn del(&mut self, _key: &str) {}
}

// == Default Configuration ==

#[test]
fn test_default_config_round_trip() {
    init_tracing();
    let mut cache = csr_key_cache(None);

    let key = cache.set("x".to_string(), None).unwrap().unwrap();

    assert_eq!(key.len(), 44);
    assert_eq!(BASE64_STANDARD.decode(&key).unwrap().len(), 32);
    assert!(cache.has(&key));
    assert_eq!(cache.get(&key), Some("x".to_string()));
}

#[test]
fn test_keys_pairwise_distinct() {
    let mut cache = csr_key_cache(None);
    let mut keys = HashSet::new();

    for i in 0..500u32 {
        let key = cache.set(i, None).unwrap().unwrap();
        assert!(keys.insert(key));
    }
}

#[test]
fn test_get_unknown_key() {
    let mut cache: CsrKeyCache<String> = csr_key_cache(None);

    assert_eq!(cache.get("not-a-key"), None);
    assert!(!cache.has("not-a-key"));
    cache.del("not-a-key");
}

// == Backing Cache Selection ==

#[test]
fn test_provided_cache_receives_calls() {
    let backing = Rc::new(RefCell::new(RecordingCache::default()));
    let mut cache = csr_key_cache(Some(
        CsrKeyCacheConfig::new().with_cache(Rc::clone(&backing)),
    ));

    let key = cache
        .set("value".to_string(), Some(Duration::from_secs(5)))
        .unwrap()
        .unwrap();
    assert_eq!(cache.get(&key), Some("value".to_string()));
    cache.del(&key);

    let recorded = backing.borrow();
    assert_eq!(recorded.calls, vec!["set:Some(5s)", "get", "del"]);
    assert!(recorded.entries.is_empty());
}

#[test]
fn test_cache_options_build_default_cache() {
    let mut cache = csr_key_cache(Some(CsrKeyCacheConfig::new().with_cache_options(
        LruOptions::new()
            .with_max(2)
            .with_max_age(Some(Duration::from_millis(1000))),
    )));

    let first = cache.set("one".to_string(), None).unwrap().unwrap();
    let second = cache.set("two".to_string(), None).unwrap().unwrap();
    let third = cache.set("three".to_string(), None).unwrap().unwrap();

    assert!(!cache.has(&first));
    assert!(cache.has(&second));
    assert!(cache.has(&third));
}

#[test]
fn test_shared_backing_cache_between_facades() {
    let backing = Arc::new(Mutex::new(LruCache::<String>::default()));
    let mut alice = csr_key_cache(Some(
        CsrKeyCacheConfig::new().with_cache(Arc::clone(&backing)),
    ));
    let mut bob = csr_key_cache(Some(
        CsrKeyCacheConfig::new().with_cache(Arc::clone(&backing)),
    ));

    let key = alice.set("from alice".to_string(), None).unwrap().unwrap();

    assert_eq!(bob.get(&key), Some("from alice".to_string()));
    assert_eq!(backing.lock().unwrap().item_count(), 1);
}

#[test]
fn test_shared_backing_cache_across_threads() {
    let backing = Arc::new(Mutex::new(LruCache::new(
        LruOptions::new().with_length(|v: &String| v.len()),
    )));

    let writers: Vec<_> = (0..2)
        .map(|id| {
            let shared = Arc::clone(&backing);
            std::thread::spawn(move || {
                let mut cache = csr_key_cache(Some(CsrKeyCacheConfig::new().with_cache(shared)));
                (0..50)
                    .map(|i| {
                        let value = format!("thread {} value {}", id, i);
                        let key = cache.set(value.clone(), None).unwrap().unwrap();
                        (key, value)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let stored: Vec<(String, String)> = writers
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    let mut reader = csr_key_cache(Some(CsrKeyCacheConfig::new().with_cache(Arc::clone(&backing))));
    let keys: HashSet<&String> = stored.iter().map(|(key, _)| key).collect();
    assert_eq!(keys.len(), 100);
    for (key, value) in &stored {
        assert_eq!(reader.get(key).as_ref(), Some(value));
    }
    assert_eq!(backing.lock().unwrap().item_count(), 100);
}

// == Failure Modes ==

#[test]
fn test_store_failure_returns_none() {
    init_tracing();
    let mut cache = csr_key_cache(Some(CsrKeyCacheConfig::new().with_cache(BlackHole)));

    assert_eq!(cache.set("lost".to_string(), None).unwrap(), None);
}

#[test]
fn test_collision_retry_draws_exactly_n_plus_one() {
    init_tracing();
    const COLLISIONS: usize = 5;

    let colliding = vec![7u8; 32];
    let taken = BASE64_STANDARD.encode(&colliding);
    let backing = Rc::new(RefCell::new(LruCache::<String>::default()));
    backing
        .borrow_mut()
        .set(taken.clone(), "occupied".to_string(), None);

    let draws = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&draws);
    let mut os = OsCsrng;
    let csrng = move |length: usize| -> Result<Vec<u8>> {
        counter.set(counter.get() + 1);
        if counter.get() <= COLLISIONS {
            Ok(colliding.clone())
        } else {
            csrk_cache::Csrng::random_bytes(&mut os, length)
        }
    };

    let mut cache = csr_key_cache(Some(
        CsrKeyCacheConfig::new()
            .with_cache(Rc::clone(&backing))
            .with_csrng(csrng),
    ));

    let key = cache.set("fresh".to_string(), None).unwrap().unwrap();

    assert_eq!(draws.get(), COLLISIONS + 1);
    assert_ne!(key, taken);
    assert_eq!(cache.get(&taken), Some("occupied".to_string()));
}

// == Expiry ==

#[test]
fn test_expire_shorter_than_max_age() {
    let mut cache = csr_key_cache(None);

    let short = cache
        .set("short", Some(Duration::from_millis(30)))
        .unwrap()
        .unwrap();
    let long = cache.set("long", None).unwrap().unwrap();

    sleep(Duration::from_millis(60));

    assert!(!cache.has(&short));
    assert_eq!(cache.get(&short), None);
    assert_eq!(cache.get(&long), Some("long"));
}

// == Settings ==

#[test]
fn test_settings_json_into_config() {
    let settings = CacheSettings::from_json(r#"{"max_entries": 1, "keylength": 16}"#).unwrap();
    let mut cache = csr_key_cache(Some(settings.into_config()));

    let first = cache.set(1u64, None).unwrap().unwrap();
    let second = cache.set(2u64, None).unwrap().unwrap();

    assert_eq!(cache.keylength(), 16);
    assert_eq!(first.len(), 24);
    assert!(!cache.has(&first));
    assert_eq!(cache.get(&second), Some(2));
}
