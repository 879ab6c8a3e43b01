//! Configuration Module
//!
//! Construction options for [`CsrKeyCache`](crate::CsrKeyCache), plus plain
//! data settings that can be loaded from environment variables or JSON.

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{Cache, LruCache, LruOptions, DEFAULT_MAX_AGE, DEFAULT_MAX_ENTRIES};
use crate::csrng::{Csrng, OsCsrng};
use crate::error::Result;

/// Default number of random bytes behind each key
pub const DEFAULT_KEY_LENGTH: usize = 32;

// == Backing Cache ==
/// Either a ready backing cache or the options to build the default one.
pub enum BackingCache<V> {
    /// A caller-supplied cache, used as is
    Provided(Box<dyn Cache<V>>),
    /// Options for a built-in [`LruCache`]
    Options(LruOptions<V>),
}

impl<V: Clone + 'static> BackingCache<V> {
    /// Resolves into the cache the facade will own.
    pub fn into_cache(self) -> Box<dyn Cache<V>> {
        match self {
            BackingCache::Provided(cache) => cache,
            BackingCache::Options(options) => Box::new(LruCache::new(options)),
        }
    }
}

impl<V> Default for BackingCache<V> {
    fn default() -> Self {
        BackingCache::Options(LruOptions::default())
    }
}

impl<V> From<LruOptions<V>> for BackingCache<V> {
    fn from(options: LruOptions<V>) -> Self {
        BackingCache::Options(options)
    }
}

impl<V> fmt::Debug for BackingCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackingCache::Provided(_) => f.write_str("Provided(..)"),
            BackingCache::Options(options) => f.debug_tuple("Options").field(options).finish(),
        }
    }
}

// == Cache Config ==
/// Options for building a [`CsrKeyCache`](crate::CsrKeyCache).
///
/// Every field is optional. Unset fields resolve to: a default
/// [`LruCache`] (1024 entries, 15 minute max age), 32 byte keys, and the
/// operating system random source.
pub struct CsrKeyCacheConfig<V> {
    pub cache: Option<BackingCache<V>>,
    pub keylength: Option<usize>,
    pub csrng: Option<Box<dyn Csrng>>,
}

impl<V> CsrKeyCacheConfig<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `cache` as the backing cache.
    pub fn with_cache(mut self, cache: impl Cache<V> + 'static) -> Self {
        self.cache = Some(BackingCache::Provided(Box::new(cache)));
        self
    }

    /// Builds the default backing cache from `options`.
    pub fn with_cache_options(mut self, options: LruOptions<V>) -> Self {
        self.cache = Some(BackingCache::Options(options));
        self
    }

    pub fn with_keylength(mut self, keylength: usize) -> Self {
        self.keylength = Some(keylength);
        self
    }

    pub fn with_csrng(mut self, csrng: impl Csrng + 'static) -> Self {
        self.csrng = Some(Box::new(csrng));
        self
    }

    /// Fills unset fields with defaults.
    pub fn resolve(self) -> (BackingCache<V>, usize, Box<dyn Csrng>) {
        (
            self.cache.unwrap_or_default(),
            self.keylength.unwrap_or(DEFAULT_KEY_LENGTH),
            self.csrng.unwrap_or_else(|| Box::new(OsCsrng)),
        )
    }
}

impl<V> Default for CsrKeyCacheConfig<V> {
    fn default() -> Self {
        Self {
            cache: None,
            keylength: None,
            csrng: None,
        }
    }
}

impl<V> fmt::Debug for CsrKeyCacheConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrKeyCacheConfig")
            .field("cache", &self.cache)
            .field("keylength", &self.keylength)
            .field("csrng", &self.csrng.as_ref().map(|_| ".."))
            .finish()
    }
}

// == Cache Settings ==
/// Plain data settings for the default cache.
///
/// Missing JSON fields and unset or unparsable environment variables keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Capacity of the backing cache; 0 means unbounded
    pub max_entries: usize,
    /// Max age of entries in milliseconds; 0 means no age limit
    pub max_age_ms: u64,
    /// Return expired values once before dropping them
    pub stale: bool,
    /// Random bytes per key
    pub keylength: usize,
}

impl CacheSettings {
    /// Loads settings from environment variables.
    ///
    /// # Environment Variables
    /// - `CSRK_MAX_ENTRIES` - Backing cache capacity (default: 1024)
    /// - `CSRK_MAX_AGE_MS` - Entry max age in milliseconds (default: 900000)
    /// - `CSRK_STALE` - Serve stale values once, `true`/`1` (default: false)
    /// - `CSRK_KEYLENGTH` - Random bytes per key (default: 32)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_env("CSRK_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            max_age_ms: parse_env("CSRK_MAX_AGE_MS").unwrap_or(defaults.max_age_ms),
            stale: env::var("CSRK_STALE")
                .ok()
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(defaults.stale),
            keylength: parse_env("CSRK_KEYLENGTH").unwrap_or(defaults.keylength),
        }
    }

    /// Parses settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn lru_options<V>(&self) -> LruOptions<V> {
        let max_age = (self.max_age_ms > 0).then(|| Duration::from_millis(self.max_age_ms));
        LruOptions::new()
            .with_max(self.max_entries)
            .with_max_age(max_age)
            .with_stale(self.stale)
    }

    /// Converts into a facade configuration using the OS random source.
    pub fn into_config<V>(self) -> CsrKeyCacheConfig<V> {
        CsrKeyCacheConfig::new()
            .with_cache_options(self.lru_options())
            .with_keylength(self.keylength)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age_ms: DEFAULT_MAX_AGE.as_millis() as u64,
            stale: false,
            keylength: DEFAULT_KEY_LENGTH,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
