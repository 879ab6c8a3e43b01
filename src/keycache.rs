//! Secure Key Cache
//!
//! Stores values under freshly generated random keys and hands the keys
//! back to the caller as unguessable references.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::config::CsrKeyCacheConfig;
use crate::csrng::Csrng;
use crate::error::Result;

// == Factory ==
/// Builds a [`CsrKeyCache`] from optional configuration.
///
/// Without configuration the cache holds up to 1024 entries for at most 15
/// minutes each, under keys made from 32 bytes of OS randomness.
pub fn csr_key_cache<V: Clone + 'static>(config: Option<CsrKeyCacheConfig<V>>) -> CsrKeyCache<V> {
    CsrKeyCache::from_config(config.unwrap_or_default())
}

// == CSRK Cache ==
/// Cache facade that keys every value with a cryptographically secure
/// random string.
pub struct CsrKeyCache<V> {
    cache: Box<dyn Cache<V>>,
    keylength: usize,
    csrng: Box<dyn Csrng>,
}

impl<V> CsrKeyCache<V> {
    /// Creates a cache from explicit parts.
    pub fn new(cache: Box<dyn Cache<V>>, keylength: usize, csrng: Box<dyn Csrng>) -> Self {
        Self {
            cache,
            keylength,
            csrng,
        }
    }

    pub fn from_config(config: CsrKeyCacheConfig<V>) -> Self
    where
        V: Clone + 'static,
    {
        let (cache, keylength, csrng) = config.resolve();
        Self::new(cache.into_cache(), keylength, csrng)
    }

    // == Set ==
    /// Stores `value` under a new random key and returns the key.
    ///
    /// `expire` is handed to the backing cache unchanged. Returns
    /// `Ok(None)` when the backing cache did not keep the value, for example
    /// because it exceeds the cache's capacity on its own.
    ///
    /// # Errors
    ///
    /// Propagates failures of the random source.
    pub fn set(&mut self, value: V, expire: Option<Duration>) -> Result<Option<String>> {
        let key = self.new_key()?;
        self.cache.set(key.clone(), value, expire);

        if self.cache.has(&key) {
            Ok(Some(key))
        } else {
            warn!("backing cache did not retain the stored value");
            Ok(None)
        }
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        self.cache.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.cache.has(key)
    }

    pub fn del(&mut self, key: &str) {
        self.cache.del(key)
    }

    /// Number of random bytes behind each key.
    pub fn keylength(&self) -> usize {
        self.keylength
    }

    // == New Key ==
    /// Draws random keys until one is not already in use.
    fn new_key(&mut self) -> Result<String> {
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            let bytes = self.csrng.random_bytes(self.keylength)?;
            let key = BASE64_STANDARD.encode(bytes);
            if !self.cache.has(&key) {
                return Ok(key);
            }
            debug!(attempts, "generated key already in use, drawing another");
        }
    }
}

impl<V: Clone + 'static> Default for CsrKeyCache<V> {
    fn default() -> Self {
        Self::from_config(CsrKeyCacheConfig::default())
    }
}

impl<V> fmt::Debug for CsrKeyCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrKeyCache")
            .field("keylength", &self.keylength)
            .finish_non_exhaustive()
    }
}
