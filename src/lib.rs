//! CSRK Cache - A bounded in-memory cache keyed by secure random strings
//!
//! Every stored value gets a fresh key built from cryptographically secure
//! random bytes, so keys can be handed out as unguessable references such
//! as session IDs or one-time handles.

pub mod cache;
pub mod config;
pub mod csrng;
pub mod error;
pub mod keycache;

pub use cache::{Cache, CacheStats, LruCache, LruOptions};
pub use config::{BackingCache, CacheSettings, CsrKeyCacheConfig};
pub use csrng::{Csrng, OsCsrng};
pub use error::{CacheError, Result};
pub use keycache::{csr_key_cache, CsrKeyCache};
