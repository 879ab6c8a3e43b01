//! Error types for the secure key cache
//!
//! Provides unified error handling using thiserror.
//!
//! Lookups on absent or expired keys are not errors: they surface as `None`
//! or `false`. A value the backing cache refuses to hold is reported by
//! `CsrKeyCache::set` returning `Ok(None)`. The variants below cover the
//! remaining failures, which are propagated to the caller unchanged.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the secure key cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The random byte source could not produce the requested bytes
    #[error("Secure random source failed: {0}")]
    Entropy(String),

    /// Settings could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<rand_core::Error> for CacheError {
    fn from(err: rand_core::Error) -> Self {
        CacheError::Entropy(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::InvalidConfig(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the secure key cache.
pub type Result<T> = std::result::Result<T, CacheError>;
