//! Secure random byte sources.
//!
//! Key generation is only as strong as the source behind it. The default
//! [`OsCsrng`] draws from the operating system generator; tests and
//! embedders can inject any closure of the form
//! `FnMut(usize) -> Result<Vec<u8>>`.

use rand_core::{OsRng, RngCore};

use crate::error::Result;

// == Random Source ==
/// Produces cryptographically secure random bytes on demand.
pub trait Csrng {
    /// Returns exactly `length` random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Entropy`](crate::CacheError::Entropy) if the
    /// underlying source cannot provide randomness.
    fn random_bytes(&mut self, length: usize) -> Result<Vec<u8>>;
}

impl<F> Csrng for F
where
    F: FnMut(usize) -> Result<Vec<u8>>,
{
    fn random_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        self(length)
    }
}

// == OS Random Source ==
/// Operating system CSPRNG, via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsCsrng;

impl Csrng for OsCsrng {
    fn random_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(bytes)
    }
}
