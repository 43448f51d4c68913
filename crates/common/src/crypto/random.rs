//! Injectable source of cryptographically secure random bytes.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CommonError, CommonResult};

/// Supplies random bytes to PKCE and other secret generators.
///
/// Production code uses [`OsRandom`]; tests can substitute a fixed sequence
/// to make generated values reproducible.
pub trait RandomBytesSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    /// Returns `CommonError::Crypto` when the underlying source is unavailable.
    fn fill_bytes(&self, dest: &mut [u8]) -> CommonResult<()>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomBytesSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> CommonResult<()> {
        let mut rng = OsRng;
        rng.try_fill_bytes(dest)
            .map_err(|e| CommonError::crypto(format!("OS random source unavailable: {e}")))
    }
}
