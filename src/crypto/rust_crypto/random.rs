//! Secure random number generation.
//!
//! `NativePRNG` reads from the operating system. `DRBG` is a seedable
//! generator: created with a [`SeedParameter`] it produces the same bytes for
//! the same seed, which is useful for testing and debugging.

use std::any::Any;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

use super::boxed;
use crate::crypto::{SecureRandomSpi, SeedParameter};
use crate::{Implementation, ProviderError};

pub(super) const NATIVE: &str = "NativePRNG";
pub(super) const NATIVE_CLASS: &str = "NativePrng";
pub(super) const DRBG: &str = "DRBG";
pub(super) const DRBG_CLASS: &str = "Drbg";

#[derive(Debug)]
struct NativePrng;

impl SecureRandomSpi for NativePrng {
    fn algorithm(&self) -> &str {
        NATIVE
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ProviderError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| ProviderError::Crypto(format!("OS random source failed: {}", e)))
    }
}

struct Drbg {
    inner: StdRng,
    seeded: bool,
}

impl Drbg {
    /// Seeded from the given value, or from the operating system.
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Drbg {
                inner: StdRng::seed_from_u64(seed),
                seeded: true,
            },
            None => Drbg {
                inner: StdRng::from_entropy(),
                seeded: false,
            },
        }
    }
}

impl std::fmt::Debug for Drbg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drbg").field("seeded", &self.seeded).finish()
    }
}

impl SecureRandomSpi for Drbg {
    fn algorithm(&self) -> &str {
        DRBG
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ProviderError> {
        self.inner.fill_bytes(buf);
        Ok(())
    }

    fn is_deterministic(&self) -> bool {
        self.seeded
    }
}

pub(super) fn create_native(param: Option<&dyn Any>) -> Result<Implementation, ProviderError> {
    if param.is_some() {
        return Err(ProviderError::InvalidParameter(format!(
            "{} does not take a construction parameter",
            NATIVE
        )));
    }
    boxed::<dyn SecureRandomSpi>(Box::new(NativePrng))
}

pub(super) fn create_drbg(param: Option<&dyn Any>) -> Result<Implementation, ProviderError> {
    let seed = match param {
        None => None,
        Some(p) => match p.downcast_ref::<SeedParameter>() {
            Some(SeedParameter(seed)) => Some(*seed),
            None => {
                return Err(ProviderError::InvalidParameter(
                    "DRBG expects a SeedParameter".to_string(),
                ))
            }
        },
    };
    boxed::<dyn SecureRandomSpi>(Box::new(Drbg::new(seed)))
}
