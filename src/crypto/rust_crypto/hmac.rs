//! HMAC over SHA-2 using RustCrypto.

use hmac::{Hmac, Mac};
use sha2::{Sha224, Sha256, Sha384, Sha512};

use super::boxed;
use crate::crypto::MacSpi;
use crate::{Implementation, ProviderError};

pub(super) const CLASS: &str = "HmacSha2";

/// Standard names with their OIDs.
pub(super) const ALGORITHMS: &[(&str, &str)] = &[
    ("HmacSHA224", "1.2.840.113549.2.8"),
    ("HmacSHA256", "1.2.840.113549.2.9"),
    ("HmacSHA384", "1.2.840.113549.2.10"),
    ("HmacSHA512", "1.2.840.113549.2.11"),
];

enum HmacState {
    Sha224(Hmac<Sha224>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

fn invalid_key(_: hmac::digest::InvalidLength) -> ProviderError {
    ProviderError::InvalidKey("Invalid HMAC key".to_string())
}

impl HmacState {
    fn new(algorithm: &str, key: &[u8]) -> Result<Self, ProviderError> {
        Ok(match algorithm {
            "HmacSHA224" => HmacState::Sha224(Hmac::new_from_slice(key).map_err(invalid_key)?),
            "HmacSHA256" => HmacState::Sha256(Hmac::new_from_slice(key).map_err(invalid_key)?),
            "HmacSHA384" => HmacState::Sha384(Hmac::new_from_slice(key).map_err(invalid_key)?),
            "HmacSHA512" => HmacState::Sha512(Hmac::new_from_slice(key).map_err(invalid_key)?),
            _ => return Err(ProviderError::NoSuchAlgorithm(algorithm.to_string())),
        })
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            HmacState::Sha224(mac) => mac.update(data),
            HmacState::Sha256(mac) => mac.update(data),
            HmacState::Sha384(mac) => mac.update(data),
            HmacState::Sha512(mac) => mac.update(data),
        }
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        match self {
            HmacState::Sha224(mac) => mac.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha256(mac) => mac.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha384(mac) => mac.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha512(mac) => mac.finalize_reset().into_bytes().to_vec(),
        }
    }
}

/// HMAC engine. Holds no state until a key is set.
struct HmacSha2 {
    algorithm: &'static str,
    mac_len: usize,
    state: Option<HmacState>,
}

impl std::fmt::Debug for HmacSha2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSha2")
            .field("algorithm", &self.algorithm)
            .field("initialized", &self.state.is_some())
            .finish()
    }
}

impl HmacSha2 {
    fn new(algorithm: &'static str) -> Result<Self, ProviderError> {
        let mac_len = match algorithm {
            "HmacSHA224" => 28,
            "HmacSHA256" => 32,
            "HmacSHA384" => 48,
            "HmacSHA512" => 64,
            _ => return Err(ProviderError::NoSuchAlgorithm(algorithm.to_string())),
        };
        Ok(HmacSha2 {
            algorithm,
            mac_len,
            state: None,
        })
    }

    fn state(&mut self) -> Result<&mut HmacState, ProviderError> {
        self.state
            .as_mut()
            .ok_or_else(|| ProviderError::InvalidKey(format!("{} not initialized", self.algorithm)))
    }
}

impl MacSpi for HmacSha2 {
    fn algorithm(&self) -> &str {
        self.algorithm
    }

    fn mac_len(&self) -> usize {
        self.mac_len
    }

    fn init(&mut self, key: &[u8]) -> Result<(), ProviderError> {
        self.state = Some(HmacState::new(self.algorithm, key)?);
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        self.state()?.update(data);
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, ProviderError> {
        Ok(self.state()?.finalize_reset())
    }
}

pub(super) fn create(algorithm: &'static str) -> Result<Implementation, ProviderError> {
    boxed::<dyn MacSpi>(Box::new(HmacSha2::new(algorithm)?))
}
