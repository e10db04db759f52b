//! AES-GCM using RustCrypto.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{AeadInPlace, Aes128Gcm, Aes256Gcm, KeyInit};

use super::boxed;
use crate::crypto::CipherSpi;
use crate::{Implementation, ProviderError};

pub(super) const ALGORITHM: &str = "AES/GCM/NoPadding";
pub(super) const CLASS: &str = "AesGcm";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

enum AesGcmKey {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// AES-GCM cipher. Key length selects AES-128 or AES-256.
struct AesGcm {
    key: Option<AesGcmKey>,
}

impl std::fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(AesGcmKey::Aes128(_)) => f.debug_tuple("AesGcm::Aes128").finish(),
            Some(AesGcmKey::Aes256(_)) => f.debug_tuple("AesGcm::Aes256").finish(),
            None => f.debug_tuple("AesGcm").finish(),
        }
    }
}

fn crypto_error(what: &str) -> impl Fn(aes_gcm::Error) -> ProviderError + '_ {
    move |_| ProviderError::Crypto(format!("AES-GCM {} failed", what))
}

impl AesGcm {
    fn key(&self, nonce: &[u8]) -> Result<&AesGcmKey, ProviderError> {
        if nonce.len() != NONCE_LEN {
            return Err(ProviderError::InvalidParameter(format!(
                "Invalid nonce length: expected {}, got {}",
                NONCE_LEN,
                nonce.len()
            )));
        }
        self.key
            .as_ref()
            .ok_or_else(|| ProviderError::InvalidKey("AES-GCM not initialized".to_string()))
    }
}

impl CipherSpi for AesGcm {
    fn algorithm(&self) -> &str {
        ALGORITHM
    }

    fn init(&mut self, key: &[u8]) -> Result<(), ProviderError> {
        let invalid =
            || ProviderError::InvalidKey(format!("Invalid key size for AES-GCM: {}", key.len()));
        self.key = Some(match key.len() {
            16 => AesGcmKey::Aes128(Box::new(
                Aes128Gcm::new_from_slice(key).map_err(|_| invalid())?,
            )),
            32 => AesGcmKey::Aes256(Box::new(
                Aes256Gcm::new_from_slice(key).map_err(|_| invalid())?,
            )),
            _ => return Err(invalid()),
        });
        Ok(())
    }

    fn encrypt(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        data: &mut Vec<u8>,
    ) -> Result<(), ProviderError> {
        let key = self.key(nonce)?;
        let nonce_array = GenericArray::from_slice(nonce);
        let result = match key {
            AesGcmKey::Aes128(cipher) => cipher.encrypt_in_place(nonce_array, aad, data),
            AesGcmKey::Aes256(cipher) => cipher.encrypt_in_place(nonce_array, aad, data),
        };
        result.map_err(crypto_error("encryption"))
    }

    fn decrypt(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        data: &mut Vec<u8>,
    ) -> Result<(), ProviderError> {
        let key = self.key(nonce)?;
        if data.len() < TAG_LEN {
            return Err(ProviderError::Crypto(format!(
                "Ciphertext too short: {}",
                data.len()
            )));
        }
        let nonce_array = GenericArray::from_slice(nonce);
        let result = match key {
            AesGcmKey::Aes128(cipher) => cipher.decrypt_in_place(nonce_array, aad, data),
            AesGcmKey::Aes256(cipher) => cipher.decrypt_in_place(nonce_array, aad, data),
        };
        result.map_err(crypto_error("decryption"))
    }
}

pub(super) fn create() -> Result<Implementation, ProviderError> {
    boxed::<dyn CipherSpi>(Box::new(AesGcm { key: None }))
}
