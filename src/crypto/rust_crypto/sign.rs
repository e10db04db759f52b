//! ECDSA signatures over P-256 and P-384 using RustCrypto.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};

use super::boxed;
use crate::crypto::SignatureSpi;
use crate::{Implementation, ProviderError};

pub(super) const CLASS: &str = "EcdsaSignature";

/// Standard names with their OIDs. The digest determines the curve.
pub(super) const ALGORITHMS: &[(&str, &str)] = &[
    ("SHA256withECDSA", "1.2.840.10045.4.3.2"),
    ("SHA384withECDSA", "1.2.840.10045.4.3.3"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Curve {
    P256,
    P384,
}

enum EcdsaKey {
    SignP256(p256::ecdsa::SigningKey),
    SignP384(p384::ecdsa::SigningKey),
    VerifyP256(p256::ecdsa::VerifyingKey),
    VerifyP384(p384::ecdsa::VerifyingKey),
}

/// ECDSA engine. Buffers the message until `sign` or `verify`.
struct EcdsaSignature {
    algorithm: &'static str,
    curve: Curve,
    key: Option<EcdsaKey>,
    data: Vec<u8>,
}

impl std::fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.key {
            Some(EcdsaKey::SignP256(_)) | Some(EcdsaKey::SignP384(_)) => "sign",
            Some(EcdsaKey::VerifyP256(_)) | Some(EcdsaKey::VerifyP384(_)) => "verify",
            None => "uninitialized",
        };
        f.debug_struct("EcdsaSignature")
            .field("algorithm", &self.algorithm)
            .field("curve", &self.curve)
            .field("mode", &mode)
            .finish()
    }
}

fn invalid_key<E>(what: &'static str) -> impl Fn(E) -> ProviderError {
    move |_| ProviderError::InvalidKey(format!("Invalid {} key", what))
}

impl EcdsaSignature {
    fn new(algorithm: &'static str) -> Result<Self, ProviderError> {
        let curve = match algorithm {
            "SHA256withECDSA" => Curve::P256,
            "SHA384withECDSA" => Curve::P384,
            _ => return Err(ProviderError::NoSuchAlgorithm(algorithm.to_string())),
        };
        Ok(EcdsaSignature {
            algorithm,
            curve,
            key: None,
            data: Vec::new(),
        })
    }

    fn not_initialized(&self, mode: &str) -> ProviderError {
        ProviderError::InvalidKey(format!("{} not initialized for {}", self.algorithm, mode))
    }
}

impl SignatureSpi for EcdsaSignature {
    fn algorithm(&self) -> &str {
        self.algorithm
    }

    fn init_sign(&mut self, private_key_der: &[u8]) -> Result<(), ProviderError> {
        let key = match self.curve {
            Curve::P256 => EcdsaKey::SignP256(
                p256::ecdsa::SigningKey::from_pkcs8_der(private_key_der)
                    .map_err(invalid_key("P-256 private"))?,
            ),
            Curve::P384 => EcdsaKey::SignP384(
                p384::ecdsa::SigningKey::from_pkcs8_der(private_key_der)
                    .map_err(invalid_key("P-384 private"))?,
            ),
        };
        self.key = Some(key);
        self.data.clear();
        Ok(())
    }

    fn init_verify(&mut self, public_key_der: &[u8]) -> Result<(), ProviderError> {
        let key = match self.curve {
            Curve::P256 => EcdsaKey::VerifyP256(
                p256::ecdsa::VerifyingKey::from_public_key_der(public_key_der)
                    .map_err(invalid_key("P-256 public"))?,
            ),
            Curve::P384 => EcdsaKey::VerifyP384(
                p384::ecdsa::VerifyingKey::from_public_key_der(public_key_der)
                    .map_err(invalid_key("P-384 public"))?,
            ),
        };
        self.key = Some(key);
        self.data.clear();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        if self.key.is_none() {
            return Err(self.not_initialized("update"));
        }
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn sign(&mut self) -> Result<Vec<u8>, ProviderError> {
        let data = std::mem::take(&mut self.data);
        let failed = |_| ProviderError::Crypto("Signing failed".to_string());
        match &self.key {
            Some(EcdsaKey::SignP256(key)) => {
                let signature: p256::ecdsa::Signature = key.try_sign(&data).map_err(failed)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            Some(EcdsaKey::SignP384(key)) => {
                let signature: p384::ecdsa::Signature = key.try_sign(&data).map_err(failed)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            _ => Err(self.not_initialized("signing")),
        }
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError> {
        let data = std::mem::take(&mut self.data);
        let malformed = |_| ProviderError::Crypto("Malformed ECDSA signature".to_string());
        match &self.key {
            Some(EcdsaKey::VerifyP256(key)) => {
                let signature = p256::ecdsa::Signature::from_der(signature).map_err(malformed)?;
                Ok(key.verify(&data, &signature).is_ok())
            }
            Some(EcdsaKey::VerifyP384(key)) => {
                let signature = p384::ecdsa::Signature::from_der(signature).map_err(malformed)?;
                Ok(key.verify(&data, &signature).is_ok())
            }
            _ => Err(self.not_initialized("verification")),
        }
    }
}

pub(super) fn create(algorithm: &'static str) -> Result<Implementation, ProviderError> {
    boxed::<dyn SignatureSpi>(Box::new(EcdsaSignature::new(algorithm)?))
}
