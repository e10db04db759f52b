//! Engine interfaces implemented by cryptographic services.
//!
//! A service's factory produces one of the boxed trait objects below, e.g.
//! `Box<dyn MessageDigestSpi>` for a `MessageDigest` service. Request it with
//! [`Capability::of`](crate::Capability::of) or use the typed helpers in
//! [`crate::crypto`].
//!
//! # Implementing a Custom Engine
//!
//! ```
//! use provsel::crypto::MessageDigestSpi;
//! use provsel::{Implementation, Service};
//!
//! #[derive(Debug, Default)]
//! struct Xor(u8);
//!
//! impl MessageDigestSpi for Xor {
//!     fn algorithm(&self) -> &str {
//!         "XOR8"
//!     }
//!     fn digest_len(&self) -> usize {
//!         1
//!     }
//!     fn update(&mut self, data: &[u8]) {
//!         self.0 = data.iter().fold(self.0, |a, b| a ^ b);
//!     }
//!     fn snapshot(&self) -> Vec<u8> {
//!         vec![self.0]
//!     }
//!     fn finish(&mut self) -> Vec<u8> {
//!         vec![std::mem::take(&mut self.0)]
//!     }
//!     fn reset(&mut self) {
//!         self.0 = 0;
//!     }
//! }
//!
//! let service = Service::new("MessageDigest", "XOR8", "example.Xor", |_| {
//!     Ok(Box::new(Box::new(Xor::default()) as Box<dyn MessageDigestSpi>) as Implementation)
//! });
//! ```

use std::fmt::Debug;

use crate::ProviderError;

// ============================================================================
// Marker Trait
// ============================================================================

/// Bounds shared by all engine trait objects.
///
/// Implemented for every type that is [`Send`] + [`Sync`] + [`Debug`].
pub trait CryptoSafe: Send + Sync + Debug {}

impl<T: Send + Sync + Debug> CryptoSafe for T {}

// ============================================================================
// Engine Traits
// ============================================================================

/// Incremental message digest.
pub trait MessageDigestSpi: CryptoSafe {
    /// Standard algorithm name.
    fn algorithm(&self) -> &str;

    /// Output length in bytes.
    fn digest_len(&self) -> usize;

    fn update(&mut self, data: &[u8]);

    /// Digest of the data so far. The context keeps accepting updates.
    fn snapshot(&self) -> Vec<u8>;

    /// Complete the digest and reset the context.
    fn finish(&mut self) -> Vec<u8>;

    fn reset(&mut self);
}

/// Keyed message authentication code.
pub trait MacSpi: CryptoSafe {
    fn algorithm(&self) -> &str;

    fn mac_len(&self) -> usize;

    /// Set the key. Must be called before [`MacSpi::update`].
    fn init(&mut self, key: &[u8]) -> Result<(), ProviderError>;

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError>;

    /// Complete the MAC and reset to the freshly keyed state.
    fn finish(&mut self) -> Result<Vec<u8>, ProviderError>;
}

/// Authenticated encryption with associated data.
pub trait CipherSpi: CryptoSafe {
    fn algorithm(&self) -> &str;

    /// Set the key. Supported lengths depend on the algorithm.
    fn init(&mut self, key: &[u8]) -> Result<(), ProviderError>;

    /// Encrypt in place, appending the authentication tag.
    fn encrypt(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        data: &mut Vec<u8>,
    ) -> Result<(), ProviderError>;

    /// Decrypt in place, verifying and removing the authentication tag.
    fn decrypt(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        data: &mut Vec<u8>,
    ) -> Result<(), ProviderError>;
}

/// Digital signature creation and verification.
pub trait SignatureSpi: CryptoSafe {
    fn algorithm(&self) -> &str;

    /// Prepare for signing with a PKCS#8 DER private key.
    fn init_sign(&mut self, private_key_der: &[u8]) -> Result<(), ProviderError>;

    /// Prepare for verification with a SubjectPublicKeyInfo DER public key.
    fn init_verify(&mut self, public_key_der: &[u8]) -> Result<(), ProviderError>;

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError>;

    /// DER encoded signature over the data passed to `update`.
    fn sign(&mut self) -> Result<Vec<u8>, ProviderError>;

    /// Check a DER encoded signature. A well-formed but wrong signature is
    /// `Ok(false)`.
    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError>;
}

/// Random byte generator.
pub trait SecureRandomSpi: CryptoSafe {
    fn algorithm(&self) -> &str;

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ProviderError>;

    /// Whether the output is reproducible from a seed.
    fn is_deterministic(&self) -> bool {
        false
    }
}

/// Construction parameter for seedable `SecureRandom` services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedParameter(pub u64);
