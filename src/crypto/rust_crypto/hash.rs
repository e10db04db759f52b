//! SHA-2 message digests.

use sha2::digest::DynDigest;
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

use super::boxed;
use crate::crypto::MessageDigestSpi;
use crate::{Implementation, ProviderError};

pub(super) const CLASS: &str = "Sha2Digest";

/// Standard names with their aliases (legacy spelling and OID).
pub(super) const ALGORITHMS: &[(&str, &[&str])] = &[
    ("SHA-224", &["SHA224", "2.16.840.1.101.3.4.2.4"]),
    ("SHA-256", &["SHA256", "2.16.840.1.101.3.4.2.1"]),
    ("SHA-384", &["SHA384", "2.16.840.1.101.3.4.2.2"]),
    ("SHA-512", &["SHA512", "2.16.840.1.101.3.4.2.3"]),
    ("SHA-512/224", &["SHA512/224", "2.16.840.1.101.3.4.2.5"]),
    ("SHA-512/256", &["SHA512/256", "2.16.840.1.101.3.4.2.6"]),
];

/// Digest context over any SHA-2 variant.
struct Sha2Digest {
    algorithm: &'static str,
    ctx: Box<dyn DynDigest + Send + Sync>,
}

impl std::fmt::Debug for Sha2Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sha2Digest").field(&self.algorithm).finish()
    }
}

impl Sha2Digest {
    fn new(algorithm: &'static str) -> Option<Self> {
        let ctx: Box<dyn DynDigest + Send + Sync> = match algorithm {
            "SHA-224" => Box::<Sha224>::default(),
            "SHA-256" => Box::<Sha256>::default(),
            "SHA-384" => Box::<Sha384>::default(),
            "SHA-512" => Box::<Sha512>::default(),
            "SHA-512/224" => Box::<Sha512_224>::default(),
            "SHA-512/256" => Box::<Sha512_256>::default(),
            _ => return None,
        };
        Some(Sha2Digest { algorithm, ctx })
    }
}

impl MessageDigestSpi for Sha2Digest {
    fn algorithm(&self) -> &str {
        self.algorithm
    }

    fn digest_len(&self) -> usize {
        self.ctx.output_size()
    }

    fn update(&mut self, data: &[u8]) {
        self.ctx.update(data);
    }

    fn snapshot(&self) -> Vec<u8> {
        self.ctx.box_clone().finalize().into_vec()
    }

    fn finish(&mut self) -> Vec<u8> {
        self.ctx.finalize_reset().into_vec()
    }

    fn reset(&mut self) {
        self.ctx.reset();
    }
}

pub(super) fn create(algorithm: &'static str) -> Result<Implementation, ProviderError> {
    let digest = Sha2Digest::new(algorithm)
        .ok_or_else(|| ProviderError::NoSuchAlgorithm(algorithm.to_string()))?;
    boxed::<dyn MessageDigestSpi>(Box::new(digest))
}
