//! Pure Rust provider built on crates from the
//! [RustCrypto](https://github.com/RustCrypto) organization.
//!
//! # Usage
//!
//! Registered under [`NAME`] by
//! [`RegistrationLoader::with_builtins`](crate::RegistrationLoader::with_builtins),
//! or used directly:
//!
//! ```
//! use std::sync::Arc;
//! use provsel::crypto::rust_crypto;
//! use provsel::{Provider, ProviderRegistry};
//!
//! let provider: Arc<dyn Provider> = Arc::new(rust_crypto::default_provider());
//! let registry = ProviderRegistry::from_providers(vec![provider]);
//! let provider = registry.provider_by_name(rust_crypto::NAME).unwrap().unwrap();
//! assert!(provider.service("MessageDigest", "SHA256").is_some());
//! ```

mod cipher;
mod hash;
mod hmac;
mod random;
mod sign;

use crate::{Implementation, ProviderError, Service, StandardProvider};

/// Provider name.
pub const NAME: &str = "RustCrypto";

/// Name accepted by the built-in loader for compatibility with older
/// configurations.
pub const LEGACY_NAME: &str = "provsel.crypto.rust_crypto.Provider";

const INFO: &str = "RustCrypto provider (SHA-2 digests, HMAC, AES-GCM, ECDSA, SecureRandom)";

fn software(service: Service) -> Service {
    service.with_attribute("ImplementedIn", "Software")
}

/// Build the RustCrypto provider.
///
/// # Supported Services
///
/// - `MessageDigest`: SHA-224, SHA-256, SHA-384, SHA-512, SHA-512/224, SHA-512/256
/// - `Mac`: HmacSHA224, HmacSHA256, HmacSHA384, HmacSHA512
/// - `Cipher`: AES/GCM/NoPadding (128 and 256 bit keys)
/// - `Signature`: SHA256withECDSA (P-256), SHA384withECDSA (P-384)
/// - `SecureRandom`: NativePRNG (operating system), DRBG (seedable with
///   [`SeedParameter`](crate::crypto::SeedParameter))
///
/// Algorithms are also reachable by their object identifiers.
pub fn default_provider() -> StandardProvider {
    let mut provider = StandardProvider::new(NAME, env!("CARGO_PKG_VERSION"), INFO);

    for &(algorithm, aliases) in hash::ALGORITHMS {
        let mut service = Service::new(
            "MessageDigest",
            algorithm,
            format!("{}::{}", module_path!(), hash::CLASS),
            move |_| hash::create(algorithm),
        );
        for alias in aliases {
            service = service.with_alias(*alias);
        }
        provider = provider.with_service(software(service));
    }

    for &(algorithm, oid) in hmac::ALGORITHMS {
        let service = Service::new(
            "Mac",
            algorithm,
            format!("{}::{}", module_path!(), hmac::CLASS),
            move |_| hmac::create(algorithm),
        )
        .with_alias(oid);
        provider = provider.with_service(software(service));
    }

    provider = provider.with_service(software(
        Service::new(
            "Cipher",
            cipher::ALGORITHM,
            format!("{}::{}", module_path!(), cipher::CLASS),
            |_| cipher::create(),
        )
        .with_attribute("SupportedKeyFormats", "RAW"),
    ));

    for &(algorithm, oid) in sign::ALGORITHMS {
        let service = Service::new(
            "Signature",
            algorithm,
            format!("{}::{}", module_path!(), sign::CLASS),
            move |_| sign::create(algorithm),
        )
        .with_alias(oid)
        .with_attribute("SupportedKeyClasses", "PKCS#8|X.509");
        provider = provider.with_service(software(service));
    }

    provider
        .with_service(software(
            Service::new(
                "SecureRandom",
                random::NATIVE,
                format!("{}::{}", module_path!(), random::NATIVE_CLASS),
                random::create_native,
            )
            .with_attribute("ThreadSafe", "true"),
        ))
        .with_service(software(
            Service::new(
                "SecureRandom",
                random::DRBG,
                format!("{}::{}", module_path!(), random::DRBG_CLASS),
                random::create_drbg,
            )
            .with_attribute("ThreadSafe", "true"),
        ))
}

/// Wrap an engine so that it can be requested as `Box<dyn Spi>`.
fn boxed<S: ?Sized + 'static>(spi: Box<S>) -> Result<Implementation, ProviderError>
where
    Box<S>: Send,
{
    Ok(Box::new(spi) as Implementation)
}
