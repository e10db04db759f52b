//! Cryptographic engines and the bundled RustCrypto provider.
//!
//! The typed helpers resolve a service through an [`InstanceFactory`] and hand
//! back the engine as its trait object:
//!
//! ```
//! use std::sync::Arc;
//! use provsel::crypto::{self, rust_crypto};
//! use provsel::{Config, InstanceFactory, RegistrationLoader, ServiceResolver};
//!
//! let config = Config::builder().provider(rust_crypto::NAME).build().unwrap();
//! let loader = Arc::new(RegistrationLoader::with_builtins());
//! let factory = InstanceFactory::new(ServiceResolver::from_config(&config, loader));
//!
//! let mut digest = crypto::message_digest(&factory, "SHA-256").unwrap();
//! digest.update(b"abc");
//! assert_eq!(digest.finish().len(), 32);
//! assert_eq!(digest.provider().name(), rust_crypto::NAME);
//! ```

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::{Error, InstanceFactory, Provider};

pub mod rust_crypto;
mod spi;

pub use spi::{CipherSpi, CryptoSafe, MacSpi, MessageDigestSpi};
pub use spi::{SecureRandomSpi, SeedParameter, SignatureSpi};

/// An engine and the provider that created it.
pub struct Engine<S: ?Sized> {
    provider: Arc<dyn Provider>,
    spi: Box<S>,
}

impl<S: ?Sized> Engine<S> {
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn into_inner(self) -> Box<S> {
        self.spi
    }
}

impl<S: ?Sized> Deref for Engine<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.spi
    }
}

impl<S: ?Sized> DerefMut for Engine<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.spi
    }
}

impl<S: ?Sized + fmt::Debug> fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("provider", &self.provider.name())
            .field("spi", &&*self.spi)
            .finish()
    }
}

fn engine<S: ?Sized + 'static>(
    factory: &InstanceFactory,
    service_type: &str,
    algorithm: &str,
) -> Result<Engine<S>, Error>
where
    Box<S>: Any,
{
    let (provider, spi) = factory.create_as::<Box<S>>(service_type, algorithm)?;
    Ok(Engine {
        provider,
        spi: *spi,
    })
}

pub fn message_digest(
    factory: &InstanceFactory,
    algorithm: &str,
) -> Result<Engine<dyn MessageDigestSpi>, Error> {
    engine(factory, "MessageDigest", algorithm)
}

pub fn mac(factory: &InstanceFactory, algorithm: &str) -> Result<Engine<dyn MacSpi>, Error> {
    engine(factory, "Mac", algorithm)
}

pub fn cipher(factory: &InstanceFactory, algorithm: &str) -> Result<Engine<dyn CipherSpi>, Error> {
    engine(factory, "Cipher", algorithm)
}

pub fn signature(
    factory: &InstanceFactory,
    algorithm: &str,
) -> Result<Engine<dyn SignatureSpi>, Error> {
    engine(factory, "Signature", algorithm)
}

pub fn secure_random(
    factory: &InstanceFactory,
    algorithm: &str,
) -> Result<Engine<dyn SecureRandomSpi>, Error> {
    engine(factory, "SecureRandom", algorithm)
}

/// A `SecureRandom` created with a seed, from the first provider that accepts one.
pub fn seeded_random(
    factory: &InstanceFactory,
    algorithm: &str,
    seed: SeedParameter,
) -> Result<Engine<dyn SecureRandomSpi>, Error> {
    let expected = crate::Capability::of::<Box<dyn SecureRandomSpi>>();
    let instance = factory.create_with_param("SecureRandom", Some(expected), algorithm, &seed)?;
    match instance.downcast::<Box<dyn SecureRandomSpi>>() {
        Ok((provider, spi)) => Ok(Engine {
            provider,
            spi: *spi,
        }),
        Err(instance) => Err(instance.type_mismatch("SecureRandom", expected)),
    }
}
