//! provsel
//!
//! Lazy, ordered resolution of cryptographic services across a list of
//! providers.
//!
//! A [`ProviderRegistry`] holds configured provider slots in precedence order.
//! Slots are loaded on first use through a [`ProviderLoader`], failed loads are
//! retried a bounded number of times and a provider that aborts on purpose
//! propagates its [`Error::FatalProvider`] to the caller.
//!
//! A [`ServiceResolver`] answers `(service type, algorithm)` queries, first
//! from providers named in the [`PreferenceTable`] and then in registry order.
//! The [`InstanceFactory`] turns the resolved services into implementation
//! objects, falling over to the next candidate when one fails.
//!
//! ```
//! use std::sync::Arc;
//! use provsel::crypto::{self, rust_crypto};
//! use provsel::{Config, InstanceFactory, RegistrationLoader, ServiceResolver};
//!
//! let config = Config::from_properties(
//!     "security.provider.1=RustCrypto\n\
//!      jdk.security.provider.preferred=Group.SHA2:RustCrypto",
//! )
//! .unwrap();
//! let loader = Arc::new(RegistrationLoader::with_builtins());
//! let resolver = ServiceResolver::from_config(&config, loader);
//!
//! let service = resolver.service("MessageDigest", "SHA-384").unwrap().unwrap();
//! assert_eq!(service.provider_name(), rust_crypto::NAME);
//!
//! let factory = InstanceFactory::new(resolver);
//! let mut mac = crypto::mac(&factory, "HmacSHA256").unwrap();
//! mac.init(b"key").unwrap();
//! mac.update(b"data").unwrap();
//! assert_eq!(mac.finish().unwrap().len(), 32);
//! ```
#![forbid(unsafe_code)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod config;
pub use config::{Config, ConfigBuilder, ProviderEntry, SlotGate};
pub use config::{PREFERRED_PROPERTY, PROVIDER_PROPERTY_PREFIX};

pub mod crypto;

mod error;
pub use error::{Error, ProviderError};

mod instance;
pub use instance::{Capability, Instance, InstanceFactory};

mod loader;
pub use loader::{ProviderLoader, RegistrationLoader};

mod parse;

mod preferred;
pub use preferred::{PreferenceEntry, PreferenceTable};

mod provider;
pub use provider::{Configurator, EmptyProvider, Implementation, Provider};
pub use provider::{Service, ServiceFactory, StandardProvider};

mod registry;
pub use registry::ProviderRegistry;

mod resolver;
pub use resolver::{Iter, ResolvedService, ServiceId, ServiceList, ServiceResolver};

mod slot;
pub use slot::{ProviderSlot, DEFAULT_MAX_LOAD_ATTEMPTS};
