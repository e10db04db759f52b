//! Providers and the services they publish.
//!
//! A [`Provider`] is a named bundle of [`Service`] descriptors. Each service is
//! identified by a `(service type, algorithm)` pair such as
//! `("MessageDigest", "SHA-256")` and carries a factory that produces the
//! implementation object on demand.
//!
//! # Overview
//!
//! The provider system is inspired by the JCA design and is component based:
//!
//! - **Provider** ([`Provider`]): a named source of services, possibly loaded
//!   lazily through a [`ProviderLoader`](crate::ProviderLoader).
//! - **Service** ([`Service`]): metadata plus a factory for one algorithm.
//! - **Standard provider** ([`StandardProvider`]): table-backed provider with
//!   case-insensitive lookup by algorithm name or alias.
//!
//! # Implementing a Custom Provider
//!
//! ```
//! use std::sync::Arc;
//! use provsel::{Implementation, Provider, Service, StandardProvider};
//!
//! #[derive(Debug)]
//! struct Noop;
//!
//! let provider = StandardProvider::new("Example", "1.0", "Example provider").with_service(
//!     Service::new("MessageDigest", "NOOP", "example.Noop", |_param| {
//!         Ok(Box::new(Noop) as Implementation)
//!     })
//!     .with_alias("NULL"),
//! );
//!
//! assert!(provider.service("MessageDigest", "null").is_some());
//! ```
//!
//! # Thread Safety
//!
//! Providers are shared between registries and threads, so the trait requires
//! `Send + Sync`. Service factories must be `Send + Sync` for the same reason.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::ProviderError;

/// The object produced by a service factory.
pub type Implementation = Box<dyn Any + Send>;

/// Factory producing an implementation from an optional construction parameter.
pub type ServiceFactory =
    Arc<dyn Fn(Option<&dyn Any>) -> Result<Implementation, ProviderError> + Send + Sync>;

/// Turns a configuration argument into an argument-bound provider.
pub type Configurator =
    Arc<dyn Fn(&str) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

// ============================================================================
// Provider
// ============================================================================

/// A named source of cryptographic services.
pub trait Provider: Send + Sync + Debug {
    /// Self-reported name. Registry lookups by name match against this value.
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        ""
    }

    fn info(&self) -> &str {
        ""
    }

    /// Look up the service for `(service_type, algorithm)`.
    ///
    /// Implementations must return the same `Arc` for repeated lookups of the
    /// same service, failover relies on pointer identity.
    fn service(&self, service_type: &str, algorithm: &str) -> Option<Arc<Service>>;

    /// All services this provider publishes.
    fn services(&self) -> Vec<Arc<Service>>;

    /// Bind a configuration argument, returning a possibly different provider.
    fn configure(&self, argument: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "{} does not accept a configuration argument: {}",
            self.name(),
            argument
        )))
    }
}

/// Sentinel provider standing in for a slot that could not be loaded.
///
/// Has no services, every lookup reports "not found".
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyProvider;

impl EmptyProvider {
    pub const NAME: &'static str = "##Empty##";
}

impl Provider for EmptyProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn service(&self, _service_type: &str, _algorithm: &str) -> Option<Arc<Service>> {
        None
    }

    fn services(&self) -> Vec<Arc<Service>> {
        Vec::new()
    }
}

// ============================================================================
// Service
// ============================================================================

/// Engine types with a known construction parameter policy.
///
/// `true` means the engine accepts a construction parameter.
const KNOWN_ENGINES: &[(&str, bool)] = &[
    ("AlgorithmParameterGenerator", false),
    ("AlgorithmParameters", false),
    ("CertificateFactory", false),
    ("CertPathBuilder", false),
    ("CertPathValidator", false),
    ("CertStore", true),
    ("Cipher", false),
    ("KeyAgreement", false),
    ("KeyFactory", false),
    ("KeyGenerator", false),
    ("KeyPairGenerator", false),
    ("KeyStore", false),
    ("Mac", false),
    ("MessageDigest", false),
    ("SecretKeyFactory", false),
    ("SecureRandom", true),
    ("Signature", false),
];

fn accepts_parameter(service_type: &str) -> bool {
    KNOWN_ENGINES
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(service_type))
        .map(|(_, accepts)| *accepts)
        .unwrap_or(true)
}

/// Description of one algorithm implementation published by a provider.
#[derive(Clone)]
pub struct Service {
    service_type: String,
    algorithm: String,
    class_name: String,
    aliases: Vec<String>,
    attributes: Vec<(String, String)>,
    factory: ServiceFactory,
}

impl Service {
    pub fn new<F>(
        service_type: impl Into<String>,
        algorithm: impl Into<String>,
        class_name: impl Into<String>,
        factory: F,
    ) -> Self
    where
        F: Fn(Option<&dyn Any>) -> Result<Implementation, ProviderError> + Send + Sync + 'static,
    {
        Service {
            service_type: service_type.into(),
            algorithm: algorithm.into(),
            class_name: class_name.into(),
            aliases: Vec::new(),
            attributes: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    /// Add an alternative algorithm name, e.g. `"SHA256"` for `"SHA-256"`.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set an attribute. Keys are case-insensitive, a later value replaces an earlier one.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.attributes.push((key, value.into()));
        self
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Name of the implementation, used in diagnostics.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive match on type and on algorithm or any alias.
    pub fn matches(&self, service_type: &str, algorithm: &str) -> bool {
        self.service_type.eq_ignore_ascii_case(service_type)
            && (self.algorithm.eq_ignore_ascii_case(algorithm)
                || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(algorithm)))
    }

    /// Produce a new implementation object.
    ///
    /// Engines that take no construction parameter reject one with
    /// [`ProviderError::InvalidParameter`].
    pub fn new_instance(&self, param: Option<&dyn Any>) -> Result<Implementation, ProviderError> {
        if param.is_some() && !accepts_parameter(&self.service_type) {
            return Err(ProviderError::InvalidParameter(format!(
                "constructor parameter not used with {} engines",
                self.service_type
            )));
        }
        (self.factory)(param)
    }
}

impl Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("service_type", &self.service_type)
            .field("algorithm", &self.algorithm)
            .field("class_name", &self.class_name)
            .field("aliases", &self.aliases)
            .field("attributes", &self.attributes)
            .finish()
    }
}

// ============================================================================
// Standard provider
// ============================================================================

/// Provider backed by a service table.
///
/// Lookup is case-insensitive on both type and algorithm and resolves aliases.
/// Adding a service with an already present `(type, algorithm)` replaces it.
#[derive(Clone)]
pub struct StandardProvider {
    name: String,
    version: String,
    info: String,
    services: Vec<Arc<Service>>,
    index: HashMap<(String, String), usize>,
    configurator: Option<Configurator>,
}

fn key(service_type: &str, algorithm: &str) -> (String, String) {
    (
        service_type.to_ascii_uppercase(),
        algorithm.to_ascii_uppercase(),
    )
}

impl StandardProvider {
    pub fn new(name: impl Into<String>, version: impl Into<String>, info: impl Into<String>) -> Self {
        StandardProvider {
            name: name.into(),
            version: version.into(),
            info: info.into(),
            services: Vec::new(),
            index: HashMap::new(),
            configurator: None,
        }
    }

    pub fn with_service(mut self, service: Service) -> Self {
        let primary = key(service.service_type(), service.algorithm());
        let position = match self.index.get(&primary) {
            Some(&i) => {
                // Drop alias entries of the replaced service.
                let old = self.services[i].clone();
                for alias in old.aliases() {
                    self.index.remove(&key(old.service_type(), alias));
                }
                self.services[i] = Arc::new(service);
                i
            }
            None => {
                self.services.push(Arc::new(service));
                self.services.len() - 1
            }
        };

        let service = self.services[position].clone();
        self.index.insert(primary, position);
        for alias in service.aliases() {
            self.index
                .insert(key(service.service_type(), alias), position);
        }
        self
    }

    /// Accept configuration arguments through `configurator`.
    pub fn with_configurator<F>(mut self, configurator: F) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync + 'static,
    {
        self.configurator = Some(Arc::new(configurator));
        self
    }
}

impl Provider for StandardProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn info(&self) -> &str {
        &self.info
    }

    fn service(&self, service_type: &str, algorithm: &str) -> Option<Arc<Service>> {
        self.index
            .get(&key(service_type, algorithm))
            .map(|&i| self.services[i].clone())
    }

    fn services(&self) -> Vec<Arc<Service>> {
        self.services.clone()
    }

    fn configure(&self, argument: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        match &self.configurator {
            Some(configurator) => configurator(argument),
            None => Err(ProviderError::Unsupported(format!(
                "{} does not accept a configuration argument: {}",
                self.name, argument
            ))),
        }
    }
}

impl Debug for StandardProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardProvider")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("services", &self.services.len())
            .field("configurable", &self.configurator.is_some())
            .finish()
    }
}
