//! Materializing providers by name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Provider, ProviderError};

/// Produces a live provider from its configured name.
///
/// `Ok(None)` means the name is unknown to this loader. Ordinary errors make
/// the requesting slot give up on the provider; [`ProviderError::Fatal`]
/// is propagated to whoever triggered the load.
pub trait ProviderLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<Arc<dyn Provider>>, ProviderError>;
}

impl<F> ProviderLoader for F
where
    F: Fn(&str) -> Result<Option<Arc<dyn Provider>>, ProviderError> + Send + Sync,
{
    fn load(&self, name: &str) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
        self(name)
    }
}

type Constructor = Arc<dyn Fn() -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// Registration table mapping provider names to constructors.
///
/// Legacy names (for instance an old implementation path) can be registered
/// as aliases of a current name.
#[derive(Clone, Default)]
pub struct RegistrationLoader {
    constructors: HashMap<String, Constructor>,
    aliases: HashMap<String, String>,
}

impl RegistrationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with the bundled providers registered.
    pub fn with_builtins() -> Self {
        Self::new()
            .register(crate::crypto::rust_crypto::NAME, || {
                Ok(Arc::new(crate::crypto::rust_crypto::default_provider()) as Arc<dyn Provider>)
            })
            .alias(
                crate::crypto::rust_crypto::LEGACY_NAME,
                crate::crypto::rust_crypto::NAME,
            )
    }

    pub fn register<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    pub fn alias(mut self, legacy: impl Into<String>, name: impl Into<String>) -> Self {
        self.aliases.insert(legacy.into(), name.into());
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl ProviderLoader for RegistrationLoader {
    fn load(&self, name: &str) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
        let resolved = self.aliases.get(name).map(|n| n.as_str()).unwrap_or(name);
        match self.constructors.get(resolved) {
            Some(constructor) => constructor().map(Some),
            None => {
                trace!("No provider registered as {}", name);
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for RegistrationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationLoader")
            .field("names", &self.names())
            .field("aliases", &self.aliases)
            .finish()
    }
}
