//! Shared helpers for registry integration tests.

#![allow(unused)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use provsel::{Config, Implementation, Provider, ProviderError, ProviderLoader};
use provsel::{PreferenceTable, ProviderRegistry, Service, ServiceResolver, StandardProvider};

/// What the stub loader does for a given name.
#[derive(Clone)]
pub enum Behavior {
    Provide(Arc<dyn Provider>),
    /// `Ok(None)`, counts as one failed attempt.
    Missing,
    /// Ordinary error, disables the slot.
    Fail,
    /// Fatal error, propagates to the caller.
    Fatal,
}

/// Provider loader that counts every load call per name.
#[derive(Default)]
pub struct CountingLoader {
    behaviors: HashMap<String, Behavior>,
    loads: Mutex<HashMap<String, usize>>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(name.to_string(), behavior);
        self
    }

    /// Serve `provider` under its own name.
    pub fn provider(self, provider: Arc<dyn Provider>) -> Self {
        let name = provider.name().to_string();
        self.with(&name, Behavior::Provide(provider))
    }

    pub fn loads(&self, name: &str) -> usize {
        self.loads.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn total_loads(&self) -> usize {
        self.loads.lock().unwrap().values().sum()
    }
}

impl ProviderLoader for CountingLoader {
    fn load(&self, name: &str) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
        *self.loads.lock().unwrap().entry(name.to_string()).or_default() += 1;
        match self.behaviors.get(name) {
            Some(Behavior::Provide(p)) => Ok(Some(p.clone())),
            Some(Behavior::Missing) | None => Ok(None),
            Some(Behavior::Fail) => Err(ProviderError::Unavailable(format!("{name} is broken"))),
            Some(Behavior::Fatal) => Err(ProviderError::Fatal(format!("{name} aborted"))),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Digest {
    pub provider: String,
    pub algorithm: String,
}

/// Provider with a working `MessageDigest` service per algorithm.
pub fn digest_provider(name: &str, algorithms: &[&str]) -> Arc<dyn Provider> {
    let mut p = StandardProvider::new(name, "1.0", format!("{name} test provider"));
    for alg in algorithms {
        let provider = name.to_string();
        let algorithm = alg.to_string();
        p = p.with_service(Service::new(
            "MessageDigest",
            *alg,
            format!("{name}.Digest"),
            move |_| {
                Ok(Box::new(Digest {
                    provider: provider.clone(),
                    algorithm: algorithm.clone(),
                }) as Implementation)
            },
        ));
    }
    Arc::new(p)
}

/// Provider whose `MessageDigest` services fail to instantiate. Counts attempts.
pub fn broken_provider(name: &str, algorithm: &str, calls: Arc<AtomicUsize>) -> Arc<dyn Provider> {
    let msg = format!("{name} cannot create {algorithm}");
    Arc::new(StandardProvider::new(name, "1.0", "").with_service(Service::new(
        "MessageDigest",
        algorithm,
        format!("{name}.Broken"),
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::NoSuchAlgorithm(msg.clone()))
        },
    )))
}

pub fn config(names: &[&str]) -> Config {
    names
        .iter()
        .fold(Config::builder(), |b, n| b.provider(*n))
        .build()
        .unwrap()
}

pub fn resolver(config: &Config, loader: Arc<CountingLoader>) -> ServiceResolver {
    ServiceResolver::from_config(config, loader)
}

/// `"provider:algorithm"` for each resolved service.
pub fn listing(resolver: &ServiceResolver, service_type: &str, algorithm: &str) -> Vec<String> {
    resolver
        .services(service_type, algorithm)
        .to_vec()
        .unwrap()
        .iter()
        .map(|s| format!("{}:{}", s.provider_name(), s.algorithm()))
        .collect()
}
