//! Service resolution across a registry.
//!
//! Lookups consult the [`PreferenceTable`] first and then walk the
//! [`ProviderRegistry`] in slot order. Results are produced lazily: asking
//! for the first match never loads providers beyond the one that supplies it.

use std::fmt;
use std::sync::Arc;

use crate::{Config, Error, PreferenceTable, Provider, ProviderLoader, ProviderRegistry, Service};

/// A `(service type, algorithm)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId {
    service_type: String,
    algorithm: String,
}

impl ServiceId {
    pub fn new(service_type: impl Into<String>, algorithm: impl Into<String>) -> Self {
        ServiceId {
            service_type: service_type.into(),
            algorithm: algorithm.into(),
        }
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service_type, self.algorithm)
    }
}

/// A service together with the provider that published it.
#[derive(Clone)]
pub struct ResolvedService {
    provider: Arc<dyn Provider>,
    service: Arc<Service>,
}

impl ResolvedService {
    pub fn new(provider: Arc<dyn Provider>, service: Arc<Service>) -> Self {
        ResolvedService { provider, service }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn service_type(&self) -> &str {
        self.service.service_type()
    }

    pub fn algorithm(&self) -> &str {
        self.service.algorithm()
    }

    /// Whether both refer to the very same provider and service objects.
    pub fn same_as(&self, other: &ResolvedService) -> bool {
        Arc::ptr_eq(&self.service, &other.service)
            && std::ptr::addr_eq(Arc::as_ptr(&self.provider), Arc::as_ptr(&other.provider))
    }
}

impl fmt::Debug for ResolvedService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}.{} ({})",
            self.provider.name(),
            self.service.service_type(),
            self.service.algorithm(),
            self.service.class_name()
        )
    }
}

/// Resolves services against a registry and a preference table.
#[derive(Debug, Clone)]
pub struct ServiceResolver {
    registry: ProviderRegistry,
    preferences: Arc<PreferenceTable>,
}

impl ServiceResolver {
    pub fn new(registry: ProviderRegistry, preferences: Arc<PreferenceTable>) -> Self {
        ServiceResolver {
            registry,
            preferences,
        }
    }

    /// Registry and preferences as described by `config`.
    pub fn from_config(config: &Config, loader: Arc<dyn ProviderLoader>) -> Self {
        Self::new(
            ProviderRegistry::from_config(config, loader),
            Arc::new(PreferenceTable::from_config(config)),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn preferences(&self) -> &PreferenceTable {
        &self.preferences
    }

    /// The first matching service, if any.
    pub fn service(
        &self,
        service_type: &str,
        algorithm: &str,
    ) -> Result<Option<ResolvedService>, Error> {
        for entry in self.preferences.match_all(service_type, algorithm) {
            let Some(p) = self.registry.provider_by_name(entry.provider())? else {
                continue;
            };
            if let Some(s) = p.service(service_type, algorithm) {
                return Ok(Some(ResolvedService::new(p, s)));
            }
        }

        for index in 0..self.registry.len() {
            let Some(p) = self.registry.get(index)? else {
                continue;
            };
            if let Some(s) = p.service(service_type, algorithm) {
                return Ok(Some(ResolvedService::new(p, s)));
            }
        }

        Ok(None)
    }

    /// Lazy list of every matching service.
    pub fn services(&self, service_type: &str, algorithm: &str) -> ServiceList {
        ServiceList::new(
            self.registry.clone(),
            self.preferences.clone(),
            vec![ServiceId::new(service_type, algorithm)],
        )
    }

    /// Lazy list of services matching any of `ids`.
    ///
    /// Every id is checked against a provider before moving on to the next
    /// provider, so provider precedence wins over the order of `ids`.
    pub fn services_any(&self, ids: Vec<ServiceId>) -> ServiceList {
        ServiceList::new(self.registry.clone(), self.preferences.clone(), ids)
    }
}

/// Lazily populated, ordered list of resolved services.
///
/// Elements already found are cached and replayed by later reads. Use
/// [`ServiceList::is_empty`] for existence checks, [`ServiceList::len`]
/// loads every provider in the registry.
pub struct ServiceList {
    registry: ProviderRegistry,
    preferences: Arc<PreferenceTable>,
    ids: Vec<ServiceId>,
    /// Preferred provider names with the id each one was preferred for,
    /// computed on first use.
    preferred: Option<Vec<(String, ServiceId)>>,
    preferred_index: usize,
    provider_index: usize,
    found: Vec<ResolvedService>,
}

impl ServiceList {
    fn new(
        registry: ProviderRegistry,
        preferences: Arc<PreferenceTable>,
        ids: Vec<ServiceId>,
    ) -> Self {
        ServiceList {
            registry,
            preferences,
            ids,
            preferred: None,
            preferred_index: 0,
            provider_index: 0,
            found: Vec::new(),
        }
    }

    pub fn ids(&self) -> &[ServiceId] {
        &self.ids
    }

    /// The element at `index`, resolving only as far as needed.
    pub fn get(&mut self, index: usize) -> Result<Option<ResolvedService>, Error> {
        self.try_get(index)
    }

    pub fn first(&mut self) -> Result<Option<ResolvedService>, Error> {
        self.try_get(0)
    }

    pub fn is_empty(&mut self) -> Result<bool, Error> {
        Ok(self.try_get(0)?.is_none())
    }

    /// Number of matches. Resolves the whole list.
    pub fn len(&mut self) -> Result<usize, Error> {
        let mut n = self.found.len();
        while self.try_get(n)?.is_some() {
            n += 1;
        }
        Ok(n)
    }

    /// Matches found so far, without resolving more.
    pub fn resolved(&self) -> &[ResolvedService] {
        &self.found
    }

    pub fn iter(&mut self) -> Iter<'_> {
        Iter {
            list: self,
            index: 0,
            done: false,
        }
    }

    /// Resolve the whole list.
    pub fn to_vec(&mut self) -> Result<Vec<ResolvedService>, Error> {
        self.iter().collect()
    }

    fn try_get(&mut self, index: usize) -> Result<Option<ResolvedService>, Error> {
        if self.preferred.is_none() {
            let pairs = self
                .preferences
                .match_any(&self.ids)
                .into_iter()
                .map(|(e, id)| (e.provider().to_string(), id.clone()))
                .collect();
            self.preferred = Some(pairs);
        }

        loop {
            if let Some(s) = self.found.get(index) {
                return Ok(Some(s.clone()));
            }

            // A preference only applies to the id it matched.
            let preferred = self.preferred.as_deref().unwrap_or_default();
            if self.preferred_index < preferred.len() {
                let (name, id) = &preferred[self.preferred_index];
                let p = self.registry.provider_by_name(name)?;
                self.preferred_index += 1;
                match p {
                    Some(p) => {
                        if let Some(s) = p.service(id.service_type(), id.algorithm()) {
                            trace!("Found {} in preferred provider {}", id, name);
                            self.found.push(ResolvedService::new(p, s));
                        }
                    }
                    None => trace!("Preferred provider {} not available", name),
                }
                continue;
            }

            let provider = if self.provider_index < self.registry.len() {
                let p = self.registry.get(self.provider_index)?;
                self.provider_index += 1;
                match p {
                    Some(p) => p,
                    None => continue,
                }
            } else {
                return Ok(None);
            };

            for id in &self.ids {
                if let Some(s) = provider.service(id.service_type(), id.algorithm()) {
                    trace!("Found {} in provider {}", id, provider.name());
                    self.found.push(ResolvedService::new(provider.clone(), s));
                }
            }
        }
    }
}

impl fmt::Debug for ServiceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceList")
            .field("ids", &self.ids)
            .field("found", &self.found)
            .field("provider_index", &self.provider_index)
            .finish()
    }
}

/// Iterator over a [`ServiceList`], resolving on demand.
///
/// Stops after yielding an error.
pub struct Iter<'a> {
    list: &'a mut ServiceList,
    index: usize,
    done: bool,
}

impl Iterator for Iter<'_> {
    type Item = Result<ResolvedService, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.list.try_get(self.index) {
            Ok(Some(s)) => {
                self.index += 1;
                Some(Ok(s))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
