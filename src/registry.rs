//! Ordered, immutable provider registry.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{Config, EmptyProvider, Error, Provider, ProviderLoader, ProviderSlot};

/// Ordered list of provider slots. Index 0 has the highest precedence.
///
/// A registry never changes after construction. Edits such as
/// [`ProviderRegistry::add`] return a new registry that shares the untouched
/// slots with this one. Cloning is cheap and yields the same registry, see
/// [`ProviderRegistry::ptr_eq`].
#[derive(Clone)]
pub struct ProviderRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    slots: Vec<Arc<ProviderSlot>>,
    /// Set once every slot has loaded successfully.
    all_loaded: AtomicBool,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::from_slots(Vec::new())
    }

    fn from_slots(slots: Vec<Arc<ProviderSlot>>) -> Self {
        ProviderRegistry {
            inner: Arc::new(Inner {
                slots,
                all_loaded: AtomicBool::new(false),
            }),
        }
    }

    /// Build the registry described by `config`.
    ///
    /// Duplicate `(name, argument)` entries collapse into the first one.
    /// Entries rejected by the configured gate start out disabled.
    pub fn from_config(config: &Config, loader: Arc<dyn ProviderLoader>) -> Self {
        let mut slots: Vec<Arc<ProviderSlot>> = Vec::with_capacity(config.providers().len());
        for entry in config.providers() {
            let slot = ProviderSlot::new(
                entry.name(),
                entry.argument(),
                loader.clone(),
                config.max_load_attempts(),
            );
            if slots.iter().any(|s| **s == slot) {
                debug!("Ignoring duplicate provider entry {}", slot);
                continue;
            }
            if config.is_gated(slot.name(), slot.argument()) {
                debug!("Provider {} disabled by gate", slot);
                slot.disable_load();
            }
            slots.push(Arc::new(slot));
        }
        Self::from_slots(slots)
    }

    /// Registry of already live providers. Later duplicates by name are dropped.
    pub fn from_providers<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        let mut slots: Vec<Arc<ProviderSlot>> = Vec::new();
        for provider in providers {
            let slot = ProviderSlot::from_provider(provider);
            if !slots.iter().any(|s| **s == slot) {
                slots.push(Arc::new(slot));
            }
        }
        Self::from_slots(slots)
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &ProviderSlot> {
        self.inner.slots.iter().map(|s| &**s)
    }

    /// Whether both handles refer to the same registry.
    pub fn ptr_eq(a: &ProviderRegistry, b: &ProviderRegistry) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Provider at `index`, loading it if needed.
    ///
    /// `None` when out of range or the slot cannot be loaded.
    pub fn get(&self, index: usize) -> Result<Option<Arc<dyn Provider>>, Error> {
        match self.inner.slots.get(index) {
            Some(slot) => slot.provider(),
            None => Ok(None),
        }
    }

    /// Like [`ProviderRegistry::get`], but an unavailable provider is
    /// replaced by [`EmptyProvider`].
    pub fn provider(&self, index: usize) -> Result<Arc<dyn Provider>, Error> {
        Ok(self
            .get(index)?
            .unwrap_or_else(|| Arc::new(EmptyProvider) as Arc<dyn Provider>))
    }

    /// Index of the first slot whose loaded provider reports `name`.
    ///
    /// Loads slots in order until found.
    pub fn index_of(&self, name: &str) -> Result<Option<usize>, Error> {
        for (index, slot) in self.inner.slots.iter().enumerate() {
            if let Some(p) = slot.provider()? {
                if p.name() == name {
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }

    /// Provider reporting `name`. The configured slot name is not consulted.
    pub fn provider_by_name(&self, name: &str) -> Result<Option<Arc<dyn Provider>>, Error> {
        match self.index_of(name)? {
            Some(index) => self.get(index),
            None => Ok(None),
        }
    }

    /// Append `provider`. Returns this registry if the name is already present.
    pub fn add(&self, provider: Arc<dyn Provider>) -> Result<ProviderRegistry, Error> {
        self.insert_at(provider, self.len())
    }

    /// Insert `provider` at `position`, or append when out of range.
    ///
    /// Returns this registry if the name is already present.
    pub fn insert_at(
        &self,
        provider: Arc<dyn Provider>,
        position: usize,
    ) -> Result<ProviderRegistry, Error> {
        if self.index_of(provider.name())?.is_some() {
            return Ok(self.clone());
        }
        let mut slots = self.inner.slots.clone();
        let position = position.min(slots.len());
        slots.insert(position, Arc::new(ProviderSlot::from_provider(provider)));
        Ok(Self::from_slots(slots))
    }

    /// Registry without the provider reporting `name`.
    ///
    /// Returns this registry if no such provider exists. Slots after the
    /// first match are only loaded when their configured name is `name`,
    /// other unloaded slots are kept as they are.
    pub fn remove(&self, name: &str) -> Result<ProviderRegistry, Error> {
        let Some(found) = self.index_of(name)? else {
            return Ok(self.clone());
        };

        let mut slots = Vec::with_capacity(self.len() - 1);
        for (index, slot) in self.inner.slots.iter().enumerate() {
            let matches = match index.cmp(&found) {
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => true,
                std::cmp::Ordering::Greater => {
                    (slot.is_loaded() || slot.name() == name)
                        && slot.provider()?.is_some_and(|p| p.name() == name)
                }
            };
            if !matches {
                slots.push(slot.clone());
            }
        }
        Ok(Self::from_slots(slots))
    }

    /// Try to load every slot. Returns the number of loaded providers.
    pub fn load_all(&self) -> Result<usize, Error> {
        if self.inner.all_loaded.load(Ordering::Acquire) {
            return Ok(self.len());
        }
        let mut n = 0;
        for slot in &self.inner.slots {
            if slot.provider()?.is_some() {
                n += 1;
            }
        }
        if n == self.len() {
            self.inner.all_loaded.store(true, Ordering::Release);
        }
        Ok(n)
    }

    /// Registry of only the slots that load.
    ///
    /// Returns this registry if every slot loads.
    pub fn remove_invalid(&self) -> Result<ProviderRegistry, Error> {
        let n = self.load_all()?;
        if n == self.len() {
            return Ok(self.clone());
        }
        let slots = self
            .inner
            .slots
            .iter()
            .filter(|s| s.is_loaded())
            .cloned()
            .collect();
        Ok(Self::from_slots(slots))
    }

    /// Every loadable provider, in order.
    pub fn providers(&self) -> Result<Vec<Arc<dyn Provider>>, Error> {
        let mut out = Vec::with_capacity(self.len());
        for slot in &self.inner.slots {
            if let Some(p) = slot.provider()? {
                out.push(p);
            }
        }
        Ok(out)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.inner.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", slot)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("slots", &self.inner.slots)
            .field("all_loaded", &self.inner.all_loaded.load(Ordering::Relaxed))
            .finish()
    }
}
