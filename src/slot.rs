//! A configured, possibly not yet loaded, provider.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;

use crate::{Error, Provider, ProviderLoader};

/// Default number of load attempts before a slot gives up for good.
pub const DEFAULT_MAX_LOAD_ATTEMPTS: u32 = 30;

/// One entry of a [`ProviderRegistry`](crate::ProviderRegistry).
///
/// The slot loads its provider on first use. Loading happens at most once
/// concurrently: other threads wait for the loading thread and observe its
/// result. A successful load is permanent. Every attempt counts against
/// `max_attempts`, once exhausted the slot reports "no provider" forever.
///
/// Slots are equal when name and argument are equal.
pub struct ProviderSlot {
    name: String,
    argument: String,
    max_attempts: u32,
    loader: Option<Arc<dyn ProviderLoader>>,
    provider: OnceCell<Arc<dyn Provider>>,
    state: Mutex<LoadState>,
    load_finished: Condvar,
}

#[derive(Debug, Default)]
struct LoadState {
    attempts: u32,
    /// Thread currently running the loader for this slot.
    loading: Option<ThreadId>,
}

impl ProviderSlot {
    /// Create a slot that loads `name` through `loader`.
    ///
    /// An empty `argument` means the provider is used unconfigured.
    pub fn new(
        name: impl Into<String>,
        argument: impl Into<String>,
        loader: Arc<dyn ProviderLoader>,
        max_attempts: u32,
    ) -> Self {
        ProviderSlot {
            name: name.into(),
            argument: argument.into().trim().to_string(),
            max_attempts,
            loader: Some(loader),
            provider: OnceCell::new(),
            state: Mutex::new(LoadState::default()),
            load_finished: Condvar::new(),
        }
    }

    /// Wrap an already live provider. The slot never loads anything.
    pub fn from_provider(provider: Arc<dyn Provider>) -> Self {
        ProviderSlot {
            name: provider.name().to_string(),
            argument: String::new(),
            max_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            loader: None,
            provider: OnceCell::with_value(provider),
            state: Mutex::new(LoadState::default()),
            load_finished: Condvar::new(),
        }
    }

    /// Configured name. May differ from the loaded provider's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Number of load attempts so far.
    pub fn attempts(&self) -> u32 {
        self.lock_state().attempts
    }

    /// Whether the provider is materialized. Never triggers a load.
    pub fn is_loaded(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Whether the slot has given up loading.
    pub fn is_disabled(&self) -> bool {
        !self.is_loaded() && self.lock_state().attempts >= self.max_attempts
    }

    /// Permanently stop loading attempts.
    pub(crate) fn disable_load(&self) {
        self.lock_state().attempts = self.max_attempts;
    }

    /// Get the provider, loading it if necessary.
    ///
    /// Returns `Ok(None)` when the provider is unavailable, when the slot is
    /// disabled, or when called recursively from within this slot's own load.
    /// A fatal provider error is returned as [`Error::FatalProvider`].
    pub fn provider(&self) -> Result<Option<Arc<dyn Provider>>, Error> {
        if let Some(p) = self.provider.get() {
            return Ok(Some(p.clone()));
        }

        let me = thread::current().id();
        let mut state = self.lock_state();

        loop {
            if let Some(p) = self.provider.get() {
                return Ok(Some(p.clone()));
            }
            if state.attempts >= self.max_attempts {
                return Ok(None);
            }
            match state.loading {
                None => break,
                Some(owner) if owner == me => {
                    debug!("Recursion loading provider: {}", self);
                    return Ok(None);
                }
                Some(_) => {
                    state = self
                        .load_finished
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }

        state.attempts += 1;
        state.loading = Some(me);
        let attempt = state.attempts;
        drop(state);

        let _loading = LoadingGuard(self);
        debug!("Loading provider {} (attempt {})", self, attempt);

        match self.do_load() {
            Ok(Some(provider)) => {
                let provider = self.provider.get_or_init(|| provider).clone();
                debug!("Loaded provider {} as {}", self, provider.name());
                Ok(Some(provider))
            }
            Ok(None) => {
                debug!("Provider {} not found", self);
                Ok(None)
            }
            Err(e) if e.is_fatal() => {
                warn!("Fatal error loading provider {}: {}", self, e);
                Err(Error::FatalProvider {
                    provider: self.name.clone(),
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                warn!("Error loading provider {}, disabling: {}", self, e);
                self.disable_load();
                Ok(None)
            }
        }
    }

    fn do_load(&self) -> Result<Option<Arc<dyn Provider>>, crate::ProviderError> {
        let Some(loader) = &self.loader else {
            return Ok(None);
        };
        let Some(provider) = loader.load(&self.name)? else {
            return Ok(None);
        };
        if self.argument.is_empty() {
            return Ok(Some(provider));
        }
        provider.configure(&self.argument).map(Some)
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the loading marker and wakes waiters, also when the loader panics.
struct LoadingGuard<'a>(&'a ProviderSlot);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock_state().loading = None;
        self.0.load_finished.notify_all();
    }
}

impl PartialEq for ProviderSlot {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.argument == other.argument
    }
}

impl Eq for ProviderSlot {}

impl Hash for ProviderSlot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.argument.hash(state);
    }
}

impl fmt::Display for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.argument.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}('{}')", self.name, self.argument)
        }
    }
}

impl fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSlot")
            .field("name", &self.name)
            .field("argument", &self.argument)
            .field("loaded", &self.is_loaded())
            .field("state", &*self.lock_state())
            .finish()
    }
}
