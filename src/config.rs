use std::fmt;
use std::sync::Arc;

use crate::parse;
use crate::slot::DEFAULT_MAX_LOAD_ATTEMPTS;
use crate::Error;

/// Property key prefix of numbered provider entries.
pub const PROVIDER_PROPERTY_PREFIX: &str = "security.provider.";

/// Property key of the preferred provider directive list.
pub const PREFERRED_PROPERTY: &str = "jdk.security.provider.preferred";

/// Predicate deciding whether a configured provider is skipped without
/// ever being loaded. Receives name and argument.
pub type SlotGate = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// A configured provider: name and optional argument (empty for none).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderEntry {
    name: String,
    argument: String,
}

impl ProviderEntry {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        ProviderEntry {
            name: name.into().trim().to_string(),
            argument: argument.into().trim().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }
}

/// Provider configuration
#[derive(Clone)]
pub struct Config {
    providers: Vec<ProviderEntry>,
    preferred: Vec<String>,
    max_load_attempts: u32,
    gate: Option<SlotGate>,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            providers: Vec::new(),
            preferred: Vec::new(),
            max_load_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            gate: None,
        }
    }

    /// Read a properties document.
    ///
    /// See [`ConfigBuilder::properties`] for the recognized keys.
    pub fn from_properties(text: &str) -> Result<Config, Error> {
        Config::builder().properties(text).build()
    }

    /// Configured providers in precedence order, without duplicates.
    #[inline(always)]
    pub fn providers(&self) -> &[ProviderEntry] {
        &self.providers
    }

    /// Raw preferred provider directives, `"[Type.]Algorithm:Provider"`.
    #[inline(always)]
    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    /// Load attempts per provider before it is given up.
    #[inline(always)]
    pub fn max_load_attempts(&self) -> u32 {
        self.max_load_attempts
    }

    /// Whether the gate rejects this provider up front.
    pub fn is_gated(&self, name: &str, argument: &str) -> bool {
        self.gate.as_ref().is_some_and(|gate| gate(name, argument))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            providers: Vec::new(),
            preferred: Vec::new(),
            max_load_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            gate: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("providers", &self.providers)
            .field("preferred", &self.preferred)
            .field("max_load_attempts", &self.max_load_attempts)
            .field("gate", &self.gate.is_some())
            .finish()
    }
}

/// Builder for provider configuration.
pub struct ConfigBuilder {
    providers: Vec<ProviderEntry>,
    preferred: Vec<String>,
    max_load_attempts: u32,
    gate: Option<SlotGate>,
}

impl ConfigBuilder {
    /// Append a provider without argument.
    pub fn provider(self, name: impl Into<String>) -> Self {
        self.provider_with_argument(name, "")
    }

    /// Append a provider with a configuration argument.
    ///
    /// The argument is handed to the provider once it is loaded.
    pub fn provider_with_argument(
        mut self,
        name: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        self.providers.push(ProviderEntry::new(name, argument));
        self
    }

    /// Append a preferred provider directive.
    ///
    /// Either `"[Type.]Algorithm:Provider"` or `"Group.Name:Provider"`.
    /// Malformed directives are skipped when the table is built.
    pub fn preferred(mut self, directive: impl Into<String>) -> Self {
        self.preferred.push(directive.into());
        self
    }

    /// Set the number of load attempts per provider.
    ///
    /// Defaults to 30.
    pub fn max_load_attempts(mut self, attempts: u32) -> Self {
        self.max_load_attempts = attempts;
        self
    }

    /// Set a gate that disables matching providers before their first load.
    pub fn gate<F>(mut self, gate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.gate = Some(Arc::new(gate));
        self
    }

    /// Add entries from a properties document.
    ///
    /// - `security.provider.<n>=<name> [argument]` for `n = 1, 2, ...`,
    ///   reading stops at the first missing number or empty value.
    /// - `jdk.security.provider.preferred=<directive>, <directive>, ...`
    ///
    /// When a key repeats, the last value wins.
    pub fn properties(mut self, text: &str) -> Self {
        let props = parse::properties(text);
        let lookup = |key: &str| {
            props
                .iter()
                .rev()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
        };

        for n in 1.. {
            let key = format!("{}{}", PROVIDER_PROPERTY_PREFIX, n);
            let Some(value) = lookup(&key) else {
                break;
            };
            if value.is_empty() {
                warn!("Invalid empty entry for {}", key);
                break;
            }
            let (name, argument) = parse::provider_entry(value);
            self = self.provider_with_argument(name, argument);
        }

        if let Some(list) = lookup(PREFERRED_PROPERTY) {
            for directive in list.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                self = self.preferred(directive);
            }
        }
        self
    }

    /// Build the configuration.
    ///
    /// Duplicate `(name, argument)` entries keep their first position.
    /// Returns `Error::ConfigError` for an empty provider name or a zero
    /// attempt budget.
    pub fn build(self) -> Result<Config, Error> {
        if self.max_load_attempts == 0 {
            return Err(Error::ConfigError(
                "max_load_attempts must be at least 1".to_string(),
            ));
        }

        let mut providers: Vec<ProviderEntry> = Vec::with_capacity(self.providers.len());
        for entry in self.providers {
            if entry.name().is_empty() {
                return Err(Error::ConfigError("Empty provider name".to_string()));
            }
            if providers.contains(&entry) {
                debug!("Ignoring duplicate provider entry {:?}", entry);
                continue;
            }
            providers.push(entry);
        }

        Ok(Config {
            providers,
            preferred: self.preferred,
            max_load_attempts: self.max_load_attempts,
            gate: self.gate,
        })
    }
}
