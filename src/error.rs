use thiserror::Error;

/// Errors surfaced to callers of the registry, resolver and factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A provider aborted its own initialization on purpose.
    #[error("Fatal error loading provider {provider}: {reason}")]
    FatalProvider { provider: String, reason: String },

    #[error("{algorithm} {service_type} not available")]
    NoMatchingService {
        service_type: String,
        algorithm: String,
    },

    #[error("Class configured for {service_type}: {class} (provider {provider}) is not a {expected}")]
    ImplementationTypeMismatch {
        service_type: String,
        provider: String,
        class: String,
        expected: &'static str,
    },

    #[error("Missing provider")]
    MissingProviderArgument,

    #[error("No such provider: {0}")]
    UnknownNamedProvider(String),

    /// The last instantiation failure after every candidate was tried.
    #[error("Error constructing {algorithm} from provider {provider}: {source}")]
    Instantiation {
        provider: String,
        algorithm: String,
        #[source]
        source: ProviderError,
    },

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Errors reported by provider implementations and loaders.
///
/// Only [`ProviderError::Fatal`] escapes a provider slot. Everything else is
/// treated as "this provider is unavailable" during loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Provider not found: {0}")]
    NotFound(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Fatal(String),

    #[error("No such algorithm: {0}")]
    NoSuchAlgorithm(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Crypto failure: {0}")]
    Crypto(String),
}

impl ProviderError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Fatal(_))
    }
}
