//! Preferred provider directives.
//!
//! A directive such as `MessageDigest.SHA-256:B` asks lookups of that
//! service to consult provider `B` before the registry's natural order.
//! Group directives (`Group.SHA2:B`) cover a whole family of algorithms.

use std::fmt;

use crate::parse;
use crate::resolver::ServiceId;
use crate::Config;

/// Algorithm families usable with `Group.<name>` directives.
const GROUPS: &[(&str, &[&str])] = &[
    (
        "SHA2",
        &[
            "SHA-224",
            "SHA-256",
            "SHA-384",
            "SHA-512",
            "SHA-512/224",
            "SHA-512/256",
        ],
    ),
    (
        "HmacSHA2",
        &["HmacSHA224", "HmacSHA256", "HmacSHA384", "HmacSHA512"],
    ),
    (
        "SHA2RSA",
        &[
            "SHA224withRSA",
            "SHA256withRSA",
            "SHA384withRSA",
            "SHA512withRSA",
        ],
    ),
    (
        "SHA2DSA",
        &[
            "SHA224withDSA",
            "SHA256withDSA",
            "SHA384withDSA",
            "SHA512withDSA",
        ],
    ),
    (
        "SHA2ECDSA",
        &[
            "SHA224withECDSA",
            "SHA256withECDSA",
            "SHA384withECDSA",
            "SHA512withECDSA",
        ],
    ),
    ("SHA3", &["SHA3-224", "SHA3-256", "SHA3-384", "SHA3-512"]),
    (
        "HmacSHA3",
        &["HmacSHA3-224", "HmacSHA3-256", "HmacSHA3-384", "HmacSHA3-512"],
    ),
];

/// Legacy spellings that match each other.
const LEGACY_ALIASES: &[(&str, &str)] = &[("SHA1", "SHA-1"), ("SHA-1", "SHA1")];

/// One parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceEntry {
    service_type: Option<String>,
    algorithm: String,
    provider: String,
    group: bool,
    aliases: Vec<String>,
}

impl PreferenceEntry {
    /// Build an entry from a directive key (`[Type.]Algorithm` or
    /// `Group.Name`) and a provider name.
    ///
    /// Returns `None` for an unknown group.
    pub fn new(key: &str, provider: impl Into<String>) -> Option<Self> {
        let (service_type, algorithm) = parse::split_key(key);

        if let Some(t) = service_type.filter(|t| t.eq_ignore_ascii_case("Group")) {
            let (_, members) = GROUPS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(algorithm))?;
            return Some(PreferenceEntry {
                service_type: Some(t.to_string()),
                algorithm: algorithm.to_string(),
                provider: provider.into(),
                group: true,
                aliases: members.iter().map(|m| m.to_string()).collect(),
            });
        }

        let aliases = LEGACY_ALIASES
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(algorithm))
            .map(|(_, alt)| alt.to_string())
            .collect();

        Some(PreferenceEntry {
            service_type: service_type.map(str::to_string),
            algorithm: algorithm.to_string(),
            provider: provider.into(),
            group: false,
            aliases,
        })
    }

    /// `None` matches any service type.
    pub fn service_type(&self) -> Option<&str> {
        self.service_type.as_deref()
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn is_group(&self) -> bool {
        self.group
    }

    /// Group members, or legacy spellings of the algorithm.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether this entry applies to a query. All comparisons ignore case.
    pub fn matches(&self, service_type: &str, algorithm: &str) -> bool {
        if self.group {
            return self
                .aliases
                .iter()
                .any(|m| m.eq_ignore_ascii_case(algorithm));
        }

        if let Some(t) = &self.service_type {
            if !t.eq_ignore_ascii_case(service_type) {
                return false;
            }
        }

        self.algorithm.eq_ignore_ascii_case(algorithm)
            || self
                .aliases
                .iter()
                .any(|a| a.eq_ignore_ascii_case(algorithm))
    }
}

impl fmt::Display for PreferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service_type {
            Some(t) => write!(f, "{}.{}:{}", t, self.algorithm, self.provider),
            None => write!(f, "{}:{}", self.algorithm, self.provider),
        }
    }
}

/// Ordered, immutable set of preference directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceTable {
    entries: Vec<PreferenceEntry>,
}

impl PreferenceTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a comma separated directive list, e.g.
    /// `"MessageDigest.SHA-256:B, Group.HmacSHA2:C"`.
    pub fn parse(list: &str) -> Self {
        Self::from_directives(list.split(','))
    }

    /// Parse individual directives. Malformed ones are skipped with a warning.
    pub fn from_directives<I, S>(directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for directive in directives {
            let directive = directive.as_ref();
            if directive.trim().is_empty() {
                continue;
            }
            let Some((key, provider)) = parse::directive(directive) else {
                warn!("Skipping malformed preferred provider entry: {}", directive);
                continue;
            };
            match PreferenceEntry::new(key, provider) {
                Some(entry) => {
                    debug!("Preferred provider entry: {}", entry);
                    entries.push(entry);
                }
                None => warn!("Skipping unknown algorithm group: {}", directive),
            }
        }
        PreferenceTable { entries }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::from_directives(config.preferred())
    }

    pub fn entries(&self) -> &[PreferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry matching the query, in table order.
    pub fn match_all(&self, service_type: &str, algorithm: &str) -> Vec<&PreferenceEntry> {
        self.entries
            .iter()
            .filter(|e| e.matches(service_type, algorithm))
            .collect()
    }

    /// Matches for a batch query, collected id by id.
    ///
    /// Each entry is paired with the id it matched. An entry matching several
    /// ids appears once per id.
    pub fn match_any<'a>(
        &'a self,
        ids: &'a [ServiceId],
    ) -> Vec<(&'a PreferenceEntry, &'a ServiceId)> {
        ids.iter()
            .flat_map(|id| {
                self.match_all(id.service_type(), id.algorithm())
                    .into_iter()
                    .map(move |e| (e, id))
            })
            .collect()
    }
}
