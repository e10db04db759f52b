#![no_main]

//! Fuzz target for configuration parsing.
//!
//! Feeds arbitrary text to the properties reader and the preferred provider
//! directive parser, then resolves against the resulting registry to make
//! sure odd names and directives never panic.
//!
//! The first byte selects where the input goes:
//! - even: whole input is a properties document
//! - odd: remaining input is a comma separated directive list

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use provsel::{Config, PreferenceTable, RegistrationLoader, ServiceResolver};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };

    if selector % 2 == 0 {
        let Ok(config) = Config::from_properties(text) else {
            return;
        };
        let loader = Arc::new(RegistrationLoader::with_builtins());
        let resolver = ServiceResolver::from_config(&config, loader);
        let _ = resolver.service("MessageDigest", "SHA-256");
        let _ = resolver.registry().to_string();
    } else {
        let table = PreferenceTable::parse(text);
        for entry in table.entries() {
            let _ = table.match_all("MessageDigest", entry.algorithm());
            let _ = entry.to_string();
        }
    }
});
