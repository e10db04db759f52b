//! Lazy materialization, bounded retries and fatal provider errors.

use std::sync::Arc;

use provsel::{Config, Error, ProviderRegistry};

use crate::common::*;

const TEN: [&str; 10] = ["P0", "P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P9"];

fn ten_providers() -> CountingLoader {
    TEN.iter().fold(CountingLoader::new(), |loader, name| {
        loader.provider(digest_provider(name, &["SHA-256"]))
    })
}

#[test]
fn first_match_loads_only_first_slot() {
    let _ = env_logger::try_init();

    let loader = Arc::new(ten_providers());
    let r = resolver(&config(&TEN), loader.clone());

    let mut list = r.services("MessageDigest", "SHA-256");
    let first = list.first().unwrap().unwrap();
    assert_eq!(first.provider_name(), "P0");
    assert_eq!(loader.total_loads(), 1);

    assert!(!list.is_empty().unwrap());
    assert!(r.service("MessageDigest", "SHA-256").unwrap().is_some());
    assert_eq!(loader.total_loads(), 1);

    let loaded: Vec<_> = r.registry().slots().map(|s| s.is_loaded()).collect();
    assert_eq!(loaded.iter().filter(|l| **l).count(), 1);
}

#[test]
fn indexed_access_loads_prefix() {
    let _ = env_logger::try_init();

    let loader = Arc::new(ten_providers());
    let r = resolver(&config(&TEN), loader.clone());

    let mut list = r.services("MessageDigest", "SHA-256");
    assert_eq!(list.get(3).unwrap().unwrap().provider_name(), "P3");
    assert_eq!(loader.total_loads(), 4);

    assert_eq!(list.len().unwrap(), 10);
    assert_eq!(loader.total_loads(), 10);

    // Repeated iteration replays cached results.
    assert_eq!(list.to_vec().unwrap().len(), 10);
    assert_eq!(loader.total_loads(), 10);
}

#[test]
fn missing_provider_is_retried_up_to_limit() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .with("Flaky", Behavior::Missing)
            .provider(digest_provider("B", &["SHA-256"])),
    );
    let config = Config::builder()
        .provider("Flaky")
        .provider("B")
        .max_load_attempts(3)
        .build()
        .unwrap();
    let r = resolver(&config, loader.clone());

    for _ in 0..10 {
        let s = r.service("MessageDigest", "SHA-256").unwrap().unwrap();
        assert_eq!(s.provider_name(), "B");
    }
    assert_eq!(loader.loads("Flaky"), 3);
    assert!(r.registry().slots().next().unwrap().is_disabled());
}

#[test]
fn failing_provider_is_disabled_after_one_attempt() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .with("Broken", Behavior::Fail)
            .provider(digest_provider("B", &["SHA-256"])),
    );
    let r = resolver(&config(&["Broken", "B"]), loader.clone());

    for _ in 0..5 {
        assert_eq!(listing(&r, "MessageDigest", "SHA-256"), vec!["B:SHA-256"]);
    }
    assert_eq!(loader.loads("Broken"), 1);
}

#[test]
fn default_limit_is_thirty() {
    let _ = env_logger::try_init();

    let loader = Arc::new(CountingLoader::new().with("Gone", Behavior::Missing));
    let registry = ProviderRegistry::from_config(&config(&["Gone"]), loader.clone());

    for _ in 0..100 {
        assert!(registry.get(0).unwrap().is_none());
    }
    assert_eq!(loader.loads("Gone"), 30);
}

#[test]
fn fatal_error_propagates_instead_of_skipping() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-512"]))
            .with("B", Behavior::Fatal)
            .provider(digest_provider("C", &["SHA-256"])),
    );
    let r = resolver(&config(&["A", "B", "C"]), loader.clone());

    let err = r.service("MessageDigest", "SHA-256").unwrap_err();
    assert!(matches!(err, Error::FatalProvider { ref provider, .. } if provider == "B"));
    assert_eq!(loader.loads("C"), 0);

    let mut list = r.services("MessageDigest", "SHA-256");
    assert!(list.first().is_err());

    // Lookups answered before reaching B are unaffected.
    let s = r.service("MessageDigest", "SHA-512").unwrap().unwrap();
    assert_eq!(s.provider_name(), "A");
}

#[test]
fn gated_provider_is_never_loaded() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("Hw", &["SHA-256"]))
            .provider(digest_provider("Sw", &["SHA-256"])),
    );
    let config = Config::builder()
        .provider("Hw")
        .provider("Sw")
        .gate(|name, _arg| name == "Hw")
        .build()
        .unwrap();
    let r = resolver(&config, loader.clone());

    assert_eq!(listing(&r, "MessageDigest", "SHA-256"), vec!["Sw:SHA-256"]);
    assert_eq!(loader.loads("Hw"), 0);
}
