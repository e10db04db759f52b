//! Instance creation across several candidate providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use provsel::{Capability, Config, Error, InstanceFactory};

use crate::common::*;

#[test]
fn failed_first_instantiation_falls_over() {
    let _ = env_logger::try_init();

    let calls = Arc::new(AtomicUsize::new(0));
    let loader = Arc::new(
        CountingLoader::new()
            .provider(broken_provider("A", "SHA-256", calls.clone()))
            .provider(digest_provider("B", &["SHA-256"])),
    );
    let factory = InstanceFactory::new(resolver(&config(&["A", "B"]), loader));

    let (provider, digest) = factory.create_as::<Digest>("MessageDigest", "SHA-256").unwrap();
    assert_eq!(provider.name(), "B");
    assert_eq!(digest.provider, "B");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn first_service_is_tried_once() {
    let _ = env_logger::try_init();

    let calls = Arc::new(AtomicUsize::new(0));
    let loader = Arc::new(
        CountingLoader::new()
            .provider(broken_provider("A", "SHA-256", calls.clone()))
            .provider(digest_provider("B", &["SHA-256"])),
    );
    let config = Config::builder()
        .provider("A")
        .provider("B")
        .preferred("SHA-256:A")
        .build()
        .unwrap();
    let factory = InstanceFactory::new(resolver(&config, loader));

    let instance = factory
        .create("MessageDigest", Some(Capability::of::<Digest>()), "SHA-256")
        .unwrap();
    assert_eq!(instance.provider().name(), "B");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn exhausted_candidates_report_last_failure() {
    let _ = env_logger::try_init();

    let calls = Arc::new(AtomicUsize::new(0));
    let loader = Arc::new(
        CountingLoader::new()
            .provider(broken_provider("A", "SHA-256", calls.clone()))
            .provider(broken_provider("B", "SHA-256", calls.clone())),
    );
    let factory = InstanceFactory::new(resolver(&config(&["A", "B"]), loader));

    let err = factory.create("MessageDigest", None, "SHA-256").unwrap_err();
    assert!(matches!(err, Error::Instantiation { ref provider, .. } if provider == "B"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let err = factory.create("MessageDigest", None, "SHA-3").unwrap_err();
    assert!(matches!(err, Error::NoMatchingService { .. }));
}

#[test]
fn fatal_load_during_failover_propagates() {
    let _ = env_logger::try_init();

    let calls = Arc::new(AtomicUsize::new(0));
    let loader = Arc::new(
        CountingLoader::new()
            .provider(broken_provider("A", "SHA-256", calls))
            .with("B", Behavior::Fatal)
            .provider(digest_provider("C", &["SHA-256"])),
    );
    let factory = InstanceFactory::new(resolver(&config(&["A", "B", "C"]), loader));

    let err = factory.create("MessageDigest", None, "SHA-256").unwrap_err();
    assert!(matches!(err, Error::FatalProvider { ref provider, .. } if provider == "B"));
}

#[test]
fn named_provider_bypasses_resolution() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-256"]))
            .provider(digest_provider("B", &["SHA-256"])),
    );
    let factory = InstanceFactory::new(resolver(&config(&["A", "B"]), loader));

    let instance = factory
        .create_from_named_provider("MessageDigest", None, "SHA-256", None, "B")
        .unwrap();
    let (_, digest) = instance.downcast::<Digest>().unwrap();
    assert_eq!(
        *digest,
        Digest {
            provider: "B".to_string(),
            algorithm: "SHA-256".to_string(),
        }
    );

    assert_eq!(
        factory
            .create_from_named_provider("MessageDigest", None, "SHA-256", None, "")
            .unwrap_err(),
        Error::MissingProviderArgument
    );
    assert_eq!(
        factory
            .create_from_named_provider("MessageDigest", None, "SHA-256", None, "Q")
            .unwrap_err(),
        Error::UnknownNamedProvider("Q".to_string())
    );
}
