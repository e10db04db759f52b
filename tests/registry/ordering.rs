//! Result order: registry precedence, preference overrides and aliases.

use std::sync::Arc;

use provsel::{Config, Implementation, Service, ServiceId, StandardProvider};

use crate::common::*;

#[test]
fn services_follow_registry_order() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-256"]))
            .provider(digest_provider("B", &["SHA-256"]))
            .provider(digest_provider("C", &["SHA-256"])),
    );
    let r = resolver(&config(&["A", "B", "C"]), loader);

    assert_eq!(
        listing(&r, "MessageDigest", "SHA-256"),
        vec!["A:SHA-256", "B:SHA-256", "C:SHA-256"]
    );
}

#[test]
fn preference_overrides_registry_order() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-256"]))
            .provider(digest_provider("B", &["SHA-256"]))
            .provider(digest_provider("C", &["SHA-512"])),
    );
    let config = Config::builder()
        .provider("A")
        .provider("B")
        .provider("C")
        .preferred("MessageDigest.SHA-256:B")
        .build()
        .unwrap();
    let r = resolver(&config, loader);

    let first = r.service("MessageDigest", "SHA-256").unwrap().unwrap();
    assert_eq!(first.provider_name(), "B");

    // The preferred provider is listed again at its natural position.
    assert_eq!(
        listing(&r, "MessageDigest", "SHA-256"),
        vec!["B:SHA-256", "A:SHA-256", "B:SHA-256"]
    );

    // Other algorithms are unaffected.
    assert_eq!(
        r.service("MessageDigest", "SHA-512")
            .unwrap()
            .unwrap()
            .provider_name(),
        "C"
    );
}

fn sha1_provider(name: &str) -> Arc<dyn provsel::Provider> {
    Arc::new(
        StandardProvider::new(name, "1.0", "").with_service(
            Service::new("MessageDigest", "SHA-1", format!("{name}.Sha1"), |_| {
                Ok(Box::new(()) as Implementation)
            })
            .with_alias("SHA1"),
        ),
    )
}

#[test]
fn legacy_sha1_spellings_match_both_ways() {
    let _ = env_logger::try_init();

    for (directive, query) in [("SHA1:B", "SHA-1"), ("SHA-1:B", "SHA1")] {
        let loader = Arc::new(
            CountingLoader::new()
                .provider(sha1_provider("A"))
                .provider(sha1_provider("B")),
        );
        let config = Config::builder()
            .provider("A")
            .provider("B")
            .preferred(directive)
            .build()
            .unwrap();
        let r = resolver(&config, loader);

        let first = r.service("MessageDigest", query).unwrap().unwrap();
        assert_eq!(first.provider_name(), "B", "{directive} for {query}");
    }
}

#[test]
fn group_preference_covers_family() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-256", "SHA-384", "SHA-1"]))
            .provider(digest_provider("B", &["SHA-256", "SHA-384", "SHA-1"])),
    );
    let config = Config::builder()
        .provider("A")
        .provider("B")
        .preferred("Group.SHA2:B")
        .build()
        .unwrap();
    let r = resolver(&config, loader);

    for alg in ["SHA-256", "SHA-384"] {
        let s = r.service("MessageDigest", alg).unwrap().unwrap();
        assert_eq!(s.provider_name(), "B", "{alg}");
    }
    let s = r.service("MessageDigest", "SHA-1").unwrap().unwrap();
    assert_eq!(s.provider_name(), "A");
}

#[test]
fn batch_query_keeps_provider_precedence() {
    let _ = env_logger::try_init();

    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-384"]))
            .provider(digest_provider("B", &["SHA-256"])),
    );
    let r = resolver(&config(&["A", "B"]), loader);

    let mut list = r.services_any(vec![
        ServiceId::new("MessageDigest", "SHA-256"),
        ServiceId::new("MessageDigest", "SHA-384"),
    ]);
    let found: Vec<_> = list
        .to_vec()
        .unwrap()
        .iter()
        .map(|s| format!("{}:{}", s.provider_name(), s.algorithm()))
        .collect();
    assert_eq!(found, vec!["A:SHA-384", "B:SHA-256"]);
}

fn batch_listing(config: &Config) -> Vec<String> {
    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("A", &["SHA-256", "SHA-384"]))
            .provider(digest_provider("C", &["SHA-256", "SHA-384"])),
    );
    let r = resolver(config, loader);
    r.services_any(vec![
        ServiceId::new("MessageDigest", "SHA-384"),
        ServiceId::new("MessageDigest", "SHA-256"),
    ])
    .to_vec()
    .unwrap()
    .iter()
    .map(|s| format!("{}:{}", s.provider_name(), s.algorithm()))
    .collect()
}

#[test]
fn batch_preference_applies_to_its_own_algorithm() {
    let _ = env_logger::try_init();

    let config = Config::builder()
        .provider("A")
        .provider("C")
        .preferred("MessageDigest.SHA-256:C")
        .build()
        .unwrap();

    // SHA-384 keeps registry order, only SHA-256 is pulled ahead.
    assert_eq!(
        batch_listing(&config),
        vec!["C:SHA-256", "A:SHA-384", "A:SHA-256", "C:SHA-384", "C:SHA-256"]
    );
}

#[test]
fn batch_group_preference_lists_each_member_once() {
    let _ = env_logger::try_init();

    let config = Config::builder()
        .provider("A")
        .provider("C")
        .preferred("Group.SHA2:C")
        .build()
        .unwrap();

    assert_eq!(
        batch_listing(&config),
        vec![
            "C:SHA-384",
            "C:SHA-256",
            "A:SHA-384",
            "A:SHA-256",
            "C:SHA-384",
            "C:SHA-256"
        ]
    );
}

#[test]
fn sun_and_sun_rsa_sign() {
    let _ = env_logger::try_init();

    let sun = digest_provider("SUN", &["SHA-256", "MD5"]);
    let rsa = Arc::new(StandardProvider::new("SunRsaSign", "1.0", "").with_service(
        Service::new("Signature", "SHA256withRSA", "SunRsaSign.RSASignature", |_| {
            Ok(Box::new(()) as Implementation)
        }),
    ));
    let loader = Arc::new(CountingLoader::new().provider(sun).provider(rsa));
    let r = resolver(&config(&["SUN", "SunRsaSign"]), loader);

    let s = r.service("MessageDigest", "SHA-256").unwrap().unwrap();
    assert_eq!(s.provider_name(), "SUN");

    let mut list = r.services("MessageDigest", "SHA-256");
    assert_eq!(list.len().unwrap(), 1);
    assert!(list.get(0).unwrap().unwrap().same_as(&s));
    assert!(list.get(1).unwrap().is_none());
}

#[test]
fn no_match_is_empty_not_error() {
    let _ = env_logger::try_init();

    let loader = Arc::new(CountingLoader::new().provider(digest_provider("A", &["SHA-256"])));
    let r = resolver(&config(&["A"]), loader);

    assert!(r.service("Cipher", "AES").unwrap().is_none());
    assert!(r.services("Cipher", "AES").is_empty().unwrap());
}
