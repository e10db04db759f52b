//! Registries configured from a properties document.

use std::sync::Arc;

use provsel::{Config, PreferenceTable, ServiceResolver};

use crate::common::*;

const SECURITY_PROPERTIES: &str = "\
#
# List of providers and their preference orders
#
security.provider.1=SUN
security.provider.2=SunRsaSign
security.provider.3=SunPKCS11 ${java.home}/conf/p11.cfg
security.provider.5=NeverRead

! Preferred providers
jdk.security.provider.preferred=Group.SHA2:SunRsaSign
";

#[test]
fn registry_from_properties() {
    let _ = env_logger::try_init();

    let config = Config::from_properties(SECURITY_PROPERTIES).unwrap();
    let loader = Arc::new(
        CountingLoader::new()
            .provider(digest_provider("SUN", &["SHA-256", "SHA-1"]))
            .provider(digest_provider("SunRsaSign", &["SHA-256"])),
    );
    let r = ServiceResolver::from_config(&config, loader.clone());

    assert_eq!(
        r.registry().to_string(),
        "[SUN, SunRsaSign, SunPKCS11('${java.home}/conf/p11.cfg')]"
    );

    let s = r.service("MessageDigest", "SHA-256").unwrap().unwrap();
    assert_eq!(s.provider_name(), "SunRsaSign");
    let s = r.service("MessageDigest", "SHA-1").unwrap().unwrap();
    assert_eq!(s.provider_name(), "SUN");

    // SunPKCS11 is not registered with the loader.
    assert_eq!(
        listing(&r, "MessageDigest", "SHA-256"),
        vec!["SunRsaSign:SHA-256", "SUN:SHA-256", "SunRsaSign:SHA-256"]
    );
    assert_eq!(loader.loads("SunPKCS11"), 1);
    assert_eq!(loader.loads("NeverRead"), 0);
}

#[test]
fn malformed_preferences_are_skipped() {
    let _ = env_logger::try_init();

    let config = Config::from_properties(
        "security.provider.1=A\n\
         jdk.security.provider.preferred=SHA-256, Group.MD:A, :A, MessageDigest.SHA-512:A",
    )
    .unwrap();

    let table = PreferenceTable::from_config(&config);
    assert_eq!(table.len(), 1);
    assert_eq!(table.entries()[0].to_string(), "MessageDigest.SHA-512:A");
}
