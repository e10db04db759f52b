//! Shared registries used from several threads.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use provsel::{Provider, ProviderError, ProviderLoader, ProviderRegistry};

use crate::common::*;

/// Loader that takes a while, so that callers pile up on the slot.
struct SlowLoader(CountingLoader);

impl ProviderLoader for SlowLoader {
    fn load(&self, name: &str) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
        thread::sleep(Duration::from_millis(20));
        self.0.load(name)
    }
}

#[test]
fn concurrent_lookups_load_once() {
    let _ = env_logger::try_init();

    let loader = Arc::new(SlowLoader(
        CountingLoader::new().provider(digest_provider("A", &["SHA-256"])),
    ));
    let r = resolver_with(&config(&["A"]), loader.clone());

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let r = r.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                r.service("MessageDigest", "SHA-256")
                    .unwrap()
                    .unwrap()
                    .provider_name()
                    .to_string()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), "A");
    }
    assert_eq!(loader.0.loads("A"), 1);
}

#[test]
fn concurrent_failures_respect_limit() {
    let _ = env_logger::try_init();

    let loader = Arc::new(SlowLoader(CountingLoader::new().with("Gone", Behavior::Missing)));
    let config = provsel::Config::builder()
        .provider("Gone")
        .max_load_attempts(4)
        .build()
        .unwrap();
    let registry = ProviderRegistry::from_config(&config, loader.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..5 {
                    assert!(registry.get(0).unwrap().is_none());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(loader.0.loads("Gone"), 4);
}

fn resolver_with(config: &provsel::Config, loader: Arc<SlowLoader>) -> provsel::ServiceResolver {
    provsel::ServiceResolver::from_config(config, loader)
}
