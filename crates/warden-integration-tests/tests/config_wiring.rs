//! Configuration files flowing into the wired components.

mod common;

use std::time::Duration;

use common::Harness;
use warden_admission::StartupBarrier;
use warden_config::Config;
use warden_core::{LOCATION_KEY, MODE_KEY};
use warden_telemetry::{LogConfig, LogFormat};
use warden_test::{MockDataStore, test_principal, test_principal_with};

const OVERRIDES: &str = r#"
[admission]
startup_timeout_secs = 2
debug_logins = true

[context]
cache_ttl_ms = 250
disabled_calculators = ["count*"]

[context.location_rewrites]
world_nether = "world"

[check]
audit_capacity = 2

[logging]
level = "debug"
format = "json"
directives = ["warden_check::trail=trace"]
"#;

fn load_overrides() -> Config {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warden.toml");
    std::fs::write(&path, OVERRIDES).unwrap();
    Config::load(Some(dir.path()), Some(&path)).unwrap()
}

#[test]
fn test_explicit_file_overrides_defaults() {
    let config = load_overrides();

    assert_eq!(config.admission.startup_timeout(), Duration::from_secs(2));
    assert!(config.admission.debug_logins);
    assert_eq!(config.context.cache_ttl(), Duration::from_millis(250));
    assert_eq!(config.check.audit_capacity, 2);

    let logging = LogConfig::from_config(&config.logging).unwrap();
    assert_eq!(logging.format, LogFormat::Json);
    assert_eq!(logging.directives, vec!["warden_check::trail=trace"]);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(Config::load(Some(dir.path()), Some(&missing)).is_err());
}

#[tokio::test]
async fn test_loaded_config_shapes_components() {
    let config = load_overrides();
    let harness = Harness::from_config(&config, MockDataStore::new(), StartupBarrier::ready());

    assert_eq!(harness.controller.settings().startup_timeout, Duration::from_secs(2));
    assert_eq!(harness.contexts.ttl(), Duration::from_millis(250));
    assert_eq!(harness.trail.capacity(), 2);

    // The counting calculator matches the disabled pattern.
    assert!(!harness.contexts.registry().names().contains(&"counting".to_string()));

    let alice = test_principal_with(
        "alice",
        &[(MODE_KEY, "survival"), (LOCATION_KEY, "world_nether")],
    );
    let context = harness.contexts.get(&alice);
    assert!(context.contains(LOCATION_KEY, "world"));
    assert!(context.contains(MODE_KEY, "survival"));
    assert_eq!(harness.counter.calls(), 0);
}

#[tokio::test]
async fn test_trail_capacity_bounds_records() {
    let config = load_overrides();
    let harness = Harness::from_config(&config, MockDataStore::new(), StartupBarrier::ready());
    let alice = test_principal("alice");
    harness.pre_login(&alice).await;
    harness.join(&alice);

    for permission in ["a", "b", "c"] {
        harness.check(&alice, permission);
    }
    let permissions: Vec<_> = harness
        .trail
        .records()
        .into_iter()
        .map(|r| r.permission)
        .collect();
    assert_eq!(permissions, vec!["b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn test_closed_barrier_delays_then_admits() {
    let config = load_overrides();
    let harness = Harness::from_config(&config, MockDataStore::new(), StartupBarrier::new());
    let alice = test_principal("alice");

    let attempt = harness.pre_login(&alice).await;
    assert!(!attempt.is_cancelled());
    assert!(harness.store.is_loaded(&alice.id()));
    assert!(!harness.controller.barrier().is_ready());
}
