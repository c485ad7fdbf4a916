//! End-to-end admission, check and context scenarios.

mod common;

use common::Harness;
use warden_admission::SessionPhase;
use warden_core::{ContextSet, HostOutcome, MODE_KEY, Tristate};
use warden_events::{EventKind, WardenEvent};
use warden_test::{GrantTable, MockDataStore, test_principal, test_principal_with};

#[tokio::test]
async fn test_granted_principal_loads_joins_and_checks() {
    let alice = test_principal("alice");
    let store =
        MockDataStore::new().with_grants(alice.id(), GrantTable::new().grant("feature.x"));
    let harness = Harness::new(store);
    let mut logins = harness.bus.subscribe_kind(EventKind::LoginProcessed);

    let attempt = harness.pre_login(&alice).await;
    assert!(!attempt.is_cancelled());

    let join = harness.join(&alice);
    assert!(!join.is_cancelled());
    assert_eq!(
        harness.controller.phase(&alice.id()),
        Some(SessionPhase::JoinAllowed)
    );

    assert_eq!(harness.check(&alice, "feature.x"), HostOutcome::True);
    assert_eq!(harness.check(&alice, "feature.unknown"), HostOutcome::Unset);

    let event = logins.recv().await.unwrap();
    assert!(matches!(
        &*event,
        WardenEvent::LoginProcessed { loaded: true, name, .. } if name == "alice"
    ));

    assert!(harness.known.contains("feature.x"));
    let trail = harness.trail.records();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].result, Tristate::True);
    assert_eq!(trail[1].result, Tristate::Undefined);
}

#[tokio::test]
async fn test_failed_load_then_forced_join_is_denied() {
    let bob = test_principal("bob");
    let store = MockDataStore::new().fail_for(bob.id());
    let harness = Harness::new(store.clone());
    let mut logins = harness.bus.subscribe_kind(EventKind::LoginProcessed);

    let attempt = harness.pre_login(&bob).await;
    assert!(attempt.is_cancelled());
    assert_eq!(attempt.reason(), Some("data_load_failed"));
    assert!(!store.is_loaded(&bob.id()));

    let event = logins.recv().await.unwrap();
    assert!(matches!(
        &*event,
        WardenEvent::LoginProcessed { loaded: false, .. }
    ));

    // The host lets bob through anyway.
    let join = harness.join(&bob);
    assert!(join.is_cancelled());
    assert_eq!(join.reason(), Some("state_error"));
    assert!(!harness.controller.was_processed(&bob.id()));
    assert!(harness.controller.phase(&bob.id()).is_none());
}

#[tokio::test]
async fn test_capability_change_is_visible_after_invalidate() {
    let alice = test_principal_with("alice", &[(MODE_KEY, "creative")]);
    let harness = Harness::new(MockDataStore::new());

    let before = harness.contexts.get(&alice);
    assert!(before.contains("mode", "creative"));

    alice.capabilities().set(MODE_KEY, "survival");
    harness.contexts.invalidate(&alice.id());

    let after = harness.contexts.get(&alice);
    assert!(after.contains("mode", "survival"));
    assert!(!after.contains("mode", "creative"));
}

#[tokio::test]
async fn test_context_scoped_grant_follows_capabilities() {
    let alice = test_principal_with("alice", &[(MODE_KEY, "creative")]);
    let store = MockDataStore::new().with_grants(
        alice.id(),
        GrantTable::new().grant_in("fly", ContextSet::new().with("mode", "creative")),
    );
    let harness = Harness::new(store);

    harness.pre_login(&alice).await;
    harness.join(&alice);
    assert_eq!(harness.check(&alice, "fly"), HostOutcome::True);

    alice.capabilities().set(MODE_KEY, "survival");
    harness.contexts.signal_update(&alice);
    assert_eq!(harness.check(&alice, "fly"), HostOutcome::Unset);
}

#[tokio::test]
async fn test_join_primes_context_cache() {
    let alice = test_principal_with("alice", &[("region", "spawn")]);
    let harness = Harness::new(MockDataStore::new());

    harness.pre_login(&alice).await;
    let _ = harness.contexts.get(&alice);
    let _ = harness.contexts.get(&alice);
    assert_eq!(harness.counter.calls(), 1);

    harness.join(&alice);
    let _ = harness.contexts.get(&alice);
    assert_eq!(harness.counter.calls(), 2);
}

#[tokio::test]
async fn test_quit_then_check_is_integrity_violation() {
    let alice = test_principal("alice");
    let store =
        MockDataStore::new().with_grants(alice.id(), GrantTable::new().grant("feature.x"));
    let harness = Harness::new(store);

    harness.pre_login(&alice).await;
    harness.join(&alice);
    harness.controller.on_quit(&alice);

    assert!(harness.controller.phase(&alice.id()).is_none());
    assert_eq!(harness.check(&alice, "feature.x"), HostOutcome::False);
}

#[tokio::test]
async fn test_reconnect_reads_current_handle() {
    let alice = test_principal("alice");
    let store =
        MockDataStore::new().with_grants(alice.id(), GrantTable::new().grant("feature.x"));
    let harness = Harness::new(store.clone());

    harness.pre_login(&alice).await;
    harness.join(&alice);

    // Second connection for the same identity before the first quits.
    harness.pre_login(&alice).await;
    let join = harness.join(&alice);
    assert!(!join.is_cancelled());
    assert_eq!(store.load_count(), 2);
}
