//! Shared test harness for integration tests.

use std::sync::Arc;

use warden_admission::{AdmissionController, AdmissionSettings, StartupBarrier};
use warden_check::{CheckBridge, KnownPermissions, VerboseTrail};
use warden_config::Config;
use warden_context::ContextCache;
use warden_core::{
    CheckOrigin, CheckSubject, ConnectionAttempt, Dispatcher, HostOutcome, PermissionCheck,
    Principal, Priority,
};
use warden_events::EventBus;
use warden_test::{CountingCalculator, MockDataStore, MockRenderer, init_test_logging};

/// Wires every component the way a host would, over mock collaborators.
#[allow(dead_code)]
pub struct Harness {
    /// Loader/unloader shared with the controller and bridge.
    pub store: MockDataStore,
    /// Admission controller.
    pub controller: Arc<AdmissionController>,
    /// Permission-check bridge.
    pub bridge: Arc<CheckBridge>,
    /// Context cache shared by controller and bridge.
    pub contexts: ContextCache,
    /// Lifecycle events.
    pub bus: EventBus,
    /// Observed permission strings.
    pub known: Arc<KnownPermissions>,
    /// Recent check records.
    pub trail: Arc<VerboseTrail>,
    /// Extra calculator counting context computations.
    pub counter: Arc<CountingCalculator>,
}

#[allow(dead_code)]
impl Harness {
    /// Harness with default configuration and an open startup barrier.
    pub fn new(store: MockDataStore) -> Self {
        Self::from_config(&Config::default(), store, StartupBarrier::ready())
    }

    /// Harness built from a loaded configuration.
    pub fn from_config(config: &Config, store: MockDataStore, barrier: StartupBarrier) -> Self {
        init_test_logging();

        let bus = EventBus::new();
        let contexts = ContextCache::from_config(&config.context)
            .expect("valid context config")
            .with_events(bus.clone());
        let counter = Arc::new(CountingCalculator::new("region"));
        contexts.register_calculator(counter.clone());

        let known = Arc::new(KnownPermissions::new());
        let trail = Arc::new(VerboseTrail::from_config(&config.check));

        let controller = AdmissionController::new(
            Arc::new(store.clone()),
            contexts.clone(),
            Arc::new(MockRenderer),
            Arc::new(barrier),
        )
        .with_settings(AdmissionSettings::from_config(&config.admission))
        .with_events(bus.clone());

        let bridge = CheckBridge::new(
            Arc::new(store.clone()),
            contexts.clone(),
            trail.clone(),
            known.clone(),
        );

        Self {
            store,
            controller: Arc::new(controller),
            bridge: Arc::new(bridge),
            contexts,
            bus,
            known,
            trail,
            counter,
        }
    }

    /// Join dispatcher with the controller's handlers registered.
    pub fn join_dispatcher(&self) -> Dispatcher<ConnectionAttempt> {
        let mut dispatcher = Dispatcher::new();
        let primary = Arc::clone(&self.controller);
        dispatcher.register("on_join", Priority::First, move |a| primary.on_join(a));
        let monitor = Arc::clone(&self.controller);
        dispatcher.register("on_join_monitor", Priority::Monitor, move |a| {
            monitor.on_join_monitor(a);
        });
        dispatcher
    }

    /// Dispatcher for the synchronous tail of pre-login: whatever other
    /// collaborators the test registers, then the controller's monitor.
    pub fn async_tail_dispatcher(&self) -> Dispatcher<ConnectionAttempt> {
        let mut dispatcher = Dispatcher::new();
        let monitor = Arc::clone(&self.controller);
        dispatcher.register("on_async_auth_monitor", Priority::Monitor, move |a| {
            monitor.on_async_auth_monitor(a);
        });
        dispatcher
    }

    /// Permission-check dispatcher with the bridge's handlers registered.
    pub fn check_dispatcher(&self) -> Dispatcher<PermissionCheck> {
        let mut dispatcher = Dispatcher::new();
        let primary = Arc::clone(&self.bridge);
        dispatcher.register("on_check", Priority::Early, move |c| primary.on_check(c));
        let monitor = Arc::clone(&self.bridge);
        dispatcher.register("on_check_monitor", Priority::Monitor, move |c| {
            monitor.on_check_monitor(c);
        });
        dispatcher
    }

    /// Run pre-login for `principal` through the controller and the tail
    /// dispatcher. Returns the final attempt.
    pub async fn pre_login(&self, principal: &Principal) -> ConnectionAttempt {
        let mut attempt = ConnectionAttempt::new(principal.clone());
        self.controller.on_async_auth(&mut attempt).await;
        self.async_tail_dispatcher().dispatch(&mut attempt);
        attempt
    }

    /// Run the join event for `principal`. Returns the final attempt.
    pub fn join(&self, principal: &Principal) -> ConnectionAttempt {
        let mut attempt = ConnectionAttempt::new(principal.clone());
        self.join_dispatcher().dispatch(&mut attempt);
        attempt
    }

    /// Ask whether `principal` has `permission`, starting from `Unset`.
    pub fn check(&self, principal: &Principal, permission: &str) -> HostOutcome {
        let mut check = PermissionCheck::new(
            CheckSubject::Principal(principal.clone()),
            permission,
            CheckOrigin::PermissionCheck,
            HostOutcome::Unset,
        );
        self.check_dispatcher().dispatch(&mut check);
        check.outcome()
    }
}
