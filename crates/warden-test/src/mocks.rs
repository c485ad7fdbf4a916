//! Mock collaborators for testing.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use warden_context::{CalculatorResult, ContextCalculator};
use warden_core::{
    AuditRecorder, AuthorizationData, CheckRecord, ContextSet, DataHandle, DataStore,
    PermissionRegistry, Principal, PrincipalId, Reason, ReasonRenderer, Tristate, WardenError,
    WardenResult,
};

/// In-memory authorization data: an ordered list of grants.
///
/// The last matching grant wins. A grant matches when its required context
/// is satisfied by the query context.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    grants: Vec<(String, ContextSet, bool)>,
}

impl GrantTable {
    /// An empty table; every lookup is [`Tristate::Undefined`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `permission` in every context.
    #[must_use]
    pub fn grant(self, permission: &str) -> Self {
        self.set(permission, ContextSet::new(), true)
    }

    /// Deny `permission` in every context.
    #[must_use]
    pub fn deny(self, permission: &str) -> Self {
        self.set(permission, ContextSet::new(), false)
    }

    /// Grant `permission` only where `required` is satisfied.
    #[must_use]
    pub fn grant_in(self, permission: &str, required: ContextSet) -> Self {
        self.set(permission, required, true)
    }

    /// Add an explicit grant or denial scoped to `required`.
    #[must_use]
    pub fn set(mut self, permission: &str, required: ContextSet, value: bool) -> Self {
        self.grants
            .push((permission.to_ascii_lowercase(), required, value));
        self
    }
}

impl AuthorizationData for GrantTable {
    fn check_permission(&self, permission: &str, context: &ContextSet) -> Tristate {
        let permission = permission.to_ascii_lowercase();
        self.grants
            .iter()
            .rev()
            .find(|(p, required, _)| *p == permission && required.is_satisfied_by(context))
            .map_or(Tristate::Undefined, |(_, _, value)| Tristate::from_bool(*value))
    }
}

/// In-memory [`DataStore`].
///
/// Principals without prepared grants load an empty [`GrantTable`].
/// Principals marked with [`fail_for`](Self::fail_for) fail to load.
#[derive(Debug, Clone, Default)]
pub struct MockDataStore {
    prepared: Arc<DashMap<PrincipalId, GrantTable>>,
    loaded: Arc<DashMap<PrincipalId, DataHandle>>,
    failing: Arc<DashSet<PrincipalId>>,
    delay: Option<Duration>,
    loads: Arc<AtomicUsize>,
    unloads: Arc<AtomicUsize>,
}

impl MockDataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the grants `id` receives on load.
    #[must_use]
    pub fn with_grants(self, id: PrincipalId, table: GrantTable) -> Self {
        self.prepared.insert(id, table);
        self
    }

    /// Make every load for `id` fail.
    #[must_use]
    pub fn fail_for(self, id: PrincipalId) -> Self {
        self.failing.insert(id);
        self
    }

    /// Sleep for `delay` inside every load.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Insert a handle directly, bypassing `load`.
    pub fn insert_loaded(&self, id: PrincipalId, table: GrantTable) {
        self.loaded.insert(id, Arc::new(table));
    }

    /// Whether data is currently loaded for `id`.
    #[must_use]
    pub fn is_loaded(&self, id: &PrincipalId) -> bool {
        self.loaded.contains_key(id)
    }

    /// Number of `load` calls so far.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `unload` calls so far.
    #[must_use]
    pub fn unload_count(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for MockDataStore {
    async fn load(&self, principal: &Principal) -> WardenResult<DataHandle> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let id = principal.id();
        if self.failing.contains(&id) {
            return Err(WardenError::data_load(id, "backend unavailable"));
        }

        let table = self
            .prepared
            .get(&id)
            .map(|t| t.value().clone())
            .unwrap_or_default();
        let handle: DataHandle = Arc::new(table);
        self.loaded.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    fn get_if_loaded(&self, id: &PrincipalId) -> Option<DataHandle> {
        self.loaded.get(id).map(|h| Arc::clone(h.value()))
    }

    fn unload(&self, id: &PrincipalId) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
        self.loaded.remove(id);
    }
}

/// Renders reasons as `"<reason>"` or `"<reason>@<locale>"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRenderer;

impl ReasonRenderer for MockRenderer {
    fn render(&self, reason: Reason, locale: Option<&str>) -> String {
        match locale {
            Some(locale) => format!("{reason}@{locale}"),
            None => reason.to_string(),
        }
    }
}

/// Captures audit records and observed permissions.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudit {
    records: Arc<Mutex<Vec<CheckRecord>>>,
    observed: Arc<Mutex<Vec<String>>>,
}

impl RecordingAudit {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<CheckRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Permission strings observed so far, in order.
    #[must_use]
    pub fn observed(&self) -> Vec<String> {
        self.observed.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl AuditRecorder for RecordingAudit {
    fn record(&self, record: &CheckRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record.clone());
        }
    }
}

impl PermissionRegistry for RecordingAudit {
    fn observe(&self, permission: &str) {
        if let Ok(mut guard) = self.observed.lock() {
            guard.push(permission.to_string());
        }
    }
}

/// Calculator that copies one capability into the context and counts
/// how often it ran.
#[derive(Debug)]
pub struct CountingCalculator {
    key: String,
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingCalculator {
    /// Contribute the capability named `key` as `key=value`.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Block the calling thread for `delay` on every calculation.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of calculations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContextCalculator for CountingCalculator {
    fn name(&self) -> &str {
        "counting"
    }

    fn calculate(&self, principal: &Principal, acc: &mut ContextSet) -> CalculatorResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(value) = principal.capabilities().get(&self.key) {
            acc.add(&self.key, &value);
        }
        Ok(())
    }

    fn estimate_potential(&self) -> CalculatorResult<ContextSet> {
        Ok(ContextSet::new())
    }
}
