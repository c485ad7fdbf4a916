//! Connection admission controller.
//!
//! Reconciles the slow, asynchronous authorization-data load with the
//! synchronous join path, and defends its own denials against other
//! collaborators handling the same host events.
//!
//! # Event Flow
//!
//! 1. **`on_async_auth`** (early): wait for startup, load data
//!    - load failure -> cancel with a rendered reason, mark pending denial
//! 2. **`on_async_auth_monitor`** (monitor): re-cancel overridden denials
//!    and forget the denied session, release data if someone else
//!    cancelled an admitted attempt
//! 3. **`on_join`** (first): deny when no data is loaded, otherwise prime
//!    the context cache
//! 4. **`on_join_monitor`** (monitor): same defense as step 2
//! 5. **`on_quit`** (monitor): release data and forget the session

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use warden_config::AdmissionSection;
use warden_context::ContextCache;
use warden_core::{
    ConnectionAttempt, DataStore, HookEvent, HookPoint, Principal, PrincipalId, Priority, Reason,
    ReasonRenderer, WardenError,
};
use warden_events::{EventBus, WardenEvent};

use crate::barrier::{BarrierOutcome, StartupBarrier};
use crate::denial::{ConnectedSessions, PendingDenials, Stage};
use crate::phase::{PhaseTable, SessionPhase};

/// Default bound on waiting for startup during pre-login.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Where each controller handler must be registered.
pub const ADMISSION_HOOK_POINTS: [HookPoint; 5] = [
    HookPoint::new(HookEvent::AsyncAuth, Priority::Early, "on_async_auth"),
    HookPoint::new(HookEvent::AsyncAuth, Priority::Monitor, "on_async_auth_monitor"),
    HookPoint::new(HookEvent::Join, Priority::First, "on_join"),
    HookPoint::new(HookEvent::Join, Priority::Monitor, "on_join_monitor"),
    HookPoint::new(HookEvent::Quit, Priority::Monitor, "on_quit"),
];

/// Logged when a join is denied for a principal that completed pre-login
/// but whose data has since disappeared.
pub const JOIN_DENIED_DATA_GONE: &str =
    "Authorization data was loaded during pre-login but is no longer present, denying join";

/// Logged when a join is denied for a principal never processed in
/// pre-login.
pub const JOIN_DENIED_NEVER_PROCESSED: &str =
    "Principal was never processed during pre-login, denying join";

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionSettings {
    /// Bound on waiting for the startup barrier.
    pub startup_timeout: Duration,
    /// Log pre-login and join processing at info instead of debug.
    pub debug_logins: bool,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            debug_logins: false,
        }
    }
}

impl AdmissionSettings {
    /// Settings from the `[admission]` section.
    #[must_use]
    pub fn from_config(section: &AdmissionSection) -> Self {
        Self {
            startup_timeout: section.startup_timeout(),
            debug_logins: section.debug_logins,
        }
    }
}

/// Per-principal admission state machine.
pub struct AdmissionController {
    store: Arc<dyn DataStore>,
    contexts: ContextCache,
    renderer: Arc<dyn ReasonRenderer>,
    barrier: Arc<StartupBarrier>,
    events: Option<EventBus>,
    settings: AdmissionSettings,
    phases: PhaseTable,
    denials: PendingDenials,
    sessions: ConnectedSessions,
}

impl AdmissionController {
    /// Create a controller over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        contexts: ContextCache,
        renderer: Arc<dyn ReasonRenderer>,
        barrier: Arc<StartupBarrier>,
    ) -> Self {
        Self {
            store,
            contexts,
            renderer,
            barrier,
            events: None,
            settings: AdmissionSettings::default(),
            phases: PhaseTable::new(),
            denials: PendingDenials::new(),
            sessions: ConnectedSessions::new(),
        }
    }

    /// Replace the default settings.
    #[must_use]
    pub fn with_settings(mut self, settings: AdmissionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Publish lifecycle events on `bus`.
    #[must_use]
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Handler declarations for the host.
    #[must_use]
    pub fn hook_points() -> &'static [HookPoint] {
        &ADMISSION_HOOK_POINTS
    }

    /// Pre-login handler. May wait on startup and on loader I/O.
    pub async fn on_async_auth(&self, attempt: &mut ConnectionAttempt) {
        let principal = attempt.principal().clone();
        let id = principal.id();
        self.phases.begin(id);

        match self.barrier.await_ready(self.settings.startup_timeout).await {
            BarrierOutcome::Ready => {},
            BarrierOutcome::TimedOut => {
                let waited_ms =
                    u64::try_from(self.settings.startup_timeout.as_millis()).unwrap_or(u64::MAX);
                let err = WardenError::InitializationTimeout { waited_ms };
                warn!(
                    principal = %id,
                    name = %principal.name(),
                    error = %err,
                    "Processing pre-login before startup finished"
                );
            },
            BarrierOutcome::Cancelled => {
                debug!(principal = %id, "Startup barrier cancelled, processing pre-login");
            },
        }

        self.log_login(&principal, "Processing pre-login");

        if attempt.is_cancelled() {
            // Denied before we ran; the monitor keeps it that way.
            self.denials.mark(Stage::AsyncAuth, id);
            self.advance(id, SessionPhase::AsyncDenied);
            debug!(principal = %id, "Pre-login already cancelled, not loading data");
            return;
        }

        match self.store.load(&principal).await {
            Ok(_) => {
                self.advance(id, SessionPhase::AsyncAllowed);
                self.sessions.record(id);
                self.publish(WardenEvent::login_processed(id, principal.name(), true));
                self.log_login(&principal, "Loaded authorization data");
            },
            Err(err) => {
                warn!(
                    principal = %id,
                    name = %principal.name(),
                    error = %err,
                    "Failed to load authorization data, denying pre-login"
                );
                self.denials.mark(Stage::AsyncAuth, id);
                self.advance(id, SessionPhase::AsyncDenied);
                attempt.cancel(
                    self.renderer
                        .render(Reason::DataLoadFailed, principal.locale()),
                );
                self.publish(WardenEvent::login_processed(id, principal.name(), false));
            },
        }
    }

    /// Pre-login monitor. Runs after every other collaborator.
    pub fn on_async_auth_monitor(&self, attempt: &mut ConnectionAttempt) {
        self.enforce(attempt, Stage::AsyncAuth, SessionPhase::AsyncAllowed);
    }

    /// Join handler. Runs before every other collaborator; never blocks.
    pub fn on_join(&self, attempt: &mut ConnectionAttempt) {
        let principal = attempt.principal().clone();
        let id = principal.id();
        self.advance(id, SessionPhase::JoinPending);

        if self.store.get_if_loaded(&id).is_none() {
            self.denials.mark(Stage::Join, id);
            self.advance(id, SessionPhase::JoinDenied);
            attempt.cancel(self.renderer.render(Reason::StateError, principal.locale()));

            let err = WardenError::IntegrityViolation {
                principal: id,
                stage: Stage::Join.as_str(),
            };
            let message = if self.sessions.contains(&id) {
                JOIN_DENIED_DATA_GONE
            } else {
                JOIN_DENIED_NEVER_PROCESSED
            };
            warn!(
                principal = %id,
                name = %principal.name(),
                error = %err,
                "{message}"
            );
            return;
        }

        // Anything cached before the join was computed against a stale
        // capability set.
        self.contexts.invalidate(&id);
        self.advance(id, SessionPhase::JoinAllowed);
        self.log_login(&principal, "Join allowed");
    }

    /// Join monitor. Runs after every other collaborator.
    pub fn on_join_monitor(&self, attempt: &mut ConnectionAttempt) {
        self.enforce(attempt, Stage::Join, SessionPhase::JoinAllowed);
    }

    /// Disconnect handler. Runs after every other collaborator.
    pub fn on_quit(&self, principal: &Principal) {
        let id = principal.id();
        self.advance(id, SessionPhase::Disconnected);
        self.release(&id);
        debug!(principal = %id, name = %principal.name(), "Released session");
    }

    /// Current phase of `id`.
    #[must_use]
    pub fn phase(&self, id: &PrincipalId) -> Option<SessionPhase> {
        self.phases.get(id)
    }

    /// Whether a denial marker is pending for `id` at `stage`.
    #[must_use]
    pub fn has_pending_denial(&self, stage: Stage, id: &PrincipalId) -> bool {
        self.denials.contains(stage, id)
    }

    /// Whether `id` ever completed pre-login in this process.
    #[must_use]
    pub fn was_processed(&self, id: &PrincipalId) -> bool {
        self.sessions.contains(id)
    }

    /// The startup barrier.
    #[must_use]
    pub fn barrier(&self) -> &Arc<StartupBarrier> {
        &self.barrier
    }

    /// The context cache primed on join.
    #[must_use]
    pub fn contexts(&self) -> &ContextCache {
        &self.contexts
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> AdmissionSettings {
        self.settings
    }

    fn enforce(&self, attempt: &mut ConnectionAttempt, stage: Stage, admitted: SessionPhase) {
        let principal = attempt.principal().clone();
        let id = principal.id();

        if self.denials.take(stage, &id) {
            if !attempt.is_cancelled() {
                let err = WardenError::UnauthorizedOverride {
                    principal: id,
                    stage: stage.as_str(),
                };
                error!(
                    principal = %id,
                    name = %principal.name(),
                    error = %err,
                    "Another handler re-allowed a connection this core denied, cancelling again"
                );
                attempt.force_cancel();
                self.publish(WardenEvent::connection_reallowed(id, stage.as_str()));
            }
            // Denied attempts never see a quit.
            self.phases.remove_if(&id, denied_phase(stage));
            return;
        }

        if attempt.is_cancelled() && self.phases.get(&id) == Some(admitted) {
            // Admitted by us, cancelled by someone else: nobody will send a
            // quit for this attempt.
            debug!(
                principal = %id,
                stage = %stage,
                "Attempt cancelled by another handler, releasing data"
            );
            self.release(&id);
        }
    }

    fn release(&self, id: &PrincipalId) {
        self.store.unload(id);
        self.phases.remove(id);
        self.denials.clear(id);
        self.contexts.invalidate(id);
    }

    fn advance(&self, id: PrincipalId, next: SessionPhase) {
        if let Err(err) = self.phases.advance(id, next) {
            debug!(principal = %id, error = %err, "Ignoring out-of-order phase transition");
        }
    }

    fn publish(&self, event: WardenEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    fn log_login(&self, principal: &Principal, message: &str) {
        if self.settings.debug_logins {
            info!(principal = %principal.id(), name = %principal.name(), "{message}");
        } else {
            debug!(principal = %principal.id(), name = %principal.name(), "{message}");
        }
    }
}

fn denied_phase(stage: Stage) -> SessionPhase {
    match stage {
        Stage::AsyncAuth => SessionPhase::AsyncDenied,
        Stage::Join => SessionPhase::JoinDenied,
    }
}

impl fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionController")
            .field("settings", &self.settings)
            .field("tracked", &self.phases.len())
            .finish_non_exhaustive()
    }
}
