//! Permission-check bridge.
//!
//! Answers the host's ad-hoc permission queries for connected principals
//! from their loaded authorization data, evaluated under the principal's
//! cached query context.
//!
//! # Check Flow
//!
//! 1. **`on_check`** (early): principal-bound checks only
//!    - resolve the query context through the [`ContextCache`]
//!    - no loaded data -> integrity violation, force `False`
//!    - otherwise evaluate; `Undefined` leaves the host outcome alone
//!    - record the result and observe the permission string
//! 2. **`on_check_monitor`** (monitor): every other subject
//!    - never touches the outcome
//!    - records the final outcome and observes the permission string

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;
use tracing::{error, trace};
use warden_context::ContextCache;
use warden_core::{
    AuditRecorder, CheckRecord, CheckSubject, ContextSet, DataStore, HookEvent, HookPoint,
    HostOutcome, PermissionCheck, PermissionRegistry, Principal, Priority, Tristate,
    WardenError,
};

/// Where each bridge handler must be registered.
pub const CHECK_HOOK_POINTS: [HookPoint; 2] = [
    HookPoint::new(HookEvent::PermissionCheck, Priority::Early, "on_check"),
    HookPoint::new(HookEvent::PermissionCheck, Priority::Monitor, "on_check_monitor"),
];

/// Connects host permission queries to loaded authorization data.
pub struct CheckBridge {
    store: Arc<dyn DataStore>,
    contexts: ContextCache,
    audit: Arc<dyn AuditRecorder>,
    registry: Arc<dyn PermissionRegistry>,
}

impl CheckBridge {
    /// Create a bridge over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        contexts: ContextCache,
        audit: Arc<dyn AuditRecorder>,
        registry: Arc<dyn PermissionRegistry>,
    ) -> Self {
        Self {
            store,
            contexts,
            audit,
            registry,
        }
    }

    /// Handler declarations for the host.
    #[must_use]
    pub fn hook_points() -> &'static [HookPoint] {
        &CHECK_HOOK_POINTS
    }

    /// Primary handler. Runs early so later collaborators see the answer.
    pub fn on_check(&self, check: &mut PermissionCheck) {
        let CheckSubject::Principal(principal) = check.subject() else {
            return;
        };
        let principal = principal.clone();
        let context = self.contexts.get(&principal);

        let result = match self.evaluate(&principal, check.permission(), &context) {
            Ok(result) => {
                if result.is_defined() {
                    check.set_outcome(HostOutcome::from(result));
                }
                result
            },
            Err(err) => {
                error!(
                    principal = %principal.id(),
                    name = %principal.name(),
                    permission = %check.permission(),
                    error = %err,
                    backtrace = %Backtrace::force_capture(),
                    "Permission check for a principal with no loaded data, denying"
                );
                check.set_outcome(HostOutcome::False);
                Tristate::False
            },
        };

        trace!(
            principal = %principal.id(),
            permission = %check.permission(),
            context = %context,
            result = %result,
            "Permission check answered"
        );
        self.record(check, context.as_ref().clone(), result);
    }

    /// Monitor handler. Observes checks for subjects that are not
    /// connected principals; never alters the outcome.
    pub fn on_check_monitor(&self, check: &mut PermissionCheck) {
        if matches!(check.subject(), CheckSubject::Principal(_)) {
            return;
        }
        let result = Tristate::from(check.outcome());
        self.record(check, ContextSet::new(), result);
    }

    fn evaluate(
        &self,
        principal: &Principal,
        permission: &str,
        context: &ContextSet,
    ) -> Result<Tristate, WardenError> {
        let data = self.store.get_if_loaded(&principal.id()).ok_or_else(|| {
            WardenError::IntegrityViolation {
                principal: principal.id(),
                stage: "check",
            }
        })?;
        Ok(data.check_permission(permission, context))
    }

    fn record(&self, check: &PermissionCheck, context: ContextSet, result: Tristate) {
        self.audit.record(&CheckRecord {
            origin: check.origin(),
            subject: check.subject().name().to_string(),
            context,
            permission: check.permission().to_string(),
            result,
        });
        self.registry.observe(check.permission());
    }
}

impl fmt::Debug for CheckBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBridge")
            .field("contexts", &self.contexts)
            .finish_non_exhaustive()
    }
}
