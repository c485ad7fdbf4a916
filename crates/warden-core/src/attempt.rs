//! Host events the core observes: connection attempts and permission checks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::principal::Principal;
use crate::tristate::HostOutcome;

/// A connection attempt (async pre-login or synchronous join) as seen by
/// every collaborator handling the same host event.
///
/// Cancellation is a plain flag. Any handler may flip it either way;
/// monitor passes re-assert denials made by this core.
#[derive(Debug, Clone)]
pub struct ConnectionAttempt {
    principal: Principal,
    cancelled: bool,
    reason: Option<String>,
}

impl ConnectionAttempt {
    /// A fresh, allowed attempt.
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            cancelled: false,
            reason: None,
        }
    }

    /// The connecting principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Whether the attempt is currently cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Displayable reason attached to the latest cancellation, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Cancel the attempt with a displayable reason.
    pub fn cancel(&mut self, reason: impl Into<String>) {
        self.cancelled = true;
        self.reason = Some(reason.into());
    }

    /// Cancel without replacing an existing reason.
    pub fn force_cancel(&mut self) {
        self.cancelled = true;
    }

    /// Reverse a cancellation. Hosts and other collaborators may do this;
    /// the core itself never does.
    pub fn allow(&mut self) {
        self.cancelled = false;
        self.reason = None;
    }
}

/// Which host surface produced a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOrigin {
    /// A boolean "has permission?" query.
    PermissionCheck,
    /// A tri-state lookup that may legitimately return "unset".
    LookupCheck,
}

impl fmt::Display for CheckOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionCheck => write!(f, "permission_check"),
            Self::LookupCheck => write!(f, "lookup_check"),
        }
    }
}

/// Who a permission check is about.
#[derive(Debug, Clone)]
pub enum CheckSubject {
    /// A connected principal whose data this core loaded.
    Principal(Principal),
    /// Anything else the host checks permissions for (console, automation, ...).
    Other {
        /// Display name used in the audit trail.
        name: String,
    },
}

impl CheckSubject {
    /// Display name of the subject.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Principal(p) => p.name(),
            Self::Other { name } => name,
        }
    }
}

/// An in-flight permission check.
#[derive(Debug, Clone)]
pub struct PermissionCheck {
    subject: CheckSubject,
    permission: String,
    origin: CheckOrigin,
    outcome: HostOutcome,
}

impl PermissionCheck {
    /// A check with the host's initial outcome.
    #[must_use]
    pub fn new(
        subject: CheckSubject,
        permission: impl Into<String>,
        origin: CheckOrigin,
        initial: HostOutcome,
    ) -> Self {
        Self {
            subject,
            permission: permission.into(),
            origin,
            outcome: initial,
        }
    }

    /// Who the check is about.
    #[must_use]
    pub fn subject(&self) -> &CheckSubject {
        &self.subject
    }

    /// The permission string being checked.
    #[must_use]
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Which host surface produced the check.
    #[must_use]
    pub fn origin(&self) -> CheckOrigin {
        self.origin
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> HostOutcome {
        self.outcome
    }

    /// Overwrite the outcome.
    pub fn set_outcome(&mut self, outcome: HostOutcome) {
        self.outcome = outcome;
    }
}
