//! Pending-denial markers and the connected-session record.

use dashmap::DashSet;
use std::fmt;
use warden_core::PrincipalId;

/// Which connection stage a denial belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Asynchronous pre-login.
    AsyncAuth,
    /// Synchronous join.
    Join,
}

impl Stage {
    /// Stable label used in logs and events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AsyncAuth => "async_auth",
            Self::Join => "join",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principals whose connection this core denied and whose monitor pass
/// has not run yet.
#[derive(Debug, Default)]
pub struct PendingDenials {
    async_auth: DashSet<PrincipalId>,
    join: DashSet<PrincipalId>,
}

impl PendingDenials {
    /// Create empty marker sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, stage: Stage) -> &DashSet<PrincipalId> {
        match stage {
            Stage::AsyncAuth => &self.async_auth,
            Stage::Join => &self.join,
        }
    }

    /// Mark `id` as denied at `stage`.
    pub fn mark(&self, stage: Stage, id: PrincipalId) {
        self.set(stage).insert(id);
    }

    /// Consume the marker for `id` at `stage`. Returns whether it was set.
    pub fn take(&self, stage: Stage, id: &PrincipalId) -> bool {
        self.set(stage).remove(id).is_some()
    }

    /// Whether `id` is marked at `stage`.
    #[must_use]
    pub fn contains(&self, stage: Stage, id: &PrincipalId) -> bool {
        self.set(stage).contains(id)
    }

    /// Drop every marker for `id`.
    pub fn clear(&self, id: &PrincipalId) {
        self.async_auth.remove(id);
        self.join.remove(id);
    }
}

/// Every principal whose pre-login this process has completed successfully,
/// regardless of whether they are still connected.
///
/// Only used to tell "never processed" apart from "processed but data
/// missing" when a join is denied.
#[derive(Debug, Default)]
pub struct ConnectedSessions {
    seen: DashSet<PrincipalId>,
}

impl ConnectedSessions {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that `id` completed pre-login.
    pub fn record(&self, id: PrincipalId) {
        self.seen.insert(id);
    }

    /// Whether `id` ever completed pre-login in this process.
    #[must_use]
    pub fn contains(&self, id: &PrincipalId) -> bool {
        self.seen.contains(id)
    }

    /// Number of distinct principals recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
