//! Per-principal session phases.

use dashmap::DashMap;
use std::fmt;
use warden_core::{PrincipalId, WardenError, WardenResult};

/// Where a principal's connection currently stands.
///
/// ```text
/// AsyncProcessing -> {AsyncAllowed, AsyncDenied}
///      -> JoinPending -> {JoinAllowed, JoinDenied} -> Disconnected
/// ```
///
/// A principal with no entry has not been seen in pre-login, or its
/// session has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Pre-login running: waiting on startup or the loader.
    AsyncProcessing,
    /// Data loaded during pre-login.
    AsyncAllowed,
    /// Pre-login denied (by the host or by a load failure).
    AsyncDenied,
    /// Join observed, decision pending.
    JoinPending,
    /// Join allowed with data present.
    JoinAllowed,
    /// Join denied for missing data.
    JoinDenied,
    /// Quit observed.
    Disconnected,
}

impl SessionPhase {
    /// Whether `next` is a legal forward step from `self`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use SessionPhase::{
            AsyncAllowed, AsyncDenied, AsyncProcessing, Disconnected, JoinAllowed, JoinDenied,
            JoinPending,
        };
        match (self, next) {
            (Disconnected, _) => false,
            (_, Disconnected)
            | (AsyncProcessing, AsyncAllowed | AsyncDenied)
            | (AsyncAllowed | AsyncDenied, JoinPending)
            | (JoinPending, JoinAllowed | JoinDenied) => true,
            _ => false,
        }
    }

    /// Whether pre-login has finished, one way or the other.
    #[must_use]
    pub fn async_completed(self) -> bool {
        !matches!(self, Self::AsyncProcessing)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AsyncProcessing => "async_processing",
            Self::AsyncAllowed => "async_allowed",
            Self::AsyncDenied => "async_denied",
            Self::JoinPending => "join_pending",
            Self::JoinAllowed => "join_allowed",
            Self::JoinDenied => "join_denied",
            Self::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Concurrent map of principal to current phase.
///
/// Only forward transitions are accepted. Principals with no entry are
/// left alone: a join for someone never seen in pre-login records nothing.
#[derive(Debug, Default)]
pub struct PhaseTable {
    phases: DashMap<PrincipalId, SessionPhase>,
}

impl PhaseTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh pre-login for `id`, replacing any previous entry.
    pub fn begin(&self, id: PrincipalId) {
        self.phases.insert(id, SessionPhase::AsyncProcessing);
    }

    /// Move `id` to `next`.
    ///
    /// Returns `Ok(false)` if `id` has no entry.
    ///
    /// # Errors
    ///
    /// Returns [`WardenError::InvalidTransition`] for a backwards or
    /// skipping step. The entry is left unchanged.
    pub fn advance(&self, id: PrincipalId, next: SessionPhase) -> WardenResult<bool> {
        let Some(mut entry) = self.phases.get_mut(&id) else {
            return Ok(false);
        };
        let current = *entry;
        if !current.can_advance_to(next) {
            return Err(WardenError::InvalidTransition {
                principal: id,
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        *entry = next;
        Ok(true)
    }

    /// Current phase of `id`.
    #[must_use]
    pub fn get(&self, id: &PrincipalId) -> Option<SessionPhase> {
        self.phases.get(id).map(|p| *p)
    }

    /// Drop the entry for `id`.
    pub fn remove(&self, id: &PrincipalId) -> Option<SessionPhase> {
        self.phases.remove(id).map(|(_, phase)| phase)
    }

    /// Drop the entry for `id` only while it is still `expected`.
    ///
    /// A fresh [`begin`](Self::begin) from a reconnect is left in place.
    pub fn remove_if(&self, id: &PrincipalId, expected: SessionPhase) -> bool {
        self.phases
            .remove_if(id, |_, phase| *phase == expected)
            .is_some()
    }

    /// Number of tracked principals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether no principal is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}
