//! Collaborator traits the core consumes but does not implement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::attempt::CheckOrigin;
use crate::context::ContextSet;
use crate::error::WardenResult;
use crate::principal::{Principal, PrincipalId};
use crate::tristate::Tristate;

/// Loaded authorization data for one principal.
///
/// Opaque to the core: the only question asked of it is a permission
/// lookup under a query context.
pub trait AuthorizationData: Send + Sync + fmt::Debug {
    /// Evaluate `permission` under `context`.
    fn check_permission(&self, permission: &str, context: &ContextSet) -> Tristate;
}

/// Shared handle to loaded authorization data.
pub type DataHandle = Arc<dyn AuthorizationData>;

/// Loads, exposes and releases authorization data.
///
/// The store owns the data. The core keeps no copy beyond the handle it
/// gets back from [`get_if_loaded`](Self::get_if_loaded).
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Load (or reload) data for `principal`. May perform I/O.
    ///
    /// # Errors
    ///
    /// Returns [`WardenError::DataLoad`](crate::WardenError::DataLoad) if the
    /// data cannot be loaded.
    async fn load(&self, principal: &Principal) -> WardenResult<DataHandle>;

    /// The currently loaded data for `id`, if any. Must not block.
    fn get_if_loaded(&self, id: &PrincipalId) -> Option<DataHandle>;

    /// Release the data for `id`.
    fn unload(&self, id: &PrincipalId);
}

/// Templates for displayable denial reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Authorization data could not be loaded during pre-login.
    DataLoadFailed,
    /// Authorization data was missing when the principal joined.
    StateError,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataLoadFailed => write!(f, "data_load_failed"),
            Self::StateError => write!(f, "state_error"),
        }
    }
}

/// Renders reason templates into displayable text.
pub trait ReasonRenderer: Send + Sync {
    /// Render `reason` for `locale` (host default when `None`).
    fn render(&self, reason: Reason, locale: Option<&str>) -> String;
}

/// One permission check as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Host surface the check came from.
    pub origin: CheckOrigin,
    /// Display name of the subject.
    pub subject: String,
    /// Context the check was evaluated under.
    pub context: ContextSet,
    /// Permission string.
    pub permission: String,
    /// Final result.
    pub result: Tristate,
}

/// Receives permission-check records for diagnostics.
pub trait AuditRecorder: Send + Sync {
    /// Record a completed check.
    fn record(&self, record: &CheckRecord);
}

/// Collects every permission string the host has asked about.
pub trait PermissionRegistry: Send + Sync {
    /// Note that `permission` was checked.
    fn observe(&self, permission: &str);
}
