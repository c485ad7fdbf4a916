//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{WardenError, WardenResult};

// Identity and context
pub use crate::{Capabilities, ContextSet, Principal, PrincipalId};

// Decisions
pub use crate::{HostOutcome, Tristate};

// Events
pub use crate::{CheckOrigin, CheckSubject, ConnectionAttempt, PermissionCheck};

// Collaborators
pub use crate::{
    AuditRecorder, AuthorizationData, CheckRecord, DataHandle, DataStore, PermissionRegistry,
    Reason, ReasonRenderer,
};

// Ordering
pub use crate::{Dispatcher, HookEvent, HookPoint, Priority};
