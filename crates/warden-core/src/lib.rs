//! Warden Core - shared types and collaborator traits.
//!
//! This crate provides:
//! - Principal identity and its host-owned capability set
//! - Query contexts ([`ContextSet`])
//! - The tri-state decision domain and its host mapping
//! - Connection attempts and permission checks as seen by handlers
//! - Collaborator traits (data store, renderer, audit, registry)
//! - Handler priorities and an ordered [`Dispatcher`]
//! - The error kinds every component reports through

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod attempt;
pub mod context;
pub mod error;
pub mod principal;
pub mod priority;
pub mod traits;
pub mod tristate;

pub use attempt::{CheckOrigin, CheckSubject, ConnectionAttempt, PermissionCheck};
pub use context::{Context, ContextSet};
pub use error::{WardenError, WardenResult};
pub use principal::{Capabilities, LOCATION_KEY, MODE_KEY, Principal, PrincipalId};
pub use priority::{Dispatcher, HookEvent, HookPoint, Priority};
pub use traits::{
    AuditRecorder, AuthorizationData, CheckRecord, DataHandle, DataStore, PermissionRegistry,
    Reason, ReasonRenderer,
};
pub use tristate::{HostOutcome, Tristate};
