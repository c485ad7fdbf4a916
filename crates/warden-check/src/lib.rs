//! Warden Check - answers host permission queries from loaded data.
//!
//! The [`CheckBridge`] sits between the host's permission-check event and
//! each principal's loaded authorization data. It converts between the
//! core's tri-state answers and the host's outcome domain, never letting
//! "no opinion" overwrite a host decision.
//!
//! Two default collaborators are provided: [`KnownPermissions`] collects
//! every permission string seen, and [`VerboseTrail`] keeps a bounded
//! record of recent checks.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bridge;
mod known;
mod trail;

pub use bridge::{CHECK_HOOK_POINTS, CheckBridge};
pub use known::KnownPermissions;
pub use trail::VerboseTrail;
