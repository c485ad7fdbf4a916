//! Warden Admission - the connection admission state machine.
//!
//! Drives a principal from asynchronous pre-login, where authorization
//! data is loaded, through the synchronous join, where that data must be
//! present, to disconnect, where it is released. Every denial made here
//! is fail-closed and is re-asserted by a monitor pass if another
//! collaborator reverses it.
//!
//! # Example
//!
//! ```rust,ignore
//! let controller = AdmissionController::new(store, contexts, renderer, barrier)
//!     .with_settings(AdmissionSettings::from_config(&config.admission))
//!     .with_events(bus);
//!
//! let mut attempt = ConnectionAttempt::new(principal);
//! controller.on_async_auth(&mut attempt).await;
//! // ... other collaborators ...
//! controller.on_async_auth_monitor(&mut attempt);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod barrier;
mod controller;
mod denial;
mod phase;

pub use barrier::{BarrierOutcome, StartupBarrier};
pub use controller::{
    ADMISSION_HOOK_POINTS, AdmissionController, AdmissionSettings, DEFAULT_STARTUP_TIMEOUT,
    JOIN_DENIED_DATA_GONE, JOIN_DENIED_NEVER_PROCESSED,
};
pub use denial::{ConnectedSessions, PendingDenials, Stage};
pub use phase::{PhaseTable, SessionPhase};
