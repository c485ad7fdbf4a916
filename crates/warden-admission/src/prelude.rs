//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_admission::prelude::*;` to import all essential types.

pub use crate::{
    AdmissionController, AdmissionSettings, BarrierOutcome, SessionPhase, Stage, StartupBarrier,
};
