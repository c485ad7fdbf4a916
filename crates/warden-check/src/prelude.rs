//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_check::prelude::*;` to import all essential types.

pub use crate::{CheckBridge, KnownPermissions, VerboseTrail};
