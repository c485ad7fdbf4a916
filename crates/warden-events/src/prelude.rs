//! Prelude module - commonly used types for convenient import.

pub use crate::{EventBus, EventKind, EventMetadata, EventReceiver, WardenEvent};
