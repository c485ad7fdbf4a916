//! Prelude module - commonly used test utilities.
//!
//! Use `use warden_test::prelude::*;` in test modules.

pub use crate::fixtures::{init_test_logging, test_principal, test_principal_with};
pub use crate::mocks::{
    CountingCalculator, GrantTable, MockDataStore, MockRenderer, RecordingAudit,
};
