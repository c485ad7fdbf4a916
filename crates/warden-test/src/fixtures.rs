//! Test fixtures for common types.

use std::sync::Arc;
use uuid::Uuid;

use warden_core::{Capabilities, Principal, PrincipalId};

/// Create a principal with a random identity and empty capabilities.
#[must_use]
pub fn test_principal(name: &str) -> Principal {
    Principal::new(PrincipalId::new(), name)
}

/// Create a principal with a fixed identity.
#[must_use]
pub fn test_principal_from(uuid: Uuid, name: &str) -> Principal {
    Principal::new(PrincipalId::from_uuid(uuid), name)
}

/// Create a principal whose capability set is pre-populated.
#[must_use]
pub fn test_principal_with(name: &str, capabilities: &[(&str, &str)]) -> Principal {
    let caps = Capabilities::new();
    for (key, value) in capabilities {
        caps.set(*key, *value);
    }
    Principal::new(PrincipalId::new(), name).with_capabilities(Arc::new(caps))
}

/// Install a test-writer subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
