//! Principal identity and its externally owned capability set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Well-known capability key for the principal's current mode.
pub const MODE_KEY: &str = "mode";

/// Well-known capability key for the principal's current location.
pub const LOCATION_KEY: &str = "location";

/// Unique, stable identity of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Create a random principal identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable, observable attributes of a principal (mode, location, ...).
///
/// Owned by the host. The core only reads snapshots of it when computing
/// a query context, so writers must call the context cache's
/// `signal_update` afterwards for the change to be seen before the entry
/// expires.
#[derive(Debug, Default)]
pub struct Capabilities {
    values: RwLock<BTreeMap<String, String>>,
}

impl Capabilities {
    /// Create an empty capability set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a capability value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().unwrap_or_else(|e| {
            tracing::warn!("Capabilities write lock poisoned, recovering");
            e.into_inner()
        });
        values.insert(key.into(), value.into());
    }

    /// Remove a capability, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        let mut values = self.values.write().unwrap_or_else(|e| {
            tracing::warn!("Capabilities write lock poisoned, recovering");
            e.into_inner()
        });
        values.remove(key)
    }

    /// Read a single capability value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    /// Copy out every capability currently set.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.clone()
    }
}

/// A connecting (or connected) identity the core makes decisions about.
///
/// Cheap to clone: the capability set is shared with the host.
#[derive(Debug, Clone)]
pub struct Principal {
    id: PrincipalId,
    name: String,
    locale: Option<String>,
    capabilities: Arc<Capabilities>,
}

impl Principal {
    /// Create a principal with an empty capability set.
    #[must_use]
    pub fn new(id: PrincipalId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            locale: None,
            capabilities: Arc::new(Capabilities::new()),
        }
    }

    /// Set the principal's preferred locale (e.g. `en_US`).
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Share an existing capability set with this principal.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Arc<Capabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Unique identity.
    #[must_use]
    pub fn id(&self) -> PrincipalId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Preferred locale, if the host knows it.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// The live capability set.
    #[must_use]
    pub fn capabilities(&self) -> &Arc<Capabilities> {
        &self.capabilities
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_are_shared_between_clones() {
        let principal = Principal::new(PrincipalId::new(), "alice");
        let clone = principal.clone();

        principal.capabilities().set(MODE_KEY, "creative");
        assert_eq!(
            clone.capabilities().get(MODE_KEY).as_deref(),
            Some("creative")
        );
    }

    #[test]
    fn test_capabilities_remove() {
        let caps = Capabilities::new();
        caps.set(LOCATION_KEY, "nether");
        assert_eq!(caps.remove(LOCATION_KEY).as_deref(), Some("nether"));
        assert!(caps.get(LOCATION_KEY).is_none());
        assert!(caps.snapshot().is_empty());
    }

    #[test]
    fn test_display_includes_id_and_name() {
        let id = PrincipalId::new();
        let principal = Principal::new(id, "bob").with_locale("de_DE");
        assert_eq!(principal.to_string(), format!("{id} - bob"));
        assert_eq!(principal.locale(), Some("de_DE"));
    }
}
