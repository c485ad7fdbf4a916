//! Registry of every permission string the host has asked about.

use dashmap::DashSet;
use warden_core::PermissionRegistry;

/// Concurrent set of observed permission strings.
///
/// Used to offer completions and to list permissions nobody has granted.
#[derive(Debug, Default)]
pub struct KnownPermissions {
    permissions: DashSet<String>,
}

impl KnownPermissions {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `permission` has been observed (case-insensitive).
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(&permission.to_ascii_lowercase())
    }

    /// Every observed permission, sorted.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        let mut all: Vec<String> = self.permissions.iter().map(|p| p.key().clone()).collect();
        all.sort_unstable();
        all
    }

    /// Observed permissions starting with `prefix`, sorted.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_ascii_lowercase();
        let mut matching: Vec<String> = self
            .permissions
            .iter()
            .filter(|p| p.key().starts_with(&prefix))
            .map(|p| p.key().clone())
            .collect();
        matching.sort_unstable();
        matching
    }

    /// Number of distinct permissions observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl PermissionRegistry for KnownPermissions {
    fn observe(&self, permission: &str) {
        let permission = permission.trim();
        if !permission.is_empty() {
            self.permissions.insert(permission.to_ascii_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_dedupes_case_insensitively() {
        let known = KnownPermissions::new();
        known.observe("Feature.X");
        known.observe("feature.x");
        known.observe("feature.y");
        known.observe("  ");

        assert_eq!(known.len(), 2);
        assert!(known.contains("FEATURE.X"));
        assert_eq!(known.all(), vec!["feature.x", "feature.y"]);
    }

    #[test]
    fn test_prefix_filter() {
        let known = KnownPermissions::new();
        known.observe("server.stop");
        known.observe("server.kick");
        known.observe("chat.color");
        assert_eq!(known.with_prefix("server."), vec!["server.kick", "server.stop"]);
    }
}
