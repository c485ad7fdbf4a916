//! Bounded in-memory audit trail of permission checks.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};
use tracing::{trace, warn};
use warden_config::CheckSection;
use warden_core::{AuditRecorder, CheckRecord};

/// Keeps the most recent check records, optionally only those whose
/// permission starts with a prefix.
///
/// Every accepted record is also emitted at `trace` level under the
/// `warden_check::trail` target.
#[derive(Debug)]
pub struct VerboseTrail {
    records: Mutex<VecDeque<CheckRecord>>,
    capacity: usize,
    filter: RwLock<Option<String>>,
}

impl VerboseTrail {
    /// A trail retaining at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            filter: RwLock::new(None),
        }
    }

    /// A trail sized from the `[check]` section.
    #[must_use]
    pub fn from_config(section: &CheckSection) -> Self {
        Self::new(section.audit_capacity)
    }

    /// Only keep records whose permission starts with `prefix`.
    /// `None` keeps everything.
    pub fn set_filter(&self, prefix: Option<&str>) {
        let mut filter = self.filter.write().unwrap_or_else(|e| {
            warn!("Trail filter lock poisoned, recovering");
            e.into_inner()
        });
        *filter = prefix.map(str::to_ascii_lowercase);
    }

    /// Retained records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<CheckRecord> {
        self.lock_records().iter().cloned().collect()
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    /// Whether nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained records.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every retained record.
    pub fn clear(&self) {
        self.lock_records().clear();
    }

    fn accepts(&self, permission: &str) -> bool {
        let filter = self.filter.read().unwrap_or_else(|e| {
            warn!("Trail filter lock poisoned, recovering");
            e.into_inner()
        });
        filter
            .as_deref()
            .is_none_or(|prefix| permission.to_ascii_lowercase().starts_with(prefix))
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, VecDeque<CheckRecord>> {
        self.records.lock().unwrap_or_else(|e| {
            warn!("Trail records lock poisoned, recovering");
            e.into_inner()
        })
    }
}

impl AuditRecorder for VerboseTrail {
    fn record(&self, record: &CheckRecord) {
        if !self.accepts(&record.permission) {
            return;
        }

        trace!(
            target: "warden_check::trail",
            origin = %record.origin,
            subject = %record.subject,
            permission = %record.permission,
            context = %record.context,
            result = %record.result,
            "check"
        );

        let mut records = self.lock_records();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{CheckOrigin, ContextSet, Tristate};

    fn record(permission: &str) -> CheckRecord {
        CheckRecord {
            origin: CheckOrigin::PermissionCheck,
            subject: "alice".to_string(),
            context: ContextSet::new(),
            permission: permission.to_string(),
            result: Tristate::True,
        }
    }

    #[test]
    fn test_oldest_records_are_evicted() {
        let trail = VerboseTrail::new(2);
        trail.record(&record("a"));
        trail.record(&record("b"));
        trail.record(&record("c"));

        let kept: Vec<_> = trail.records().into_iter().map(|r| r.permission).collect();
        assert_eq!(kept, vec!["b", "c"]);
    }

    #[test]
    fn test_prefix_filter() {
        let trail = VerboseTrail::new(16);
        trail.set_filter(Some("Server."));
        trail.record(&record("server.stop"));
        trail.record(&record("chat.color"));
        assert_eq!(trail.len(), 1);

        trail.set_filter(None);
        trail.record(&record("chat.color"));
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_from_config_and_zero_capacity() {
        let trail = VerboseTrail::from_config(&CheckSection::default());
        assert_eq!(trail.capacity(), 1024);
        assert_eq!(VerboseTrail::new(0).capacity(), 1);
    }
}
