//! Query context: the set of key/value contributions that scope a decision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single contextual contribution such as `mode=creative`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Context {
    /// Normalised (lowercase) key.
    pub key: String,
    /// Value as contributed.
    pub value: String,
}

impl Context {
    /// Build a context pair, normalising the key to lowercase.
    ///
    /// Returns `None` when either side is empty or blank.
    #[must_use]
    pub fn new(key: &str, value: &str) -> Option<Self> {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_lowercase(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An ordered set of context contributions.
///
/// A key may carry several values (a principal can be in more than one
/// region at once, for example).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextSet {
    entries: BTreeSet<Context>,
}

impl ContextSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contribution. Invalid (blank) pairs are ignored.
    ///
    /// Returns `true` if the set changed.
    pub fn add(&mut self, key: &str, value: &str) -> bool {
        match Context::new(key, value) {
            Some(context) => self.entries.insert(context),
            None => false,
        }
    }

    /// Builder-style [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.add(key, value);
        self
    }

    /// Merge every contribution of `other` into this set.
    pub fn extend(&mut self, other: &ContextSet) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Whether `key=value` is present.
    #[must_use]
    pub fn contains(&self, key: &str, value: &str) -> bool {
        Context::new(key, value).is_some_and(|c| self.entries.contains(&c))
    }

    /// Whether any value is present for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.entries.iter().any(|c| c.key == key)
    }

    /// All values recorded for `key`.
    #[must_use]
    pub fn values(&self, key: &str) -> Vec<&str> {
        let key = key.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|c| c.key == key)
            .map(|c| c.value.as_str())
            .collect()
    }

    /// Iterate over contributions in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.entries.iter()
    }

    /// Number of contributions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every contribution of `self` is also in `other`.
    #[must_use]
    pub fn is_satisfied_by(&self, other: &ContextSet) -> bool {
        self.entries.is_subset(&other.entries)
    }
}

impl fmt::Display for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, context) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{context}")?;
        }
        write!(f, "]")
    }
}
