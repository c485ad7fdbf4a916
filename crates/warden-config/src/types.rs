//! Configuration types.
//!
//! Every struct implements [`Default`] with the production defaults so a
//! bare `[section]` header in TOML produces a working configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Admission controller settings.
    pub admission: AdmissionSection,
    /// Context cache and calculator settings.
    pub context: ContextSection,
    /// Permission check bridge settings.
    pub check: CheckSection,
    /// Logging level and format.
    pub logging: LoggingSection,
}

/// Admission controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionSection {
    /// Upper bound on waiting for platform startup during pre-login.
    pub startup_timeout_secs: u64,
    /// Log every pre-login and join at info level.
    pub debug_logins: bool,
}

impl Default for AdmissionSection {
    fn default() -> Self {
        Self {
            startup_timeout_secs: 60,
            debug_logins: false,
        }
    }
}

impl AdmissionSection {
    /// Barrier bound as a [`Duration`].
    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Context cache and calculator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    /// Write-expiry of cached query contexts, in milliseconds.
    pub cache_ttl_ms: u64,
    /// Glob patterns over calculator names; matching calculators are
    /// refused at registration.
    pub disabled_calculators: Vec<String>,
    /// Location aliases applied before contributing `location` contexts.
    pub location_rewrites: BTreeMap<String, String>,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 50,
            disabled_calculators: Vec::new(),
            location_rewrites: BTreeMap::new(),
        }
    }
}

impl ContextSection {
    /// Cache TTL as a [`Duration`].
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

/// Permission check bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSection {
    /// Number of check records retained by the verbose trail.
    pub audit_capacity: usize,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            audit_capacity: 1024,
        }
    }
}

/// Logging level, format and per-target directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level (`trace` .. `error`).
    pub level: String,
    /// Output format: `pretty`, `compact` or `json`.
    pub format: String,
    /// Extra `EnvFilter` directives such as `warden_context=trace`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directives: Vec::new(),
        }
    }
}
