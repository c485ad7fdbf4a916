#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for the Warden admission core.
//!
//! # Usage
//!
//! ```rust,no_run
//! use warden_config::Config;
//!
//! let config = Config::load(None, None).unwrap();
//! println!("context ttl: {:?}", config.context.cache_ttl());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit file** passed by the host
//! 2. **User** (`$WARDEN_HOME/config.toml` or the platform config dir)
//! 3. **System** (`/etc/warden/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other warden crates. Conversion into
//! component settings happens where each component is constructed.

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration with full precedence.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any layer is malformed or the merged
    /// result is invalid.
    pub fn load(
        home_override: Option<&std::path::Path>,
        explicit: Option<&std::path::Path>,
    ) -> ConfigResult<Self> {
        loader::load(home_override, explicit)
    }

    /// Parse a TOML document on top of the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document is malformed or invalid.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        loader::parse(content, "<inline>")
    }
}
