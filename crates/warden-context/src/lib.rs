//! Warden Context - short-lived per-principal query contexts.
//!
//! Permission lookups are evaluated under a *query context*: the set of
//! key/value attributes (mode, location, ...) that scope a decision.
//! Computing it means asking every registered [`ContextCalculator`], so the
//! result is cached per principal for a few tens of milliseconds.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_config::ContextSection;
//! use warden_context::ContextCache;
//! use warden_core::{Principal, PrincipalId, MODE_KEY};
//!
//! let cache = ContextCache::from_config(&ContextSection::default()).unwrap();
//! let alice = Principal::new(PrincipalId::new(), "alice");
//! alice.capabilities().set(MODE_KEY, "creative");
//!
//! assert!(cache.get(&alice).contains("mode", "creative"));
//!
//! alice.capabilities().set(MODE_KEY, "survival");
//! cache.signal_update(&alice);
//! assert!(cache.get(&alice).contains("mode", "survival"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod cache;
mod calculator;
mod error;
mod principal_calc;

pub use cache::{ContextCache, DEFAULT_CACHE_TTL};
pub use calculator::{CalculatorRegistry, ContextCalculator};
pub use error::{CalculatorError, CalculatorResult};
pub use principal_calc::PrincipalCalculator;
