//! Warden Test - shared test utilities for the Warden crates.
//!
//! Mock collaborators and fixtures used as a dev-dependency by the
//! component crates and the integration tests.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! warden-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use warden_test::{GrantTable, MockDataStore, test_principal};
//!
//! #[tokio::test]
//! async fn loads_grants() {
//!     let alice = test_principal("alice");
//!     let store = MockDataStore::new()
//!         .with_grants(alice.id(), GrantTable::new().grant("feature.x"));
//!     store.load(&alice).await.unwrap();
//!     assert!(store.is_loaded(&alice.id()));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
