//! Warden Events - lifecycle notifications for external observers.
//!
//! The admission controller and the context cache publish to an
//! [`EventBus`]; hosts subscribe to learn when login processing finished
//! (with or without data) or when a principal's context changed.
//!
//! # Example
//!
//! ```rust
//! use warden_core::PrincipalId;
//! use warden_events::{EventBus, EventKind, WardenEvent};
//!
//! # async fn example() {
//! let bus = EventBus::new();
//! let mut receiver = bus.subscribe_kind(EventKind::ContextUpdated);
//!
//! bus.publish(WardenEvent::context_updated(PrincipalId::new()));
//!
//! let event = receiver.recv().await.unwrap();
//! assert_eq!(event.kind(), EventKind::ContextUpdated);
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod event;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventReceiver};
pub use event::{EventKind, EventMetadata, WardenEvent};
