//! Relative handler priorities and a minimal ordered dispatcher.
//!
//! Hosts drive every handler from their own event dispatch. The order in
//! which handlers see an event is part of the contract: denials are made
//! early, enforcement and cleanup happen in the monitor slot after every
//! other collaborator has run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative position of a handler within one host event. Lower runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Before everything else.
    First,
    /// Before most collaborators.
    Early,
    /// Default slot.
    Normal,
    /// After most collaborators.
    Late,
    /// Observation and enforcement only; runs after all others.
    Monitor,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Early => write!(f, "early"),
            Self::Normal => write!(f, "normal"),
            Self::Late => write!(f, "late"),
            Self::Monitor => write!(f, "monitor"),
        }
    }
}

/// Host events the core listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// Asynchronous pre-login authorization.
    AsyncAuth,
    /// Synchronous join finalization.
    Join,
    /// Disconnect.
    Quit,
    /// Ad-hoc permission query.
    PermissionCheck,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsyncAuth => write!(f, "async_auth"),
            Self::Join => write!(f, "join"),
            Self::Quit => write!(f, "quit"),
            Self::PermissionCheck => write!(f, "permission_check"),
        }
    }
}

/// Declaration of where a named handler must be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPoint {
    /// Event the handler listens to.
    pub event: HookEvent,
    /// Required relative priority.
    pub priority: Priority,
    /// Handler name (matches the method name).
    pub handler: &'static str,
}

impl HookPoint {
    /// Declare a hook point.
    #[must_use]
    pub const fn new(event: HookEvent, priority: Priority, handler: &'static str) -> Self {
        Self {
            event,
            priority,
            handler,
        }
    }
}

type Handler<E> = Box<dyn Fn(&mut E) + Send + Sync>;

struct Registration<E> {
    name: String,
    priority: Priority,
    handler: Handler<E>,
}

/// Runs synchronous handlers for one event type in priority order.
///
/// Handlers at the same priority run in registration order.
pub struct Dispatcher<E> {
    registrations: Vec<Registration<E>>,
}

impl<E> Dispatcher<E> {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Register a handler at `priority`.
    pub fn register<F>(&mut self, name: impl Into<String>, priority: Priority, handler: F)
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.registrations.push(Registration {
            name: name.into(),
            priority,
            handler: Box::new(handler),
        });
        // Stable sort keeps registration order within a priority.
        self.registrations.sort_by_key(|r| r.priority);
    }

    /// Deliver `event` to every handler in order.
    pub fn dispatch(&self, event: &mut E) {
        for registration in &self.registrations {
            tracing::trace!(
                handler = %registration.name,
                priority = %registration.priority,
                "dispatching"
            );
            (registration.handler)(event);
        }
    }

    /// Handler names in execution order.
    #[must_use]
    pub fn order(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.name.as_str()).collect()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl<E> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.order())
            .finish()
    }
}
