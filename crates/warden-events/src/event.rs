//! Event types published by the Warden core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use warden_core::PrincipalId;

/// Metadata attached to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    /// Fresh metadata stamped now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Discriminant of a [`WardenEvent`], used for subscription filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// See [`WardenEvent::LoginProcessed`].
    LoginProcessed,
    /// See [`WardenEvent::ContextUpdated`].
    ContextUpdated,
    /// See [`WardenEvent::ConnectionReallowed`].
    ConnectionReallowed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginProcessed => write!(f, "login_processed"),
            Self::ContextUpdated => write!(f, "context_updated"),
            Self::ConnectionReallowed => write!(f, "connection_reallowed"),
        }
    }
}

/// Lifecycle notifications for external observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum WardenEvent {
    /// Async login processing finished for a principal.
    LoginProcessed {
        /// Event metadata.
        metadata: EventMetadata,
        /// Principal processed.
        principal: PrincipalId,
        /// Principal display name.
        name: String,
        /// Whether authorization data is now loaded.
        loaded: bool,
    },
    /// A principal's query context was invalidated.
    ContextUpdated {
        /// Event metadata.
        metadata: EventMetadata,
        /// Principal whose context changed.
        principal: PrincipalId,
    },
    /// A denial made by the core was reversed by another collaborator and
    /// re-asserted by a monitor pass.
    ConnectionReallowed {
        /// Event metadata.
        metadata: EventMetadata,
        /// Principal whose denial was reversed.
        principal: PrincipalId,
        /// Stage the override happened in (`async_auth` or `join`).
        stage: String,
    },
}

impl WardenEvent {
    /// Build a [`WardenEvent::LoginProcessed`].
    #[must_use]
    pub fn login_processed(principal: PrincipalId, name: impl Into<String>, loaded: bool) -> Self {
        Self::LoginProcessed {
            metadata: EventMetadata::new(),
            principal,
            name: name.into(),
            loaded,
        }
    }

    /// Build a [`WardenEvent::ContextUpdated`].
    #[must_use]
    pub fn context_updated(principal: PrincipalId) -> Self {
        Self::ContextUpdated {
            metadata: EventMetadata::new(),
            principal,
        }
    }

    /// Build a [`WardenEvent::ConnectionReallowed`].
    #[must_use]
    pub fn connection_reallowed(principal: PrincipalId, stage: impl Into<String>) -> Self {
        Self::ConnectionReallowed {
            metadata: EventMetadata::new(),
            principal,
            stage: stage.into(),
        }
    }

    /// The event's discriminant.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::LoginProcessed { .. } => EventKind::LoginProcessed,
            Self::ContextUpdated { .. } => EventKind::ContextUpdated,
            Self::ConnectionReallowed { .. } => EventKind::ConnectionReallowed,
        }
    }

    /// Principal the event is about.
    #[must_use]
    pub fn principal(&self) -> PrincipalId {
        match self {
            Self::LoginProcessed { principal, .. }
            | Self::ContextUpdated { principal, .. }
            | Self::ConnectionReallowed { principal, .. } => *principal,
        }
    }

    /// Event metadata.
    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::LoginProcessed { metadata, .. }
            | Self::ContextUpdated { metadata, .. }
            | Self::ConnectionReallowed { metadata, .. } => metadata,
        }
    }
}
