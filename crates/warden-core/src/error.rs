//! Error kinds shared by the admission, context and check components.
//!
//! None of these ever reach the host: each component handles them
//! locally and reaches a terminal decision. They exist so that log lines
//! and loader results carry a typed, greppable cause.

use thiserror::Error;

use crate::principal::PrincipalId;

/// Errors raised inside the Warden core.
#[derive(Debug, Error)]
pub enum WardenError {
    /// The startup barrier did not open in time. Non-fatal.
    #[error("startup barrier not ready after {waited_ms}ms, proceeding")]
    InitializationTimeout {
        /// How long the caller waited, in milliseconds.
        waited_ms: u64,
    },

    /// The external loader failed for a principal.
    #[error("failed to load authorization data for {principal}: {reason}")]
    DataLoad {
        /// Principal whose data could not be loaded.
        principal: PrincipalId,
        /// Loader-supplied reason.
        reason: String,
    },

    /// Authorization data was expected but absent.
    #[error("no authorization data loaded for {principal} during {stage}")]
    IntegrityViolation {
        /// Principal missing data.
        principal: PrincipalId,
        /// Where the absence was observed (`join`, `check`, ...).
        stage: &'static str,
    },

    /// Another collaborator reversed a denial made by this core.
    #[error("connection for {principal} was re-allowed after denial during {stage}")]
    UnauthorizedOverride {
        /// Principal whose denial was reversed.
        principal: PrincipalId,
        /// Which event the override happened on.
        stage: &'static str,
    },

    /// A session phase transition that would revisit or skip a phase.
    #[error("invalid phase transition for {principal}: {from} -> {to}")]
    InvalidTransition {
        /// Principal whose session was being advanced.
        principal: PrincipalId,
        /// Current phase.
        from: String,
        /// Requested phase.
        to: String,
    },

    /// A context calculator failed.
    #[error("context calculator {calculator} failed: {reason}")]
    Calculator {
        /// Calculator name.
        calculator: String,
        /// Failure description.
        reason: String,
    },
}

impl WardenError {
    /// Convenience constructor for loader failures.
    #[must_use]
    pub fn data_load(principal: PrincipalId, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            principal,
            reason: reason.into(),
        }
    }
}

/// Result type for Warden operations.
pub type WardenResult<T> = Result<T, WardenError>;
