//! Context calculation errors.

use thiserror::Error;
use warden_core::WardenError;

/// Errors raised by context calculators and the calculator registry.
#[derive(Debug, Error)]
pub enum CalculatorError {
    /// A calculator could not compute its contribution.
    #[error("calculation failed: {0}")]
    Failed(String),

    /// A disabled-calculator pattern does not compile.
    #[error("invalid calculator pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Offending glob.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

impl CalculatorError {
    /// Attribute this error to a named calculator.
    #[must_use]
    pub fn into_warden(self, calculator: &str) -> WardenError {
        WardenError::Calculator {
            calculator: calculator.to_string(),
            reason: self.to_string(),
        }
    }
}

/// Result type for calculator operations.
pub type CalculatorResult<T> = Result<T, CalculatorError>;
