//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_context::prelude::*;` to import all essential types.

pub use crate::{
    CalculatorError, CalculatorRegistry, CalculatorResult, ContextCache, ContextCalculator,
    PrincipalCalculator,
};
