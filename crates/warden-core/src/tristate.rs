//! Tri-state decisions and their mapping onto the host's outcome domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A permission decision that may carry no opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    /// Explicitly granted.
    True,
    /// Explicitly denied.
    False,
    /// No opinion.
    #[default]
    Undefined,
}

impl Tristate {
    /// Lift a plain boolean.
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }

    /// Collapse to a boolean, treating `Undefined` as denied.
    #[must_use]
    pub fn as_bool(self) -> bool {
        matches!(self, Self::True)
    }

    /// Whether the decision carries an opinion.
    #[must_use]
    pub fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// The host's own ternary outcome for a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostOutcome {
    /// Host considers the permission granted.
    True,
    /// Host considers the permission denied.
    False,
    /// Host has not decided.
    #[default]
    Unset,
}

impl fmt::Display for HostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Unset => write!(f, "unset"),
        }
    }
}

impl From<Tristate> for HostOutcome {
    fn from(value: Tristate) -> Self {
        match value {
            Tristate::True => Self::True,
            Tristate::False => Self::False,
            Tristate::Undefined => Self::Unset,
        }
    }
}

impl From<HostOutcome> for Tristate {
    fn from(value: HostOutcome) -> Self {
        match value {
            HostOutcome::True => Self::True,
            HostOutcome::False => Self::False,
            HostOutcome::Unset => Self::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_a_bijection() {
        for state in [Tristate::True, Tristate::False, Tristate::Undefined] {
            assert_eq!(Tristate::from(HostOutcome::from(state)), state);
        }
        for outcome in [HostOutcome::True, HostOutcome::False, HostOutcome::Unset] {
            assert_eq!(HostOutcome::from(Tristate::from(outcome)), outcome);
        }
    }

    #[test]
    fn test_undefined_collapses_to_denied() {
        assert!(!Tristate::Undefined.as_bool());
        assert!(!Tristate::Undefined.is_defined());
        assert!(Tristate::from_bool(true).as_bool());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Tristate::Undefined).unwrap();
        assert_eq!(json, "\"undefined\"");
        let outcome: HostOutcome = serde_json::from_str("\"unset\"").unwrap();
        assert_eq!(outcome, HostOutcome::Unset);
    }
}
