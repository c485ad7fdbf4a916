//! Built-in calculator contributing `mode` and `location`.

use std::collections::BTreeMap;
use warden_core::{ContextSet, LOCATION_KEY, MODE_KEY, Principal};

use crate::calculator::ContextCalculator;
use crate::error::CalculatorResult;

/// Bound on alias-chain resolution. Cyclic rewrite tables stop here.
const MAX_REWRITE_DEPTH: usize = 16;

/// Reads `mode` and `location` from the principal's capability set.
///
/// Locations are passed through the configured rewrite table first, so an
/// alias such as `world_nether -> world` contributes `location=world`.
#[derive(Debug, Clone, Default)]
pub struct PrincipalCalculator {
    rewrites: BTreeMap<String, String>,
}

impl PrincipalCalculator {
    /// Name used for registration and disabling.
    pub const NAME: &'static str = "principal";

    /// A calculator with no location rewrites.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A calculator applying `rewrites` to locations.
    #[must_use]
    pub fn with_rewrites(rewrites: BTreeMap<String, String>) -> Self {
        Self { rewrites }
    }

    /// Resolve `location` through the rewrite table.
    #[must_use]
    pub fn resolve_location<'a>(&'a self, location: &'a str) -> &'a str {
        let mut current = location;
        for _ in 0..MAX_REWRITE_DEPTH {
            match self.rewrites.get(current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }
}

impl ContextCalculator for PrincipalCalculator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn calculate(&self, principal: &Principal, acc: &mut ContextSet) -> CalculatorResult<()> {
        let capabilities = principal.capabilities().snapshot();

        if let Some(mode) = capabilities.get(MODE_KEY) {
            acc.add(MODE_KEY, mode);
        }
        if let Some(location) = capabilities.get(LOCATION_KEY) {
            acc.add(LOCATION_KEY, self.resolve_location(location));
        }
        Ok(())
    }

    fn estimate_potential(&self) -> CalculatorResult<ContextSet> {
        let mut set = ContextSet::new();
        for target in self.rewrites.values() {
            set.add(LOCATION_KEY, self.resolve_location(target));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::PrincipalId;

    #[test]
    fn test_contributes_mode_and_location() {
        let principal = Principal::new(PrincipalId::new(), "alice");
        principal.capabilities().set(MODE_KEY, "survival");
        principal.capabilities().set(LOCATION_KEY, "world");

        let mut acc = ContextSet::new();
        PrincipalCalculator::new()
            .calculate(&principal, &mut acc)
            .unwrap();

        assert!(acc.contains("mode", "survival"));
        assert!(acc.contains("location", "world"));
    }

    #[test]
    fn test_missing_capabilities_contribute_nothing() {
        let principal = Principal::new(PrincipalId::new(), "alice");
        let mut acc = ContextSet::new();
        PrincipalCalculator::new()
            .calculate(&principal, &mut acc)
            .unwrap();
        assert!(acc.is_empty());
    }

    #[test]
    fn test_rewrites_follow_chain() {
        let rewrites = BTreeMap::from([
            ("world_the_end".to_string(), "world_nether".to_string()),
            ("world_nether".to_string(), "world".to_string()),
        ]);
        let calc = PrincipalCalculator::with_rewrites(rewrites);
        assert_eq!(calc.resolve_location("world_the_end"), "world");
        assert_eq!(calc.resolve_location("lobby"), "lobby");
    }

    #[test]
    fn test_cyclic_rewrites_terminate() {
        let rewrites = BTreeMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
        ]);
        let calc = PrincipalCalculator::with_rewrites(rewrites);
        let resolved = calc.resolve_location("a");
        assert!(resolved == "a" || resolved == "b");
    }
}
