//! Context calculators and the ordered registry that runs them.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use warden_core::{ContextSet, Principal};

use crate::error::{CalculatorError, CalculatorResult};

/// Contributes key/value pairs to a principal's query context.
///
/// Calculators run on the host's synchronous path, so they must be cheap
/// and must not block.
pub trait ContextCalculator: Send + Sync {
    /// Stable name, matched against `disabled_calculators` globs.
    fn name(&self) -> &str;

    /// Add this calculator's contributions for `principal` to `acc`.
    ///
    /// # Errors
    ///
    /// A failure is logged and the calculator is skipped for this pass.
    fn calculate(&self, principal: &Principal, acc: &mut ContextSet) -> CalculatorResult<()>;

    /// Every context this calculator could plausibly contribute.
    ///
    /// # Errors
    ///
    /// A failure is logged and the estimator is skipped.
    fn estimate_potential(&self) -> CalculatorResult<ContextSet> {
        Ok(ContextSet::new())
    }
}

/// Ordered set of calculators.
///
/// Later registrations run first, so a calculator added by an extension
/// sees an accumulator the built-ins have not touched yet.
pub struct CalculatorRegistry {
    calculators: RwLock<Vec<Arc<dyn ContextCalculator>>>,
    disabled: GlobSet,
}

impl CalculatorRegistry {
    /// A registry with nothing disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calculators: RwLock::new(Vec::new()),
            disabled: GlobSet::empty(),
        }
    }

    /// A registry that refuses calculators whose name matches any pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::InvalidPattern`] if a glob does not compile.
    pub fn with_disabled<S: AsRef<str>>(patterns: &[S]) -> CalculatorResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| CalculatorError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }
        let disabled = builder.build().map_err(|e| CalculatorError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<&str>>()
                .join(","),
            reason: e.to_string(),
        })?;

        Ok(Self {
            calculators: RwLock::new(Vec::new()),
            disabled,
        })
    }

    /// Register a calculator ahead of the existing ones.
    ///
    /// Returns `false` if the name is disabled by configuration.
    pub fn register(&self, calculator: Arc<dyn ContextCalculator>) -> bool {
        let name = calculator.name().to_string();
        if self.disabled.is_match(&name) {
            info!(calculator = %name, "Calculator disabled by configuration, not registering");
            return false;
        }

        let mut calculators = self.calculators.write().unwrap_or_else(|e| {
            warn!("Calculator registry lock poisoned, recovering");
            e.into_inner()
        });
        calculators.insert(0, calculator);
        debug!(calculator = %name, total = calculators.len(), "Registered context calculator");
        true
    }

    /// Remove every calculator with `name`. Returns whether any was removed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut calculators = self.calculators.write().unwrap_or_else(|e| {
            warn!("Calculator registry lock poisoned, recovering");
            e.into_inner()
        });
        let before = calculators.len();
        calculators.retain(|c| c.name() != name);
        before != calculators.len()
    }

    /// Registered names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Number of registered calculators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether no calculator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every calculator against `principal`.
    ///
    /// The lock is released before any calculator runs, so calculators may
    /// register or unregister others without deadlocking.
    #[must_use]
    pub fn calculate(&self, principal: &Principal) -> ContextSet {
        let mut acc = ContextSet::new();
        for calculator in self.snapshot() {
            if let Err(e) = calculator.calculate(principal, &mut acc) {
                let err = e.into_warden(calculator.name());
                warn!(
                    principal = %principal.id(),
                    error = %err,
                    "Context calculator failed, skipping"
                );
            }
        }
        acc
    }

    /// Union of every calculator's potential contexts.
    #[must_use]
    pub fn potential(&self) -> ContextSet {
        let mut acc = ContextSet::new();
        for calculator in self.snapshot() {
            match calculator.estimate_potential() {
                Ok(set) => acc.extend(&set),
                Err(e) => {
                    let err = e.into_warden(calculator.name());
                    warn!(error = %err, "Context estimator failed, skipping");
                },
            }
        }
        acc
    }

    fn snapshot(&self) -> Vec<Arc<dyn ContextCalculator>> {
        self.calculators
            .read()
            .unwrap_or_else(|e| {
                warn!("Calculator registry lock poisoned, recovering");
                e.into_inner()
            })
            .clone()
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CalculatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorRegistry")
            .field("calculators", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::PrincipalId;

    struct Fixed {
        name: &'static str,
        key: &'static str,
        value: &'static str,
    }

    impl ContextCalculator for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn calculate(&self, _principal: &Principal, acc: &mut ContextSet) -> CalculatorResult<()> {
            acc.add(self.key, self.value);
            Ok(())
        }

        fn estimate_potential(&self) -> CalculatorResult<ContextSet> {
            Ok(ContextSet::new().with(self.key, self.value))
        }
    }

    struct Broken;

    impl ContextCalculator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn calculate(&self, _principal: &Principal, _acc: &mut ContextSet) -> CalculatorResult<()> {
            Err(CalculatorError::Failed("no backend".to_string()))
        }

        fn estimate_potential(&self) -> CalculatorResult<ContextSet> {
            Err(CalculatorError::Failed("no backend".to_string()))
        }
    }

    fn fixed(name: &'static str, key: &'static str, value: &'static str) -> Arc<Fixed> {
        Arc::new(Fixed { name, key, value })
    }

    #[test]
    fn test_later_registrations_run_first() {
        let registry = CalculatorRegistry::new();
        registry.register(fixed("a", "server", "lobby"));
        registry.register(fixed("b", "region", "eu"));
        assert_eq!(registry.names(), vec!["b", "a"]);
    }

    #[test]
    fn test_disabled_glob_refuses_registration() {
        let registry = CalculatorRegistry::with_disabled(&["weather*"]).unwrap();
        assert!(!registry.register(fixed("weather-sync", "weather", "rain")));
        assert!(registry.register(fixed("server", "server", "lobby")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = CalculatorRegistry::with_disabled(&["weather["]).unwrap_err();
        assert!(matches!(err, CalculatorError::InvalidPattern { .. }));
    }

    #[test]
    fn test_failing_calculator_is_skipped() {
        let registry = CalculatorRegistry::new();
        registry.register(fixed("server", "server", "lobby"));
        registry.register(Arc::new(Broken));

        let principal = Principal::new(PrincipalId::new(), "alice");
        let set = registry.calculate(&principal);
        assert!(set.contains("server", "lobby"));
        assert_eq!(set.len(), 1);

        let potential = registry.potential();
        assert!(potential.contains("server", "lobby"));
    }

    #[test]
    fn test_unregister() {
        let registry = CalculatorRegistry::new();
        registry.register(fixed("server", "server", "lobby"));
        assert!(registry.unregister("server"));
        assert!(!registry.unregister("server"));
        assert!(registry.is_empty());
    }
}
