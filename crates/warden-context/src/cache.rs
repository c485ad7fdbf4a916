//! Per-principal query context cache.

use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use warden_config::ContextSection;
use warden_core::{ContextSet, Principal, PrincipalId};
use warden_events::{EventBus, WardenEvent};

use crate::calculator::{CalculatorRegistry, ContextCalculator};
use crate::error::CalculatorResult;
use crate::principal_calc::PrincipalCalculator;

/// Default write-expiry of a cached context.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(50);

/// Short-lived cache of computed query contexts, keyed by principal.
///
/// Entries expire a fixed time after they are written and are recomputed
/// lazily on the next access; there is no background sweep. Concurrent
/// misses for the same principal share a single computation.
#[derive(Clone)]
pub struct ContextCache {
    entries: Cache<PrincipalId, Arc<ContextSet>>,
    registry: Arc<CalculatorRegistry>,
    events: Option<EventBus>,
    ttl: Duration,
}

impl ContextCache {
    /// A cache over `registry` with the given write-expiry.
    #[must_use]
    pub fn new(registry: Arc<CalculatorRegistry>, ttl: Duration) -> Self {
        let entries = Cache::builder().time_to_live(ttl).build();
        Self {
            entries,
            registry,
            events: None,
            ttl,
        }
    }

    /// Build a cache from the `[context]` section, with the built-in
    /// principal calculator registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a disabled-calculator pattern does not compile.
    pub fn from_config(section: &ContextSection) -> CalculatorResult<Self> {
        let registry = CalculatorRegistry::with_disabled(section.disabled_calculators.as_slice())?;
        registry.register(Arc::new(PrincipalCalculator::with_rewrites(
            section.location_rewrites.clone(),
        )));
        Ok(Self::new(Arc::new(registry), section.cache_ttl()))
    }

    /// Publish [`WardenEvent::ContextUpdated`] on `bus` from
    /// [`signal_update`](Self::signal_update).
    #[must_use]
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// The context for `principal`, computed on a miss.
    ///
    /// Never blocks on I/O. A miss runs every registered calculator on the
    /// calling thread; other callers missing on the same principal wait for
    /// that result instead of computing their own.
    #[must_use]
    pub fn get(&self, principal: &Principal) -> Arc<ContextSet> {
        let id = principal.id();
        self.entries.get_with(id, || {
            let computed = self.registry.calculate(principal);
            trace!(principal = %id, context = %computed, "Computed query context");
            Arc::new(computed)
        })
    }

    /// Drop the cached context for `id`. The next [`get`](Self::get)
    /// recomputes.
    pub fn invalidate(&self, id: &PrincipalId) {
        self.entries.invalidate(id);
        trace!(principal = %id, "Invalidated query context");
    }

    /// Tell the cache that `principal`'s capabilities changed.
    ///
    /// Invalidates the entry, then notifies event subscribers.
    pub fn signal_update(&self, principal: &Principal) {
        self.invalidate(&principal.id());
        if let Some(bus) = &self.events {
            bus.publish(WardenEvent::context_updated(principal.id()));
        }
        debug!(principal = %principal.id(), "Capability change signalled");
    }

    /// Every context any registered calculator could contribute.
    #[must_use]
    pub fn potential_contexts(&self) -> ContextSet {
        self.registry.potential()
    }

    /// Register a calculator ahead of the existing ones.
    ///
    /// Cached entries are not recomputed until they expire or are
    /// invalidated. Returns `false` if the name is disabled.
    pub fn register_calculator(&self, calculator: Arc<dyn ContextCalculator>) -> bool {
        self.registry.register(calculator)
    }

    /// Remove a calculator by name.
    pub fn unregister_calculator(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    /// The calculator registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<CalculatorRegistry> {
        &self.registry
    }

    /// Configured write-expiry.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextCache")
            .field("ttl", &self.ttl)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use warden_core::LOCATION_KEY;

    /// Counts invocations and optionally sleeps to widen the miss window.
    struct Counting {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl Counting {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ContextCalculator for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn calculate(&self, _principal: &Principal, acc: &mut ContextSet) -> CalculatorResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            acc.add("server", "lobby");
            Ok(())
        }
    }

    fn cache_with(calc: Arc<Counting>, ttl: Duration) -> ContextCache {
        let registry = Arc::new(CalculatorRegistry::new());
        registry.register(calc);
        ContextCache::new(registry, ttl)
    }

    #[test]
    fn test_reuse_within_ttl() {
        let calc = Counting::new(Duration::ZERO);
        let cache = cache_with(Arc::clone(&calc), Duration::from_secs(60));
        let principal = Principal::new(PrincipalId::new(), "alice");

        let first = cache.get(&principal);
        let second = cache.get(&principal);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calc.calls(), 1);
    }

    #[test]
    fn test_recomputes_after_ttl() {
        let calc = Counting::new(Duration::ZERO);
        let cache = cache_with(Arc::clone(&calc), Duration::from_millis(20));
        let principal = Principal::new(PrincipalId::new(), "alice");

        let _ = cache.get(&principal);
        std::thread::sleep(Duration::from_millis(60));
        let _ = cache.get(&principal);

        assert_eq!(calc.calls(), 2);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let calc = Counting::new(Duration::ZERO);
        let cache = cache_with(Arc::clone(&calc), Duration::from_secs(60));
        let principal = Principal::new(PrincipalId::new(), "alice");

        let _ = cache.get(&principal);
        cache.invalidate(&principal.id());
        let _ = cache.get(&principal);

        assert_eq!(calc.calls(), 2);
    }

    #[test]
    fn test_concurrent_misses_compute_once() {
        let calc = Counting::new(Duration::from_millis(100));
        let cache = cache_with(Arc::clone(&calc), Duration::from_secs(60));
        let principal = Principal::new(PrincipalId::new(), "alice");
        let start = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let principal = principal.clone();
                let start = Arc::clone(&start);
                std::thread::spawn(move || {
                    start.wait();
                    cache.get(&principal)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calc.calls(), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_from_config_registers_principal_calculator() {
        let mut section = ContextSection::default();
        section
            .location_rewrites
            .insert("world_nether".to_string(), "world".to_string());
        let cache = ContextCache::from_config(&section).unwrap();
        assert_eq!(cache.registry().names(), vec![PrincipalCalculator::NAME]);
        assert_eq!(cache.ttl(), DEFAULT_CACHE_TTL);

        let principal = Principal::new(PrincipalId::new(), "alice");
        principal.capabilities().set(LOCATION_KEY, "world_nether");
        assert!(cache.get(&principal).contains("location", "world"));
        assert!(cache.potential_contexts().contains("location", "world"));
    }

    #[test]
    fn test_disabled_principal_calculator() {
        let section = ContextSection {
            disabled_calculators: vec!["princ*".to_string()],
            ..ContextSection::default()
        };
        let cache = ContextCache::from_config(&section).unwrap();
        assert!(cache.registry().is_empty());
    }

    #[tokio::test]
    async fn test_signal_update_publishes_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let calc = Counting::new(Duration::ZERO);
        let cache = cache_with(Arc::clone(&calc), Duration::from_secs(60)).with_events(bus);
        let principal = Principal::new(PrincipalId::new(), "alice");

        let _ = cache.get(&principal);
        cache.signal_update(&principal);
        let _ = cache.get(&principal);

        assert_eq!(calc.calls(), 2);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.principal(), principal.id());
    }
}
