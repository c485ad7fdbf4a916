//! Startup barrier gating pre-login processing.

use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of waiting on the [`StartupBarrier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// Startup finished before the deadline.
    Ready,
    /// The deadline passed first. Callers proceed anyway.
    TimedOut,
    /// The barrier was cancelled (shutdown). Callers proceed anyway.
    Cancelled,
}

/// Opens once platform startup completes.
///
/// Pre-logins that arrive during startup wait here so they do not race
/// storage initialization. Waiting is bounded; the barrier never blocks
/// admission forever.
#[derive(Debug)]
pub struct StartupBarrier {
    ready: watch::Sender<bool>,
    cancel: CancellationToken,
}

impl StartupBarrier {
    /// A closed barrier.
    #[must_use]
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            ready,
            cancel: CancellationToken::new(),
        }
    }

    /// A barrier that is already open.
    #[must_use]
    pub fn ready() -> Self {
        let barrier = Self::new();
        barrier.mark_ready();
        barrier
    }

    /// Open the barrier, waking every waiter.
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
        debug!("Startup barrier opened");
    }

    /// Whether the barrier is open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Release every current and future waiter with
    /// [`BarrierOutcome::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the barrier opens, at most `timeout`.
    pub async fn await_ready(&self, timeout: Duration) -> BarrierOutcome {
        let mut rx = self.ready.subscribe();
        tokio::select! {
            () = self.cancel.cancelled() => BarrierOutcome::Cancelled,
            waited = tokio::time::timeout(timeout, rx.wait_for(|ready| *ready)) => match waited {
                Ok(Ok(_)) => BarrierOutcome::Ready,
                Ok(Err(_)) => BarrierOutcome::Cancelled,
                Err(_) => BarrierOutcome::TimedOut,
            },
        }
    }
}

impl Default for StartupBarrier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_open_barrier_returns_immediately() {
        let barrier = StartupBarrier::ready();
        assert_eq!(
            barrier.await_ready(Duration::from_secs(60)).await,
            BarrierOutcome::Ready
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_barrier_times_out() {
        let barrier = StartupBarrier::new();
        assert_eq!(
            barrier.await_ready(Duration::from_secs(60)).await,
            BarrierOutcome::TimedOut
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_wakes_on_ready() {
        let barrier = Arc::new(StartupBarrier::new());
        let waiter = {
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move { barrier.await_ready(Duration::from_secs(60)).await })
        };

        tokio::time::sleep(Duration::from_secs(5)).await;
        barrier.mark_ready();
        assert_eq!(waiter.await.unwrap(), BarrierOutcome::Ready);
        assert!(barrier.is_ready());
    }

    #[tokio::test]
    async fn test_cancel_releases_waiters() {
        let barrier = StartupBarrier::new();
        barrier.cancel();
        assert_eq!(
            barrier.await_ready(Duration::from_secs(60)).await,
            BarrierOutcome::Cancelled
        );
    }
}
