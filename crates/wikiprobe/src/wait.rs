//! Wait policy for auto-waiting queries, actions and expectations.
//!
//! Every blocking operation on a page polls with a [`WaitPolicy`] until the
//! condition holds or the timeout elapses. There is no retry beyond the
//! timeout; retrying whole scenarios is the runner's job.
//!
//! ## Toyota Way Application
//!
//! - **Heijunka**: Consistent polling intervals for predictable test timing
//! - **Jidoka**: Fail with the last observation once the budget is spent

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT POLICY
// =============================================================================

/// Maximum duration and poll interval for a wait-bound operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Total time budget
    pub timeout: Duration,
    /// Delay between attempts
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::from_millis(DEFAULT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS)
    }
}

impl WaitPolicy {
    /// Create a policy from durations
    #[must_use]
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Create a policy from milliseconds
    #[must_use]
    pub const fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(poll_interval_ms),
        )
    }

    /// Short timeout, fast polling (synthetic backends)
    #[must_use]
    pub const fn fast() -> Self {
        Self::from_millis(500, 10)
    }

    /// Long timeout, slower polling (slow networks)
    #[must_use]
    pub const fn slow() -> Self {
        Self::from_millis(30_000, 250)
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Poll `probe` until it returns `Ok` or the timeout elapses.
    ///
    /// The probe always runs at least once. On timeout the last `Err`
    /// observation is returned inside [`WaitTimeout`].
    pub async fn poll_until<T, E, F, Fut>(&self, mut probe: F) -> Result<T, WaitTimeout<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let last = match probe().await {
                Ok(value) => return Ok(value),
                Err(last) => last,
            };

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(WaitTimeout {
                    last,
                    attempts,
                    elapsed,
                });
            }
            let remaining = self.timeout - elapsed;
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

/// A wait that ran out of budget
#[derive(Debug, Clone)]
pub struct WaitTimeout<E> {
    /// Last observation before giving up
    pub last: E,
    /// Number of probe attempts
    pub attempts: u32,
    /// Time spent waiting
    pub elapsed: Duration,
}
