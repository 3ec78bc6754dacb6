//! Retry budgets and exponential backoff
//!
//! Two budgets are layered around every call: the outer one repeats
//! rate-limited attempts, the inner one repeats transport failures and 5xx.
//! Delays double per attempt from `base_delay` and are capped at `max_delay`.

use std::time::Duration;

/// Attempt cap plus backoff schedule for one failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Outer budget for `Too Many Requests`: 4 attempts.
    pub const fn rate_limited() -> Self {
        Self::new(4, Duration::from_secs(1), Duration::from_secs(60))
    }

    /// Inner budget for transport errors and 5xx: 3 attempts.
    pub const fn transient() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(30))
    }

    /// Same attempt cap with a different base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Sleep before the attempt following failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
