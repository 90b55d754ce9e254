//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

/// Configuration for retry behavior.
///
/// A `max_attempts` of zero disables retries entirely; tests use that to
/// stay deterministic.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial request.
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub base_delay: Duration,
    /// Cap on the computed backoff delay.
    pub max_delay: Duration,
    /// Add random jitter in `[0, delay)` to each backoff delay.
    pub jitter: bool,
    /// Whether to honor Retry-After values from the server.
    pub respect_retry_after: bool,
    /// Cap on a server-supplied Retry-After wait.
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
            respect_retry_after: true,
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the base delay before the first retry.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the cap on backoff delays.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Compute the backoff delay for a 0-indexed attempt: `base * 2^attempt`
    /// capped at `max_delay`, plus jitter when enabled.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = 2f64.powi(attempt.min(32) as i32);
        let base = self.base_delay.as_secs_f64() * exp;
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            let jitter = rand::rng().random::<f64>() * capped;
            Duration::from_secs_f64((capped + jitter).min(self.max_delay.as_secs_f64() * 2.0))
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Per-request retry cursor built from a [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// The number of retries performed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if another retry is allowed.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Record an attempt and return the delay before the next retry, or
    /// `None` once the budget is exhausted.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }

        let delay = match retry_after {
            Some(retry_after) if self.config.respect_retry_after => {
                std::cmp::min(retry_after, self.config.max_retry_after)
            }
            _ => self.config.backoff_delay(self.attempt),
        };

        self.attempt += 1;
        Some(delay)
    }
}
