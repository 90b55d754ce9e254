//! Client-side rate limiting.
//!
//! One token-bucket limiter is shared by every call a client instance
//! issues; each attempt acquires a permit before touching the network.
//! Permit grants are not FIFO under contention.

use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota};

/// Token-bucket permit source shared across concurrent calls.
pub struct RateLimiter {
    inner: Option<DefaultDirectRateLimiter>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limited", &self.is_limited())
            .finish()
    }
}

impl RateLimiter {
    /// Cap sustained throughput at `rps` requests per second.
    ///
    /// A value of zero disables limiting, same as [`RateLimiter::unlimited`].
    pub fn per_second(rps: u32) -> Self {
        let inner = NonZeroU32::new(rps)
            .map(|rps| governor::RateLimiter::direct(Quota::per_second(rps)));
        Self { inner }
    }

    /// A limiter that always grants permits immediately.
    pub fn unlimited() -> Self {
        Self { inner: None }
    }

    /// Returns true if this limiter enforces a cap.
    pub fn is_limited(&self) -> bool {
        self.inner.is_some()
    }

    /// Wait until a permit is available.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.inner {
            limiter.until_ready().await;
        }
    }
}
