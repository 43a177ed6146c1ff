//! Request pacing toward the generative service.
//!
//! A single governor quota spaces requests across all concurrent pipeline
//! workers, so the batch concurrency limit cannot translate into a burst
//! the service's rate limits reject.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub struct RequestPacer {
    limiter: DirectLimiter,
}

impl RequestPacer {
    /// Pace at `n` requests per second (minimum 1).
    pub fn per_second(n: u32) -> Self {
        let n = NonZeroU32::new(n.max(1)).expect("clamped to at least 1");
        Self {
            limiter: RateLimiter::direct(Quota::per_second(n)),
        }
    }

    /// Pace at one request per `period`.
    pub fn with_period(period: Duration) -> Option<Self> {
        Quota::with_period(period).map(|quota| Self {
            limiter: RateLimiter::direct(quota),
        })
    }

    /// Wait until the next request is allowed.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_acquire_is_immediate() {
        let pacer = RequestPacer::per_second(10);
        pacer.acquire().await;
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(RequestPacer::with_period(Duration::ZERO).is_none());
    }
}
