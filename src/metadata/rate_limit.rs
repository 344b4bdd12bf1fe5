//! Minimum-interval request throttling.
//!
//! Each provider owns one [`RateLimiter`] (AniDB shares a single limiter
//! across every instance). Before a request the caller awaits
//! [`RateLimiter::acquire`], which sleeps for whatever remains of the
//! interval since the previous request and then stamps the new request
//! time. The lock is held across the sleep so concurrent callers serialize
//! through the limiter in arrival order.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Lower bound for the AniDB interval; the service bans faster clients.
pub const ANIDB_MIN_INTERVAL: Duration = Duration::from_secs(3);

/// Throttle enforcing a minimum gap between consecutive requests.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Create a limiter whose interval is never shorter than `floor`.
    pub fn with_floor(interval: Duration, floor: Duration) -> Self {
        Self::new(interval.max(floor))
    }

    /// The enforced minimum interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until a request may be sent, then record it.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                trace!(wait_ms = wait.as_millis() as u64, "rate limiter sleeping");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let start = std::time::Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn consecutive_calls_respect_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = std::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn shared_limiter_serializes_tasks() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(200)));
        let start = std::time::Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // Three requests need two full gaps.
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn floor_is_enforced() {
        let limiter = RateLimiter::with_floor(Duration::from_millis(100), ANIDB_MIN_INTERVAL);
        assert_eq!(limiter.interval(), ANIDB_MIN_INTERVAL);

        let limiter = RateLimiter::with_floor(Duration::from_secs(5), ANIDB_MIN_INTERVAL);
        assert_eq!(limiter.interval(), Duration::from_secs(5));
    }
}
