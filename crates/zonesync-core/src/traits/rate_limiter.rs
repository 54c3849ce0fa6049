// # Rate Limiter
//
// Every remote call made by the sync driver first takes one token. The
// limiter is shared across concurrent reconciliations, so acquisition must
// be safe from many tasks at once.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Admission control for remote calls
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until one more remote call may be made
    async fn take(&self);
}

/// Token bucket limiter
///
/// Holds at most `burst` tokens and refills at `requests_per_second`.
/// Waiters are served one at a time: the state lock is held across the
/// sleep, so a burst of callers is spread out instead of all waking at
/// once.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    capacity: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket
    ///
    /// A zero rate or burst is raised to one.
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            rate: f64::from(requests_per_second.max(1)),
            capacity,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);
        state.last_refill = now;
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn take(&self) {
        let mut state = self.state.lock().await;
        self.refill(&mut state, Instant::now());

        if state.tokens < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - state.tokens) / self.rate);
            tracing::trace!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
            self.refill(&mut state, Instant::now());
        }

        state.tokens = (state.tokens - 1.0).max(0.0);
    }
}

/// No-op limiter
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn take(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let bucket = TokenBucket::new(1, 3);
        let start = std::time::Instant::now();
        for _ in 0..3 {
            bucket.take().await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_refill_rate_is_enforced() {
        let bucket = TokenBucket::new(20, 1);
        let start = std::time::Instant::now();
        // first token is free, the next two wait ~50ms each
        for _ in 0..3 {
            bucket.take().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_concurrent_takers() {
        let bucket = Arc::new(TokenBucket::new(50, 1));
        let start = std::time::Instant::now();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                tokio::spawn(async move { bucket.take().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // 1 free + 4 x 20ms
        assert!(start.elapsed() >= Duration::from_millis(70));
    }

    #[tokio::test]
    async fn test_empty_bucket_waits() {
        let bucket = TokenBucket::new(1, 1);
        bucket.take().await;

        let mut take = tokio_test::task::spawn(bucket.take());
        tokio_test::assert_pending!(take.poll());
    }

    #[tokio::test]
    async fn test_unlimited() {
        let limiter = Unlimited;
        for _ in 0..100 {
            let mut take = tokio_test::task::spawn(limiter.take());
            tokio_test::assert_ready!(take.poll());
        }
    }
}
