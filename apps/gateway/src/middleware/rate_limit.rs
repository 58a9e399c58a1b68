//! Token-bucket rate limiting.
//!
//! One [`TokenBucket`] is a single gate shared by every request that passes
//! through the [`RateLimiter`] holding it; callers are not told apart. The
//! bucket starts full, gains one token per elapsed interval up to its
//! capacity, and each admitted request takes one token.

use std::future::ready;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServiceRequest;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use super::chain::{ChainFuture, Interceptor, Next};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { remaining: u32 },
    Rejected { retry_in: Duration },
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    interval: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// A full bucket. `capacity` is raised to at least 1 and `interval` to at
    /// least 1ms.
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            interval: interval.max(Duration::from_millis(1)),
            state: Mutex::new(BucketState {
                tokens: capacity.max(1),
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn try_acquire(&self) -> Admission {
        self.try_acquire_at(Instant::now())
    }

    /// Refill for the whole intervals elapsed since the last refill, then take
    /// a token if one is left. Refill and take happen under one lock.
    pub fn try_acquire_at(&self, now: Instant) -> Admission {
        let mut state = self.state.lock();

        let elapsed = now.saturating_duration_since(state.last_refill);
        let intervals = elapsed.as_nanos() / self.interval.as_nanos();
        if intervals > 0 {
            let missing = self.capacity - state.tokens;
            if intervals >= u128::from(missing) {
                state.tokens = self.capacity;
                state.last_refill = now;
            } else {
                // intervals < missing <= capacity, so this fits in u32
                let added = intervals as u32;
                state.tokens += added;
                state.last_refill += self.interval * added;
            }
        }

        if state.tokens > 0 {
            state.tokens -= 1;
            Admission::Admitted {
                remaining: state.tokens,
            }
        } else {
            let next_refill = state.last_refill + self.interval;
            Admission::Rejected {
                retry_in: next_refill.saturating_duration_since(now),
            }
        }
    }
}

/// Admits requests while the shared bucket has tokens; answers 429 otherwise.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket: Arc<TokenBucket>,
}

impl RateLimiter {
    pub fn new(bucket: Arc<TokenBucket>) -> Self {
        Self { bucket }
    }
}

impl Interceptor for RateLimiter {
    fn name(&self) -> &'static str {
        "rate_limiter"
    }

    fn intercept(&self, req: ServiceRequest, next: Next) -> ChainFuture {
        match self.bucket.try_acquire() {
            Admission::Admitted { remaining } => {
                info!(tokens_remaining = remaining, "rate limit token taken");
                next.call(req)
            }
            Admission::Rejected { retry_in } => {
                warn!(retry_in_ms = retry_in.as_millis() as u64, "rate limit reached");
                let err = AppError::rate_limited(self.bucket.interval());
                Box::pin(ready(Ok(req.error_response(err))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const I: Duration = Duration::from_millis(100);

    fn admitted(a: Admission) -> bool {
        matches!(a, Admission::Admitted { .. })
    }

    #[tokio::test(start_paused = true)]
    async fn burst_then_reject_then_one_per_interval() {
        let bucket = TokenBucket::new(3, I);

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                bucket.try_acquire(),
                Admission::Admitted {
                    remaining: expected_remaining
                }
            );
        }
        assert_eq!(bucket.try_acquire(), Admission::Rejected { retry_in: I });

        tokio::time::advance(I).await;
        assert!(admitted(bucket.try_acquire()));
        assert!(!admitted(bucket.try_acquire()));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_interval_does_not_refill() {
        let bucket = TokenBucket::new(1, I);
        assert!(admitted(bucket.try_acquire()));

        tokio::time::advance(I - Duration::from_millis(1)).await;
        assert_eq!(
            bucket.try_acquire(),
            Admission::Rejected {
                retry_in: Duration::from_millis(1)
            }
        );

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(admitted(bucket.try_acquire()));
    }

    #[tokio::test(start_paused = true)]
    async fn refill_never_exceeds_capacity() {
        let bucket = TokenBucket::new(2, I);
        tokio::time::advance(I * 50).await;

        assert!(admitted(bucket.try_acquire()));
        assert!(admitted(bucket.try_acquire()));
        assert!(!admitted(bucket.try_acquire()));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_refill_keeps_fractional_progress() {
        let bucket = TokenBucket::new(4, I);
        for _ in 0..4 {
            assert!(admitted(bucket.try_acquire()));
        }

        // 2.5 intervals: two tokens now, the half interval carries over.
        tokio::time::advance(I * 5 / 2).await;
        assert!(admitted(bucket.try_acquire()));
        assert!(admitted(bucket.try_acquire()));
        assert!(!admitted(bucket.try_acquire()));

        tokio::time::advance(I / 2).await;
        assert!(admitted(bucket.try_acquire()));
    }

    #[test]
    fn concurrent_callers_never_exceed_capacity() {
        let bucket = Arc::new(TokenBucket::new(25, Duration::from_secs(3600)));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                thread::spawn(move || {
                    (0..20)
                        .filter(|_| admitted(bucket.try_acquire_at(now)))
                        .count()
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 25);
    }
}
