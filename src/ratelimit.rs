//! Leaky-bucket rate limiter shared by every caller of one upstream.
//!
//! The limiter keeps a single `next_permitted` instant on the monotonic
//! clock. Each [`RateLimiter::wait`] sleeps until that instant, then pushes
//! it forward by the minimum interval. The bucket has depth 1: an idle period
//! never accumulates credit, so bursts are smoothed to a constant rate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};

/// Default steady rate (requests per second) for translation calls.
pub const DEFAULT_QPS: f64 = 5.0;

/// Thread-safe leaky-bucket gate.
///
/// Construct one per limited resource and share it behind an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    next_permitted: Mutex<Instant>,
    /// Minimum spacing between grants, in nanoseconds.
    min_interval_nanos: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter allowing `qps` grants per second.
    pub fn new(qps: f64) -> Result<Self> {
        let interval = min_interval_for(qps)?;
        Ok(Self {
            next_permitted: Mutex::new(Instant::now()),
            min_interval_nanos: AtomicU64::new(duration_nanos(interval)),
        })
    }

    /// Blocks the calling task until a request may be issued, then reserves
    /// the following slot.
    pub async fn wait(&self) {
        let interval = self.min_interval();
        let mut next = self.next_permitted.lock().await;

        let now = Instant::now();
        if *next > now {
            let pause = *next - now;
            debug!(sleep_ms = pause.as_millis() as u64, "rate limit wait");
            tokio::time::sleep(pause).await;
        }

        *next = (*next).max(Instant::now()) + interval;
    }

    /// Changes the target rate for every `wait()` that starts afterwards.
    pub fn set_rate(&self, qps: f64) -> Result<()> {
        let interval = min_interval_for(qps)?;
        self.min_interval_nanos
            .store(duration_nanos(interval), Ordering::SeqCst);
        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_nanos(self.min_interval_nanos.load(Ordering::SeqCst))
    }
}

/// Spacing between grants at `qps`. Fails for rates that are not positive
/// or so small that the interval does not fit a `Duration`.
pub fn min_interval_for(qps: f64) -> Result<Duration> {
    if !qps.is_finite() || qps <= 0.0 {
        return Err(Error::config(format!(
            "rate must be a positive number of requests per second, got {qps}"
        )));
    }
    Duration::try_from_secs_f64(1.0 / qps)
        .map_err(|e| Error::config(format!("rate {qps} is too small: {e}")))
}

fn duration_nanos(interval: Duration) -> u64 {
    u64::try_from(interval.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(matches!(RateLimiter::new(0.0), Err(Error::Config(_))));
        assert!(matches!(RateLimiter::new(-3.0), Err(Error::Config(_))));
        assert!(matches!(RateLimiter::new(f64::NAN), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_rate_whose_interval_overflows() {
        assert!(matches!(RateLimiter::new(1e-20), Err(Error::Config(_))));

        let limiter = RateLimiter::new(2.0).unwrap();
        assert!(matches!(limiter.set_rate(1e-20), Err(Error::Config(_))));
        assert_eq!(limiter.min_interval(), Duration::from_millis(500));

        assert_eq!(min_interval_for(0.5).unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_set_rate_rejects_invalid_and_keeps_previous() {
        let limiter = RateLimiter::new(4.0).unwrap();
        assert!(limiter.set_rate(0.0).is_err());
        assert_eq!(limiter.min_interval(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_wait_is_immediate() {
        let limiter = RateLimiter::new(1.0).unwrap();
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_grants_are_spaced() {
        let limiter = RateLimiter::new(2.0).unwrap();
        let mut grants = Vec::new();
        for _ in 0..5 {
            limiter.wait().await;
            grants.push(Instant::now());
        }
        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_grants_are_spaced() {
        let limiter = Arc::new(RateLimiter::new(10.0).unwrap());
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            tasks.push(tokio::spawn(async move {
                limiter.wait().await;
                Instant::now()
            }));
        }

        let mut grants = Vec::new();
        for task in tasks {
            grants.push(task.await.unwrap());
        }
        grants.sort();

        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_period_does_not_accumulate_credit() {
        let limiter = RateLimiter::new(1.0).unwrap();
        limiter.wait().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        limiter.wait().await;
        let after_idle = Instant::now();
        limiter.wait().await;
        assert!(Instant::now() - after_idle >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_rate_applies_to_later_waits() {
        let limiter = RateLimiter::new(1.0).unwrap();
        limiter.wait().await;
        limiter.set_rate(10.0).unwrap();

        // The slot reserved before the change is still one second away.
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_secs(1));

        // The next one uses the new interval.
        let start = Instant::now();
        limiter.wait().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(100));
        assert!(waited < Duration::from_millis(200));
    }
}
