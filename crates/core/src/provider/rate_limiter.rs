//! Minimum-spacing rate limiter for outbound provider calls.

use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Keeps consecutive calls at least `min_interval` apart.
///
/// Only the remaining deficit since the last granted call is slept, so
/// calling `acquire` in a tight loop does not drift.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// When the last call was granted.
    pub fn last_call(&self) -> Option<Instant> {
        self.last_call
    }

    /// Wait until the next call is allowed, then record it.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limiting: sleeping {:.2}s", wait.as_secs_f64());
                sleep(wait).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}
