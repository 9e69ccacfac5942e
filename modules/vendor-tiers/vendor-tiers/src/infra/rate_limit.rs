//! Per-caller throttle for tier change submissions.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, ensure};
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RateLimitConfig;

/// At most `max_requests` per `window` for each caller key. A spent slot
/// comes back one `window` after it was taken.
pub struct SubmitRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    sweep_interval: Duration,
}

impl SubmitRateLimiter {
    /// # Errors
    /// Returns an error if `max_requests`, `window` or `sweep_interval` is
    /// zero.
    pub fn new(cfg: &RateLimitConfig) -> Result<Self> {
        let burst = NonZeroU32::new(cfg.max_requests)
            .with_context(|| anyhow!("rate_limit.max_requests must be positive"))?;
        let quota = Quota::with_period(cfg.window)
            .with_context(|| anyhow!("rate_limit.window must be positive"))?
            .allow_burst(burst);
        ensure!(
            !cfg.sweep_interval.is_zero(),
            "rate_limit.sweep_interval must be positive"
        );
        Ok(Self {
            limiter: RateLimiter::keyed(quota),
            sweep_interval: cfg.sweep_interval,
        })
    }

    /// Count one submission for `key`.
    ///
    /// # Errors
    /// Returns how long the caller must wait when the key is over its quota.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.limiter
            .check_key(&key.to_owned())
            .map_err(|not_until| not_until.wait_time_from(self.limiter.clock().now()))
    }

    /// Drop keys whose quota has fully replenished.
    pub fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Sweep every `sweep_interval` until cancelled.
    pub fn spawn_sweeper(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => {
                        tracing::debug!("rate limit sweeper cancelled");
                        break;
                    }

                    _ = ticker.tick() => {
                        self.sweep();
                        tracing::trace!(tracked = self.tracked_keys(), "rate limit sweep");
                    }
                }
            }
        })
    }
}
