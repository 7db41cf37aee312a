//! Process-wide throttle for outbound HTTP traffic.
//!
//! All adapters and the image downloader share one limiter, so the pipeline
//! never hits any catalog faster than the configured interval regardless of
//! which source a request goes to.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::config::PolicySettings;

/// Serializes outbound requests to a minimum inter-request interval and
/// retries a rate-limited request exactly once.
pub struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
    retry_delay: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, retry_delay: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now() - min_interval),
            min_interval,
            retry_delay,
        }
    }

    pub fn from_policy(policy: &PolicySettings) -> Self {
        Self::new(
            Duration::from_millis(policy.min_request_interval_ms),
            Duration::from_millis(policy.rate_limit_retry_delay_ms),
        )
    }

    /// Sleep just long enough to guarantee `min_interval` since the previous
    /// outbound request. The lock is held across the sleep so concurrent
    /// callers serialize instead of racing past the interval together.
    pub async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }

    /// Throttled GET. On HTTP 429 waits `retry_delay` and retries the same
    /// request once more; any further 429 is returned to the caller as-is.
    pub async fn get(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> reqwest::Result<reqwest::Response> {
        self.throttle().await;
        let response = client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(
                "Rate limited fetching {}, retrying once in {:?}",
                url, self.retry_delay
            );
            tokio::time::sleep(self.retry_delay).await;
            self.throttle().await;
            return client.get(url).send().await;
        }

        Ok(response)
    }
}
