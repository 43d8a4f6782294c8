//! Retry mechanism with exponential backoff

use crate::core::http::{RawResponse, Request};
use crate::core::pipeline::{Context, Next, Stage};
use crate::utils::error::{BatchError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Base delay between retries
    pub retry_delay: Duration,
    /// Maximum delay between retries
    pub max_retry_delay: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(4),
            max_retry_delay: Duration::from_secs(120),
        }
    }
}

/// Re-sends the request on transport errors and transient status codes
///
/// Every attempt starts from a fresh copy of the request as it reached this
/// stage; the copy used by the last attempt is left in place for the caller.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    options: RetryOptions,
}

impl RetryPolicy {
    pub fn new(options: RetryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    /// Whether the status code is worth another attempt
    pub fn should_retry_status(status: StatusCode) -> bool {
        matches!(status.as_u16(), 408 | 500 | 502 | 503 | 504)
    }

    /// Delay before retry number `attempt` (0-based), with ±5% jitter
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let base_delay = self.options.retry_delay.as_millis() as f64;
        let exponential_delay = base_delay * 2f64.powi(attempt.min(31) as i32);

        let jitter_factor = 0.1;
        let jitter = exponential_delay * jitter_factor * (rand::random::<f64>() - 0.5);

        let capped_delay = (exponential_delay + jitter).min(self.options.max_retry_delay.as_millis() as f64);
        Duration::from_millis(capped_delay.max(0.0) as u64)
    }

    async fn wait(&self, ctx: &Context, attempt: u32) -> Result<()> {
        let delay = self.retry_delay(attempt);
        debug!("Retrying in {:?}", delay);
        tokio::select! {
            _ = ctx.cancelled() => Err(BatchError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryOptions::default())
    }
}

#[async_trait]
impl Stage for RetryPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>> {
        let original = request.clone();
        let mut attempt = 0;

        loop {
            *request = original.clone();
            let result = next.send(ctx, request).await;
            let can_retry = attempt < self.options.max_retries;

            match result {
                Ok(Some(response)) if Self::should_retry_status(response.status) => {
                    if !can_retry {
                        error!(
                            "Retry failed after {} attempts: status {}",
                            attempt + 1,
                            response.status
                        );
                        return Ok(Some(response));
                    }
                    warn!(
                        "Attempt {} returned status {}, retrying",
                        attempt + 1,
                        response.status
                    );
                }
                Err(BatchError::Http(e)) => {
                    if !can_retry {
                        error!("Retry failed after {} attempts: {}", attempt + 1, e);
                        return Err(BatchError::Http(e));
                    }
                    warn!("Attempt {} failed: {}, retrying", attempt + 1, e);
                }
                other => {
                    if attempt > 0 {
                        debug!("Retry succeeded on attempt {}", attempt + 1);
                    }
                    return other;
                }
            }

            self.wait(ctx, attempt).await?;
            attempt += 1;
        }
    }
}
