//! Retry wrapper — per-attempt timeout and bounded retries with backoff.
//!
//! The generation call is the only network-suspending step in the request
//! pipeline, so resilience policy lives here, wrapped around any inner
//! [`Generator`]. Transient failures (timeouts, network errors, rate
//! limits, 5xx) are retried with exponential backoff; everything else fails
//! fast. Cancellation is cooperative: dropping the returned future aborts
//! the in-flight attempt.

use confidant_core::error::GenerationError;
use confidant_core::generation::{GenerationRequest, GenerationResponse, Generator};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct RetryingGenerator {
    inner: Arc<dyn Generator>,
    /// Retries after the first attempt.
    max_retries: u32,
    /// Per-attempt timeout.
    attempt_timeout: Duration,
    /// First backoff delay; doubles per retry.
    backoff_base: Duration,
}

impl RetryingGenerator {
    /// Wrap `inner` with the default policy: 2 retries, 30s per attempt,
    /// 500ms initial backoff.
    pub fn new(inner: Arc<dyn Generator>) -> Self {
        Self {
            inner,
            max_retries: 2,
            attempt_timeout: Duration::from_secs(30),
            backoff_base: Duration::from_millis(500),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }
}

#[async_trait]
impl Generator for RetryingGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let attempts = self.max_retries + 1;
        let mut last_error = GenerationError::NotConfigured("No attempt was made".into());

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.backoff_base * 2u32.pow(attempt - 1);
                info!(
                    backend = self.inner.name(),
                    attempt = attempt + 1,
                    total = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.attempt_timeout, self.inner.generate(request.clone()))
                .await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    if !e.is_transient() {
                        warn!(backend = self.inner.name(), error = %e, "Non-transient failure, not retrying");
                        return Err(e);
                    }
                    warn!(
                        backend = self.inner.name(),
                        attempt = attempt + 1,
                        total = attempts,
                        error = %e,
                        "Transient failure"
                    );
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        backend = self.inner.name(),
                        attempt = attempt + 1,
                        total = attempts,
                        timeout_secs = self.attempt_timeout.as_secs(),
                        "Attempt timed out"
                    );
                    last_error = GenerationError::Timeout(format!(
                        "Backend '{}' timed out after {}s",
                        self.inner.name(),
                        self.attempt_timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}
