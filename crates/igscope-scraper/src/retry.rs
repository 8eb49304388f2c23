//! Retrying fetch controller.
//!
//! [`ProfileFetcher::fetch`] runs up to [`MAX_ATTEMPTS`] lookups for one
//! username, each through a fresh egress session, and turns the result into
//! exactly one [`FetchOutcome`]. Only [`ScraperError::Transient`] errors are
//! retried; everything else stops the job on the spot.
//!
//! | Fetch result          | Retry? | Sleep before next attempt |
//! |-----------------------|--------|---------------------------|
//! | Ok                    | -      | -                         |
//! | `ProfileUnavailable`  | no     | -                         |
//! | `Transient`           | yes    | `base_delay × 2^attempt`  |
//! | anything else         | no     | -                         |
//!
//! With the default 2 s base the sleeps are 2 s then 4 s. There is no sleep
//! after the final attempt.

use std::time::Duration;

use crate::client::ProfileSource;
use crate::error::ScraperError;
use crate::metrics::compute_metrics;
use crate::outcome::{FetchFailure, FetchOutcome};
use crate::proxy::{SessionAllocator, SessionKey};
use crate::types::RawProfile;

/// Attempts per username, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_base_delay(DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_base_delay(base_delay: Duration) -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay,
        }
    }

    /// Sleep after failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(31))
    }
}

/// Wraps a [`ProfileSource`] with retries, session rotation and metrics.
pub struct ProfileFetcher<S, A> {
    source: S,
    allocator: A,
    policy: RetryPolicy,
}

impl<S, A> ProfileFetcher<S, A>
where
    S: ProfileSource,
    A: SessionAllocator,
{
    pub fn new(source: S, allocator: A, policy: RetryPolicy) -> Self {
        Self {
            source,
            allocator,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetches `username` and derives its metrics. Never fails: every error
    /// becomes a [`FetchOutcome::Failure`].
    pub async fn fetch(&self, username: &str) -> FetchOutcome {
        let result = self
            .fetch_raw(username)
            .await
            .and_then(|raw| compute_metrics(&raw));

        match result {
            Ok(metrics) => FetchOutcome::Success(metrics),
            Err(err) => {
                tracing::debug!(
                    username,
                    kind = %err.failure_kind(),
                    error = %err,
                    "profile fetch ended in failure"
                );
                FetchOutcome::Failure(FetchFailure::from_error(username, &err))
            }
        }
    }

    async fn fetch_raw(&self, username: &str) -> Result<RawProfile, ScraperError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            let err = match self.attempt(username, attempt).await {
                Ok(raw) => return Ok(raw),
                Err(err) => err,
            };

            let ScraperError::Transient { kind, .. } = &err else {
                return Err(err);
            };
            let kind = *kind;

            if attempt + 1 >= max_attempts {
                tracing::warn!(
                    username,
                    attempts = max_attempts,
                    last = %kind,
                    "retry budget exhausted"
                );
                return Err(ScraperError::RetriesExhausted {
                    attempts: max_attempts,
                    last: kind,
                });
            }

            let delay = self.policy.backoff_delay(attempt);
            tracing::warn!(
                username,
                attempt = attempt + 1,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient fetch error; retrying with a new session after backoff"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, username: &str, attempt: u32) -> Result<RawProfile, ScraperError> {
        let key = SessionKey::new(username, attempt);
        let egress = self.allocator.egress_for(&key).await?;
        tracing::debug!(username, session = %key, "fetching profile");
        self.source.fetch_profile(username, &egress).await
    }
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
