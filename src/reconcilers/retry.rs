// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deadlines and retries for provider calls.
//!
//! Every provider call runs under a per-call deadline. Read-only calls (list
//! zones, get records, get nameservers) are retried with exponential backoff
//! on transient errors and deadline breaches; permanent errors fail fast.
//! Mutating actions go through [`with_deadline`] only and are never retried.

use crate::constants::DEFAULT_PROVIDER_CALL_TIMEOUT_SECS;
use crate::errors::ProviderError;
use crate::metrics;
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Maximum total time to spend retrying one call (2 minutes)
const MAX_ELAPSED_TIME_SECS: u64 = 120;

/// Initial retry interval (100ms)
const INITIAL_INTERVAL_MILLIS: u64 = 100;

/// Maximum interval between retries (10 seconds)
const MAX_INTERVAL_SECS: u64 = 10;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Current interval duration
    pub current_interval: Duration,
    pub initial_interval: Duration,
    /// Maximum interval duration
    pub max_interval: Duration,
    /// Maximum total elapsed time
    pub max_elapsed_time: Option<Duration>,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
    start_time: Instant,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with specified parameters.
    #[must_use]
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        max_elapsed_time: Option<Duration>,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        Self {
            current_interval: initial_interval,
            initial_interval,
            max_interval,
            max_elapsed_time,
            multiplier,
            randomization_factor,
            start_time: Instant::now(),
        }
    }

    /// Get the next backoff interval, or None if max elapsed time exceeded.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if let Some(max_elapsed) = self.max_elapsed_time {
            if self.start_time.elapsed() >= max_elapsed {
                return None;
            }
        }

        let interval = self.current_interval;
        let jittered = self.apply_jitter(interval);

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        Some(jittered)
    }

    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let jittered = rand::thread_rng().gen_range((secs - delta)..=(secs + delta));

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Backoff used for provider reads.
///
/// # Retry Schedule
///
/// 100ms, 200ms, 400ms, 800ms, 1.6s, 3.2s, 6.4s, then 10s intervals until
/// two minutes have elapsed.
#[must_use]
pub fn provider_backoff() -> ExponentialBackoff {
    CallPolicy::default().backoff()
}

/// Deadline and retry settings for provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Deadline for one attempt
    pub timeout: Duration,
    /// First retry delay
    pub retry_initial: Duration,
    /// Total time after which reads stop retrying
    pub retry_max_elapsed: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROVIDER_CALL_TIMEOUT_SECS),
            retry_initial: Duration::from_millis(INITIAL_INTERVAL_MILLIS),
            retry_max_elapsed: Duration::from_secs(MAX_ELAPSED_TIME_SECS),
        }
    }
}

impl CallPolicy {
    /// Policy with the given per-call deadline and the default retry schedule.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// A fresh backoff for one call.
    #[must_use]
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            self.retry_initial,
            Duration::from_secs(MAX_INTERVAL_SECS).max(self.retry_initial),
            Some(self.retry_max_elapsed),
            BACKOFF_MULTIPLIER,
            RANDOMIZATION_FACTOR,
        )
    }

    /// Retry a read under this policy. See [`retry_provider_call`].
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn read<T, F, Fut>(&self, provider: &str, operation: &str, call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        retry_provider_call(provider, operation, self.timeout, self.backoff(), call).await
    }

    /// Run a mutation once under the deadline. See [`with_deadline`].
    ///
    /// # Errors
    ///
    /// Returns the call's error or a timeout.
    pub async fn mutate<T, Fut>(&self, provider: &str, operation: &str, call: Fut) -> Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        with_deadline(provider, operation, self.timeout, call).await
    }
}

/// Run one provider call under a deadline.
///
/// # Errors
///
/// Returns the call's error, or [`ProviderError::Timeout`] if the deadline
/// elapses first.
pub async fn with_deadline<T, Fut>(
    provider: &str,
    operation: &str,
    timeout: Duration,
    call: Fut,
) -> Result<T, ProviderError>
where
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let started = Instant::now();
    let result = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            provider: provider.to_string(),
            operation: operation.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    };

    let status = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    metrics::record_provider_call(provider, operation, status, started.elapsed());
    result
}

/// Retry a read-only provider call with exponential backoff.
///
/// Each attempt runs under `timeout`. Transient errors and deadline breaches
/// are retried until `backoff` gives up; any other error is returned at once.
///
/// # Arguments
///
/// * `provider` - Provider instance name, for logs and metrics
/// * `operation` - Driver operation name (e.g., "get_zone_records")
/// * `timeout` - Per-attempt deadline
/// * `backoff` - Retry schedule
/// * `call` - Produces the future for one attempt
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first
/// non-retryable error.
pub async fn retry_provider_call<T, F, Fut>(
    provider: &str,
    operation: &str,
    timeout: Duration,
    mut backoff: ExponentialBackoff,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let start_time = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match with_deadline(provider, operation, timeout, call()).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        provider,
                        operation,
                        attempt,
                        elapsed = ?start_time.elapsed(),
                        "Provider call succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                error!(provider, operation, error = %e, "Non-retryable provider error");
                return Err(e);
            }
            Err(e) => {
                if let Some(duration) = backoff.next_backoff() {
                    warn!(
                        provider,
                        operation,
                        attempt,
                        retry_after = ?duration,
                        error = %e,
                        "Transient provider error, will retry"
                    );
                    tokio::time::sleep(duration).await;
                } else {
                    error!(
                        provider,
                        operation,
                        attempt,
                        elapsed = ?start_time.elapsed(),
                        error = %e,
                        "Backoff exhausted, giving up"
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
