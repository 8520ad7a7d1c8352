// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Retry utilities with exponential backoff for API calls.
///
/// The loop retries only failures classified as transient by
/// [`Error::is_retryable`] and honors a server-provided delay over the
/// computed backoff when one is present.
use std::time::Duration;

use rand::{Rng, thread_rng};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Error;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt (default: 2).
    pub max_retries:   u32,
    /// Delay before the first retry; doubles on every subsequent retry
    /// (default: 250ms).
    pub initial_delay: Duration,
    /// Upper bound of the uniform random jitter added to each computed
    /// backoff delay (default: 150ms).
    pub max_jitter:    Duration
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries:   2,
            initial_delay: Duration::from_millis(250),
            max_jitter:    Duration::from_millis(150)
        }
    }
}

/// Executes an async operation, retrying transient failures with backoff.
///
/// Failures for which [`Error::is_retryable`] returns `false` are returned
/// immediately. Transient failures are retried up to `config.max_retries`
/// times; the delay between attempts doubles each time and carries random
/// jitter, except when the failed attempt surfaced a server-provided delay
/// via [`Error::retry_after`], which takes precedence when positive.
///
/// # Errors
///
/// Returns the last error encountered once the retry budget is exhausted, or
/// the first non-retryable error.
///
/// # Example
///
/// ```no_run
/// use gh_insight::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let result = retry_with_backoff(&config, "fetch data", || async {
///     // Some API call that might fail
///     Ok::<_, Error>(42)
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>
{
    let mut attempt: u32 = 0;
    let mut delay = config.initial_delay;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(error) => {
                if !error.is_retryable() {
                    return Err(error);
                }
                if attempt >= config.max_retries {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name,
                        attempt + 1,
                        error
                    );
                    return Err(error);
                }

                let wait = match error.retry_after() {
                    Some(server_delay) if !server_delay.is_zero() => server_delay,
                    _ => delay + jitter(config.max_jitter)
                };

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {:?}...",
                    operation_name,
                    attempt + 1,
                    config.max_retries + 1,
                    error,
                    wait
                );

                sleep(wait).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Uniform random delay in `[0, max]` added to the computed backoff.
fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_millis(thread_rng().gen_range(0..=max.as_millis() as u64))
}
