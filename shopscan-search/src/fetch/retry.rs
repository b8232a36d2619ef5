//! Bounded retry with exponential back-off for plain-http fetches.
//!
//! Only an explicit "temporarily unavailable" answer (HTTP 503) is retried.
//! Client errors, other server errors, timeouts and network failures are
//! returned on first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Status a site uses to ask us to come back later.
const SERVICE_UNAVAILABLE: u16 = 503;

/// Longest single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth another attempt after a back-off delay.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    matches!(
        err,
        FetchError::Http {
            status: SERVICE_UNAVAILABLE
        }
    )
}

/// Back-off before attempt `attempt + 1`, where `attempt` is 1-based.
///
/// With `backoff_base_ms = 1_000` the schedule is 1 s, 2 s, 4 s, 8 s.
pub(crate) fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(10);
    Duration::from_millis(backoff_base_ms.saturating_mul(factor).min(MAX_DELAY_MS))
}

/// Runs `operation` up to `max_attempts` times in total, sleeping between
/// attempts while the error is retriable.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_attempts {
                    return Err(err);
                }
                let delay = backoff_delay(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "site temporarily unavailable, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
