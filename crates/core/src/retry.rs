use std::{future::Future, time::Duration};

use tracing::warn;

#[derive(Debug)]
pub enum RetryError<E> {
    /// The operation failed with an error that is not worth retrying.
    Fatal(E),
    /// Every attempt failed with a retryable error; `last` is the final one.
    Exhausted { attempts: u32, last: E },
}

/// Run `op` up to `max_attempts` times. After a failure for which
/// `is_retryable` holds, sleep for `delay_for(&err)` and try again; any other
/// failure is returned immediately. No sleep follows the final attempt.
pub async fn retry<T, E, Op, Fut>(
    max_attempts: u32,
    is_retryable: impl Fn(&E) -> bool,
    delay_for: impl Fn(&E) -> Duration,
    mut op: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retryable(&err) => return Err(RetryError::Fatal(err)),
            Err(err) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }
            Err(err) => {
                let delay = delay_for(&err);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
