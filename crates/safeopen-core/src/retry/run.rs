//! Retry loop: run a closure until success, a permanent failure, or the backoff says stop.

use std::fmt;
use std::time::Duration;

use super::backoff::Backoff;
use super::error::{Failure, RetryError};
use crate::cancel::{CancelToken, WaitOutcome};

/// Runs `op` until it succeeds or retrying is over.
///
/// On a retryable failure the next delay is taken from `backoff`; `notify` is
/// called once with the error and that delay, then the loop waits on `cancel`.
/// No delay left means `Exhausted`, or `Cancelled` if the token has fired.
/// The first attempt is always made.
pub fn run_with_retry<T, E, B, N, F>(
    mut backoff: B,
    cancel: &CancelToken,
    mut notify: N,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    B: Backoff,
    N: FnMut(&E, Duration),
    F: FnMut() -> Result<T, Failure<E>>,
{
    let mut attempts = 1u32;
    loop {
        let error = match op() {
            Ok(v) => return Ok(v),
            Err(Failure::Permanent(error)) => {
                return Err(RetryError::Permanent { error, attempts });
            }
            Err(Failure::Retryable(error)) => error,
        };

        let Some(delay) = backoff.next_backoff() else {
            if cancel.is_cancelled() {
                tracing::warn!(attempts, %error, "cancelled while retrying");
                return Err(RetryError::Cancelled { error, attempts });
            }
            tracing::warn!(attempts, %error, "backoff exhausted, giving up");
            return Err(RetryError::Exhausted { error, attempts });
        };

        tracing::debug!(attempts, delay_ms = delay.as_millis() as u64, %error, "retrying");
        notify(&error, delay);

        if cancel.wait_timeout(delay) == WaitOutcome::Cancelled {
            tracing::warn!(attempts, %error, "cancelled while waiting to retry");
            return Err(RetryError::Cancelled { error, attempts });
        }
        attempts = attempts.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::backoff::{BackoffExt, Constant, Stop};

    fn zero() -> Constant {
        Constant::new(Duration::ZERO)
    }

    #[test]
    fn success_first_try_no_notify() {
        let mut notified = 0;
        let r: Result<u8, RetryError<String>> =
            run_with_retry(zero(), &CancelToken::never(), |_, _| notified += 1, || Ok(7));
        assert_eq!(r.unwrap(), 7);
        assert_eq!(notified, 0);
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let mut seen = Vec::new();
        let r = run_with_retry(
            zero(),
            &CancelToken::never(),
            |e: &String, d| seen.push((e.clone(), d)),
            || {
                calls += 1;
                if calls < 3 {
                    Err(Failure::Retryable(format!("busy {}", calls)))
                } else {
                    Ok(calls)
                }
            },
        );
        assert_eq!(r.unwrap(), 3);
        assert_eq!(
            seen,
            vec![
                ("busy 1".to_string(), Duration::ZERO),
                ("busy 2".to_string(), Duration::ZERO)
            ]
        );
    }

    #[test]
    fn permanent_is_not_retried() {
        let mut calls = 0;
        let mut notified = 0;
        let r: Result<(), _> = run_with_retry(
            zero(),
            &CancelToken::never(),
            |_, _| notified += 1,
            || {
                calls += 1;
                Err(Failure::Permanent("nope".to_string()))
            },
        );
        match r {
            Err(RetryError::Permanent { error, attempts }) => {
                assert_eq!(error, "nope");
                assert_eq!(attempts, 1);
            }
            other => panic!("expected Permanent, got {:?}", other),
        }
        assert_eq!(calls, 1);
        assert_eq!(notified, 0);
    }

    #[test]
    fn exhausted_backoff_returns_last_error() {
        let mut calls = 0;
        let r: Result<(), _> = run_with_retry(
            zero().max_retries(2),
            &CancelToken::never(),
            |_, _| {},
            || {
                calls += 1;
                Err(Failure::Retryable(format!("busy {}", calls)))
            },
        );
        match r {
            Err(RetryError::Exhausted { error, attempts }) => {
                assert_eq!(error, "busy 3");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn stop_backoff_makes_one_attempt() {
        let r: Result<(), _> = run_with_retry(Stop, &CancelToken::never(), |_, _| {}, || {
            Err(Failure::Retryable("busy".to_string()))
        });
        assert_eq!(r.unwrap_err().attempts(), 1);
    }

    #[test]
    fn cancelled_token_ends_loop_after_first_attempt() {
        let token = CancelToken::new();
        token.cancel();
        let mut calls = 0;
        let mut notified = 0;
        let r: Result<(), _> = run_with_retry(
            zero().with_cancel(token.clone()),
            &token,
            |_, _| notified += 1,
            || {
                calls += 1;
                Err(Failure::Retryable("busy".to_string()))
            },
        );
        let err = r.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 1);
        assert_eq!(calls, 1);
        assert_eq!(notified, 0);
    }

    #[test]
    fn cancel_from_notifier_interrupts_wait() {
        let token = CancelToken::new();
        let r: Result<(), _> = run_with_retry(
            Constant::new(Duration::from_secs(60)),
            &token,
            |_, _| token.cancel(),
            || Err(Failure::Retryable("busy".to_string())),
        );
        let err = r.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 1);
        assert_eq!(err.to_string(), "cancelled after 1 attempts: busy");
    }
}
