//! Retry loop error types.

use std::fmt;

/// Outcome of one failed attempt, as reported by the operation.
#[derive(Debug)]
pub enum Failure<E> {
    /// Worth waiting and trying again.
    Retryable(E),
    /// Stop now and hand the error back.
    Permanent(E),
}

/// Terminal error of `run_with_retry`. Every variant keeps the last error seen.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The operation reported a permanent failure.
    Permanent { error: E, attempts: u32 },
    /// The backoff ran out of delays.
    Exhausted { error: E, attempts: u32 },
    /// The cancel token fired before another attempt was made.
    Cancelled { error: E, attempts: u32 },
}

impl<E> RetryError<E> {
    /// Number of attempts made, including the first.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Permanent { attempts, .. }
            | RetryError::Exhausted { attempts, .. }
            | RetryError::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn error(&self) -> &E {
        match self {
            RetryError::Permanent { error, .. }
            | RetryError::Exhausted { error, .. }
            | RetryError::Cancelled { error, .. } => error,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Permanent { error, .. }
            | RetryError::Exhausted { error, .. }
            | RetryError::Cancelled { error, .. } => error,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Permanent { error, .. } => write!(f, "{}", error),
            RetryError::Exhausted { error, attempts } => {
                write!(f, "gave up after {} attempts: {}", attempts, error)
            }
            RetryError::Cancelled { error, attempts } => {
                write!(f, "cancelled after {} attempts: {}", attempts, error)
            }
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error())
    }
}
