//! Cooperative cancellation for retry loops.
//!
//! A `CancelToken` is shared between the caller that may want to stop an open
//! and the retry loop doing the waiting. The loop never aborts an open syscall
//! in flight; it only stops waiting and returns.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Result of waiting on a token for a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full delay passed without cancellation.
    Elapsed,
    /// The token was cancelled (or its deadline passed) before the delay ended.
    Cancelled,
}

struct Inner {
    cancelled: Mutex<bool>,
    cond: Condvar,
    deadline: Option<Instant>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Shared cancellation signal. Clones observe the same state.
///
/// The default token never fires; `cancel` on it is a no-op.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Option<Arc<Inner>>,
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            None => f.write_str("CancelToken(never)"),
            Some(inner) => f
                .debug_struct("CancelToken")
                .field("cancelled", &self.is_cancelled())
                .field("deadline", &inner.deadline)
                .finish(),
        }
    }
}

impl CancelToken {
    /// Token that can never fire.
    pub fn never() -> Self {
        Self { inner: None }
    }

    /// Token that fires only when `cancel` is called.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Token that fires at `deadline`, or earlier if `cancel` is called.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    /// Token that fires `timeout` from now. An overflowing timeout behaves like `new`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            inner: Some(Arc::new(Inner {
                cancelled: Mutex::new(false),
                cond: Condvar::new(),
                deadline,
            })),
        }
    }

    /// Fire the token and wake every waiter.
    pub fn cancel(&self) {
        if let Some(inner) = &self.inner {
            *inner.lock() = true;
            inner.cond.notify_all();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.inner {
            None => false,
            Some(inner) => *inner.lock() || inner.deadline_passed(),
        }
    }

    /// Block for `delay` unless the token fires first.
    pub fn wait_timeout(&self, delay: Duration) -> WaitOutcome {
        let Some(inner) = &self.inner else {
            std::thread::sleep(delay);
            return WaitOutcome::Elapsed;
        };

        let wake = Instant::now().checked_add(delay);
        // Whichever comes first: end of the delay or the token's deadline.
        let (until, by_deadline) = match (wake, inner.deadline) {
            (Some(w), Some(d)) if d <= w => (Some(d), true),
            (None, Some(d)) => (Some(d), true),
            (w, _) => (w, false),
        };

        let mut cancelled = inner.lock();
        loop {
            if *cancelled {
                return WaitOutcome::Cancelled;
            }
            match until {
                None => {
                    cancelled = inner
                        .cond
                        .wait(cancelled)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some(until) => {
                    let now = Instant::now();
                    if now >= until {
                        break;
                    }
                    cancelled = inner
                        .cond
                        .wait_timeout(cancelled, until - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }

        if by_deadline {
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn never_token_is_not_cancelled() {
        let t = CancelToken::never();
        t.cancel();
        assert!(!t.is_cancelled());
        assert_eq!(t.wait_timeout(Duration::from_millis(1)), WaitOutcome::Elapsed);
    }

    #[test]
    fn cancel_is_seen_by_clones() {
        let t = CancelToken::new();
        let t2 = t.clone();
        assert!(!t2.is_cancelled());
        t.cancel();
        assert!(t2.is_cancelled());
        assert_eq!(t2.wait_timeout(Duration::from_secs(60)), WaitOutcome::Cancelled);
    }

    #[test]
    fn wait_elapses_without_cancel() {
        let t = CancelToken::new();
        let start = Instant::now();
        assert_eq!(t.wait_timeout(Duration::from_millis(20)), WaitOutcome::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cancel_wakes_waiter_early() {
        let t = CancelToken::new();
        let waiter = {
            let t = t.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let outcome = t.wait_timeout(Duration::from_secs(30));
                (outcome, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        t.cancel();
        let (outcome, waited) = waiter.join().unwrap();
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(waited < Duration::from_secs(10));
    }

    #[test]
    fn deadline_cuts_wait_short() {
        let t = CancelToken::with_timeout(Duration::from_millis(20));
        let start = Instant::now();
        assert_eq!(t.wait_timeout(Duration::from_secs(30)), WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(t.is_cancelled());
    }

    #[test]
    fn past_deadline_is_cancelled_immediately() {
        let t = CancelToken::with_deadline(Instant::now());
        assert!(t.is_cancelled());
        assert_eq!(t.wait_timeout(Duration::from_secs(30)), WaitOutcome::Cancelled);
    }

    #[test]
    fn huge_delay_still_wakes_on_cancel() {
        let t = CancelToken::new();
        let waiter = {
            let t = t.clone();
            thread::spawn(move || t.wait_timeout(Duration::MAX))
        };
        thread::sleep(Duration::from_millis(10));
        t.cancel();
        assert_eq!(waiter.join().unwrap(), WaitOutcome::Cancelled);
    }
}
