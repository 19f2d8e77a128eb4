//! Backoff strategies: sequences of delays consumed one per retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;

/// Interval used by the default constant backoff.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// A possibly infinite sequence of delays. `None` means stop retrying.
pub trait Backoff: Send {
    fn next_backoff(&mut self) -> Option<Duration>;
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }
}

/// Builds a fresh backoff for every open call.
pub type BackoffFactory = Arc<dyn Fn() -> Box<dyn Backoff> + Send + Sync>;

/// Wrap a backoff constructor into a shareable factory.
pub fn factory<F, B>(ctor: F) -> BackoffFactory
where
    F: Fn() -> B + Send + Sync + 'static,
    B: Backoff + 'static,
{
    Arc::new(move || Box::new(ctor()) as Box<dyn Backoff>)
}

/// Constant `DEFAULT_INTERVAL` backoff that never stops.
pub fn default_factory() -> BackoffFactory {
    factory(|| Constant::new(DEFAULT_INTERVAL))
}

/// Same delay forever.
#[derive(Debug, Clone, Copy)]
pub struct Constant {
    interval: Duration,
}

impl Constant {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Backoff for Constant {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(self.interval)
    }
}

/// Exponential backoff: `base * 2^(n-1)` for the n-th retry, capped at `max`.
#[derive(Debug, Clone, Copy)]
pub struct Exponential {
    base: Duration,
    max: Duration,
    retry: u32,
}

impl Exponential {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max, retry: 0 }
    }
}

impl Backoff for Exponential {
    fn next_backoff(&mut self) -> Option<Duration> {
        self.retry = self.retry.saturating_add(1);
        let exp = 1u32 << self.retry.saturating_sub(1).min(16);
        Some(self.base.saturating_mul(exp).min(self.max))
    }
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stop;

impl Backoff for Stop {
    fn next_backoff(&mut self) -> Option<Duration> {
        None
    }
}

/// Backoff driven by a closure; handy for scripted delays.
pub struct FromFn<F>(pub F);

impl<F> Backoff for FromFn<F>
where
    F: FnMut() -> Option<Duration> + Send,
{
    fn next_backoff(&mut self) -> Option<Duration> {
        (self.0)()
    }
}

/// Stops after `max` delays.
#[derive(Debug)]
pub struct MaxRetries<B> {
    inner: B,
    remaining: u32,
}

impl<B: Backoff> Backoff for MaxRetries<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next_backoff()
    }
}

/// Stops once `budget` has passed since the first delay was requested,
/// and never hands out a delay that would overrun the budget.
#[derive(Debug)]
pub struct MaxElapsed<B> {
    inner: B,
    budget: Duration,
    started: Option<Instant>,
}

impl<B: Backoff> Backoff for MaxElapsed<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        let started = *self.started.get_or_insert_with(Instant::now);
        let left = self.budget.checked_sub(started.elapsed())?;
        if left.is_zero() {
            return None;
        }
        self.inner.next_backoff().map(|d| d.min(left))
    }
}

/// Stops as soon as the token fires.
#[derive(Debug)]
pub struct Cancellable<B> {
    inner: B,
    token: CancelToken,
}

impl<B: Backoff> Backoff for Cancellable<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.token.is_cancelled() {
            return None;
        }
        self.inner.next_backoff()
    }
}

/// Combinators for any backoff.
pub trait BackoffExt: Backoff + Sized {
    fn max_retries(self, max: u32) -> MaxRetries<Self> {
        MaxRetries {
            inner: self,
            remaining: max,
        }
    }

    fn max_elapsed(self, budget: Duration) -> MaxElapsed<Self> {
        MaxElapsed {
            inner: self,
            budget,
            started: None,
        }
    }

    fn with_cancel(self, token: CancelToken) -> Cancellable<Self> {
        Cancellable { inner: self, token }
    }
}

impl<B: Backoff> BackoffExt for B {}
