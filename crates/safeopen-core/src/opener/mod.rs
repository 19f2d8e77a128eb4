//! EMFILE/ENFILE-safe file opening.
//!
//! `Opener` wraps a single open call in a retry loop. Failures caused by a
//! full descriptor table (process or system) are retried after a backoff
//! delay; every other failure is returned immediately. The retry loop is
//! bounded only by the backoff and the cancel token, so the default opener
//! (never-firing token, constant 100ms backoff) retries forever under
//! sustained exhaustion.

mod error;
mod flags;
mod raw;


pub use error::OpenError;
pub use flags::{OpenFlags, DEFAULT_CREATE_MODE};
pub use raw::{RawOpen, StdOpen};

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::SafeOpenConfig;
use crate::retry::backoff::{self, Backoff, BackoffExt, BackoffFactory};
use crate::retry::{classify, run_with_retry, ErrorKind, Failure};

/// Retry notification: called once per retry, before waiting, with the error
/// of the failed attempt and the delay about to be waited.
pub type Notify = Arc<dyn Fn(&io::Error, Duration) + Send + Sync>;

/// Retrying opener. Cheap to clone; configuration is immutable once built,
/// so calls already running never see later changes made through a clone.
pub struct Opener<O = StdOpen> {
    raw: Arc<O>,
    cancel: Option<CancelToken>,
    backoff: Option<BackoffFactory>,
    notify: Option<Notify>,
}

impl<O> Clone for Opener<O> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            cancel: self.cancel.clone(),
            backoff: self.backoff.clone(),
            notify: self.notify.clone(),
        }
    }
}

impl<O: fmt::Debug> fmt::Debug for Opener<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opener")
            .field("raw", &self.raw)
            .field("cancel", &self.cancel)
            .field("custom_backoff", &self.backoff.is_some())
            .field("notifier", &self.notify.is_some())
            .finish()
    }
}

impl Default for Opener<StdOpen> {
    fn default() -> Self {
        Self::with_raw(StdOpen)
    }
}

impl Opener<StdOpen> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener whose backoff comes from the `[backoff]` config section.
    pub fn from_config(cfg: &SafeOpenConfig) -> Self {
        Self::new().with_backoff_factory(cfg.backoff.factory())
    }
}

impl<O: RawOpen> Opener<O> {
    /// Opener over a custom open primitive, with default settings.
    pub fn with_raw(raw: O) -> Self {
        Self {
            raw: Arc::new(raw),
            cancel: None,
            backoff: None,
            notify: None,
        }
    }

    /// Bound retrying with a cancel token. The token stops both the backoff
    /// sequence and any wait in progress.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Use `ctor` to build a fresh backoff for each call.
    pub fn with_backoff<F, B>(self, ctor: F) -> Self
    where
        F: Fn() -> B + Send + Sync + 'static,
        B: Backoff + 'static,
    {
        self.with_backoff_factory(backoff::factory(ctor))
    }

    pub fn with_backoff_factory(mut self, factory: BackoffFactory) -> Self {
        self.backoff = Some(factory);
        self
    }

    pub fn with_notifier<F>(mut self, notify: F) -> Self
    where
        F: Fn(&io::Error, Duration) + Send + Sync + 'static,
    {
        self.notify = Some(Arc::new(notify));
        self
    }

    /// Open read-only.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<O::Handle, OpenError> {
        self.open_raw(path, OpenFlags::READ_ONLY, 0)
    }

    /// Open read/write, creating or truncating, with `DEFAULT_CREATE_MODE`.
    pub fn create(&self, path: impl AsRef<Path>) -> Result<O::Handle, OpenError> {
        self.open_raw(path, OpenFlags::CREATE_TRUNCATE, DEFAULT_CREATE_MODE)
    }

    /// Open with explicit flags and permission bits, retrying on descriptor exhaustion.
    pub fn open_raw(
        &self,
        path: impl AsRef<Path>,
        flags: OpenFlags,
        mode: u32,
    ) -> Result<O::Handle, OpenError> {
        let path = path.as_ref();
        let cancel = self.cancel.clone().unwrap_or_default();
        let sequence: Box<dyn Backoff> = match &self.backoff {
            Some(factory) => factory(),
            None => (backoff::default_factory())(),
        };
        let sequence = sequence.with_cancel(cancel.clone());
        let notify = self.notify.as_deref();

        let _span = tracing::debug_span!("safe_open", path = %path.display()).entered();
        run_with_retry(
            sequence,
            &cancel,
            |e: &io::Error, delay| {
                if let Some(notify) = notify {
                    notify(e, delay);
                }
            },
            || {
                self.raw.open(path, flags, mode).map_err(|e| match classify(&e) {
                    ErrorKind::Retryable => Failure::Retryable(e),
                    ErrorKind::Permanent => Failure::Permanent(e),
                })
            },
        )
        .map_err(|e| OpenError::from_retry(path, e))
    }
}
