//! Retry and backoff.
//!
//! This module holds error classification (descriptor exhaustion versus
//! everything else), the backoff strategies, and the generic retry loop the
//! opener is built on.

pub mod backoff;
mod classify;
mod error;
mod run;

pub use backoff::{Backoff, BackoffExt, BackoffFactory};
pub use classify::{classify, is_descriptor_exhaustion, ErrorKind};
pub use error::{Failure, RetryError};
pub use run::run_with_retry;
