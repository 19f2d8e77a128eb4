//! EMFILE/ENFILE-safe alternatives to `File::open` and `File::create`.
//!
//! An [`Opener`] retries opens that fail because the descriptor table is full,
//! waiting between attempts per a pluggable backoff, until the open succeeds,
//! fails for another reason, or its [`CancelToken`] fires.

pub mod cancel;
pub mod checksum;
pub mod config;
pub mod logging;
pub mod opener;
pub mod retry;
#[cfg(unix)]
pub mod rlimit;

pub use cancel::{CancelToken, WaitOutcome};
pub use opener::{Notify, OpenError, OpenFlags, Opener, RawOpen, StdOpen};

use std::fs::File;
use std::path::Path;

/// `File::open` with the default opener: retries EMFILE/ENFILE every 100ms, forever.
pub fn open(path: impl AsRef<Path>) -> Result<File, OpenError> {
    Opener::new().open(path)
}

/// `File::create` with the default opener: retries EMFILE/ENFILE every 100ms, forever.
pub fn create(path: impl AsRef<Path>) -> Result<File, OpenError> {
    Opener::new().create(path)
}
