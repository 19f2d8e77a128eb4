//! Error returned by the retrying opener.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::retry::{self, RetryError};

/// Terminal error of an open call. The OS error from the last attempt is kept
/// as the source.
#[derive(Debug, Error)]
pub enum OpenError {
    /// Not a descriptor-exhaustion failure (not found, permission, ...). Never retried.
    #[error("open {}: {source}", .path.display())]
    Permanent {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },
    /// The backoff stopped handing out delays while descriptors were still exhausted.
    #[error("open {}: gave up after {attempts} attempts: {source}", .path.display())]
    Exhausted {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },
    /// The cancel token fired while retrying.
    #[error("open {}: cancelled after {attempts} attempts: {source}", .path.display())]
    Cancelled {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },
}

impl OpenError {
    pub(crate) fn from_retry(path: &Path, e: RetryError<io::Error>) -> Self {
        let path = path.to_path_buf();
        match e {
            RetryError::Permanent { error, attempts } => OpenError::Permanent {
                path,
                attempts,
                source: error,
            },
            RetryError::Exhausted { error, attempts } => OpenError::Exhausted {
                path,
                attempts,
                source: error,
            },
            RetryError::Cancelled { error, attempts } => OpenError::Cancelled {
                path,
                attempts,
                source: error,
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            OpenError::Permanent { path, .. }
            | OpenError::Exhausted { path, .. }
            | OpenError::Cancelled { path, .. } => path,
        }
    }

    /// Attempts made, including the first.
    pub fn attempts(&self) -> u32 {
        match self {
            OpenError::Permanent { attempts, .. }
            | OpenError::Exhausted { attempts, .. }
            | OpenError::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// OS error of the last attempt.
    pub fn io_error(&self) -> &io::Error {
        match self {
            OpenError::Permanent { source, .. }
            | OpenError::Exhausted { source, .. }
            | OpenError::Cancelled { source, .. } => source,
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, OpenError::Permanent { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, OpenError::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OpenError::Cancelled { .. })
    }

    /// True if the last attempt failed with EMFILE/ENFILE.
    pub fn is_descriptor_exhaustion(&self) -> bool {
        retry::is_descriptor_exhaustion(self.io_error())
    }
}

impl From<OpenError> for io::Error {
    fn from(e: OpenError) -> Self {
        let kind = if e.is_cancelled() {
            io::ErrorKind::Interrupted
        } else {
            e.io_error().kind()
        };
        io::Error::new(kind, e)
    }
}
