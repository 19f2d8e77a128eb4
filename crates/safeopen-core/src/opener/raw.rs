//! The underlying, non-retrying open call.

use std::fs::File;
use std::io;
use std::path::Path;

use super::flags::OpenFlags;

/// A single open attempt. Implementations must not retry on their own.
pub trait RawOpen: Send + Sync {
    type Handle;

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32) -> io::Result<Self::Handle>;
}

/// Opens through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdOpen;

impl RawOpen for StdOpen {
    type Handle = File;

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32) -> io::Result<File> {
        flags.to_options(mode).open(path)
    }
}
