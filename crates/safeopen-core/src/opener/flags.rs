//! Access flags for a single open request.

use std::fs::OpenOptions;

/// Permission bits used by `Opener::create` (before umask).
pub const DEFAULT_CREATE_MODE: u32 = 0o666;

/// What an open request asks for. Mirrors the `OpenOptions` vocabulary so a
/// request can be reissued identically on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
    pub create_new: bool,
}

impl OpenFlags {
    /// Read only; the file must exist.
    pub const READ_ONLY: Self = Self {
        read: true,
        write: false,
        append: false,
        truncate: false,
        create: false,
        create_new: false,
    };

    /// Read/write, created if missing, truncated if present.
    pub const CREATE_TRUNCATE: Self = Self {
        read: true,
        write: true,
        append: false,
        truncate: true,
        create: true,
        create_new: false,
    };

    /// Build `OpenOptions` for this request. `mode` only applies on Unix and
    /// only when the file gets created.
    pub fn to_options(&self, mode: u32) -> OpenOptions {
        let mut opts = OpenOptions::new();
        opts.read(self.read)
            .write(self.write)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        opts
    }
}
