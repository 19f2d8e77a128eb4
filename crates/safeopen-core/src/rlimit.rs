//! Descriptor pressure helpers (Unix): lower `RLIMIT_NOFILE` and fill the table.
//!
//! Used to reproduce EMFILE on demand, in tests and in `safeopen exhaust`.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::retry::is_descriptor_exhaustion;

fn get_nofile() -> io::Result<libc::rlimit> {
    let mut rlim = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let r = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) };
    if r != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(rlim)
}

/// Current soft limit on open descriptors.
pub fn nofile_limit() -> io::Result<u64> {
    Ok(get_nofile()?.rlim_cur as u64)
}

/// Lower the soft descriptor limit to `desired`. Never raises it.
/// Returns the limit now in effect.
pub fn lower_nofile_limit(desired: u64) -> io::Result<u64> {
    let mut rlim = get_nofile()?;
    if desired as libc::rlim_t >= rlim.rlim_cur {
        return Ok(rlim.rlim_cur as u64);
    }
    rlim.rlim_cur = desired as libc::rlim_t;
    let r = unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &rlim) };
    if r != 0 {
        return Err(io::Error::last_os_error());
    }
    tracing::debug!(limit = desired, "lowered RLIMIT_NOFILE");
    Ok(desired)
}

/// Open `path` read-only up to `max` times, stopping early when the
/// descriptor table is full. Any other error closes everything opened so far.
pub fn consume_descriptors(path: &Path, max: u64) -> io::Result<Vec<File>> {
    let mut held = Vec::new();
    for _ in 0..max {
        match File::open(path) {
            Ok(f) => held.push(f),
            Err(e) if is_descriptor_exhaustion(&e) => break,
            Err(e) => return Err(e),
        }
    }
    tracing::debug!(held = held.len(), "consumed descriptors");
    Ok(held)
}
