//! SHA-256 of a file opened through the retrying opener.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

use crate::opener::{Opener, RawOpen};

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// The open waits out descriptor exhaustion per the opener's settings.
pub fn sha256_path<O>(opener: &Opener<O>, path: &Path) -> Result<String>
where
    O: RawOpen,
    O::Handle: Read,
{
    let mut f = opener.open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
