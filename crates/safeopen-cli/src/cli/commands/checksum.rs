//! Checksum command: SHA-256 of a file opened through the retrying opener.

use anyhow::{Context, Result};
use safeopen_core::{checksum, Opener};
use std::path::PathBuf;

/// Compute and print SHA-256 of the given file.
pub async fn run_checksum(opener: Opener, path: PathBuf) -> Result<()> {
    let digest = tokio::task::spawn_blocking({
        let path = path.clone();
        move || checksum::sha256_path(&opener, &path)
    })
    .await
    .context("checksum task join")??;
    println!("{}  {}", digest, path.display());
    Ok(())
}
