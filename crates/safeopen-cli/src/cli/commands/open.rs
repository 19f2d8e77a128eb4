//! `safeopen open <path>`: open read-only, retrying on descriptor exhaustion.

use anyhow::{Context, Result};
use safeopen_core::Opener;
use std::path::PathBuf;

pub async fn run_open(opener: Opener, path: PathBuf) -> Result<()> {
    let len = tokio::task::spawn_blocking({
        let path = path.clone();
        move || -> Result<u64> {
            let f = opener.open(&path)?;
            let meta = f
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?;
            Ok(meta.len())
        }
    })
    .await
    .context("open task join")??;
    println!("opened {} ({} bytes)", path.display(), len);
    Ok(())
}
