//! `safeopen create <path>`: create or truncate, retrying on descriptor exhaustion.

use anyhow::{Context, Result};
use safeopen_core::Opener;
use std::path::PathBuf;

pub async fn run_create(opener: Opener, path: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking({
        let path = path.clone();
        move || opener.create(&path).map(drop)
    })
    .await
    .context("create task join")??;
    println!("created {}", path.display());
    Ok(())
}
