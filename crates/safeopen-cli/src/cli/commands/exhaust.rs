//! `safeopen exhaust`: reproduce EMFILE and watch the opener recover.
//!
//! Lowers the descriptor limit, fills the table with handles to `path`, then
//! opens `path` through an opener whose notifier releases one held handle per
//! retry.

use anyhow::{Context, Result};
use safeopen_core::Opener;
use std::path::PathBuf;

#[cfg(unix)]
struct Report {
    limit: u64,
    held: usize,
    retries: usize,
}

#[cfg(unix)]
fn exhaust_and_open(opener: Opener, path: PathBuf, limit: u64) -> Result<Report> {
    use anyhow::bail;
    use safeopen_core::rlimit;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    let limit = rlimit::lower_nofile_limit(limit).context("lower RLIMIT_NOFILE")?;
    let held = rlimit::consume_descriptors(&path, limit)
        .with_context(|| format!("fill descriptor table with {}", path.display()))?;
    if held.is_empty() {
        bail!("descriptor limit {} leaves nothing to consume", limit);
    }
    let held_count = held.len();

    let held = Arc::new(Mutex::new(held));
    let retries = Arc::new(AtomicUsize::new(0));
    let opener = {
        let held = Arc::clone(&held);
        let retries = Arc::clone(&retries);
        opener.with_notifier(move |e, delay| {
            let n = retries.fetch_add(1, Ordering::SeqCst) + 1;
            eprintln!("retry {}: {}; freeing one descriptor, waiting {:?}", n, e, delay);
            if let Ok(mut held) = held.lock() {
                held.pop();
            }
        })
    };

    let f = opener.open(&path)?;
    drop(f);
    if let Ok(mut held) = held.lock() {
        held.clear();
    }

    Ok(Report {
        limit,
        held: held_count,
        retries: retries.load(Ordering::SeqCst),
    })
}

#[cfg(unix)]
pub async fn run_exhaust(opener: Opener, path: PathBuf, limit: u64) -> Result<()> {
    let report = tokio::task::spawn_blocking({
        let path = path.clone();
        move || exhaust_and_open(opener, path, limit)
    })
    .await
    .context("exhaust task join")??;
    println!(
        "opened {} after {} retries (limit {}, {} descriptors held)",
        path.display(),
        report.retries,
        report.limit,
        report.held
    );
    Ok(())
}

#[cfg(not(unix))]
pub async fn run_exhaust(_opener: Opener, _path: PathBuf, _limit: u64) -> Result<()> {
    anyhow::bail!("exhaust needs RLIMIT_NOFILE and is only available on Unix")
}
