//! CLI for the safeopen retrying opener.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use safeopen_core::config::{self, SafeOpenConfig};
use safeopen_core::{CancelToken, Opener};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_checksum, run_completions, run_create, run_exhaust, run_open};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "safeopen")]
#[command(about = "Open files without failing on EMFILE/ENFILE", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/safeopen/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop retrying after this many milliseconds (default: retry until Ctrl-C).
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Open a file read-only and print its size.
    Open {
        /// Path to the file.
        path: PathBuf,
    },

    /// Create (or truncate) a file.
    Create {
        /// Path to the file.
        path: PathBuf,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Fill the descriptor table, then open a file and watch the retries (Unix only).
    Exhaust {
        /// File to hold open and then open again.
        #[arg(default_value = "/dev/null")]
        path: PathBuf,

        /// Soft RLIMIT_NOFILE to lower to before filling the table.
        #[arg(long, default_value = "16", value_name = "N")]
        limit: u64,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Error returned when Ctrl-C ends a command.
#[derive(Debug)]
pub struct Interrupted;

impl std::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Cancel token for a CLI run: optional deadline, also fired on interrupt.
fn cancel_token(timeout_ms: Option<u64>) -> CancelToken {
    match timeout_ms {
        Some(ms) => CancelToken::with_timeout(Duration::from_millis(ms)),
        None => CancelToken::new(),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run `command` until it finishes or `interrupt` resolves. On interrupt the
/// token is fired and `Interrupted` returned right away, without waiting for
/// a blocking open or read still in progress.
async fn run_interruptible<C, I>(command: C, interrupt: I, token: CancelToken) -> Result<()>
where
    C: Future<Output = Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        res = command => res,
        () = interrupt => {
            tracing::info!("interrupted, cancelling retries");
            token.cancel();
            Err(Interrupted.into())
        }
    }
}

/// Opener from config, bounded by `token`, reporting each retry on stderr.
fn build_opener(cfg: &SafeOpenConfig, token: CancelToken) -> Opener {
    Opener::from_config(cfg)
        .with_cancel(token)
        .with_notifier(|e, delay| {
            eprintln!("safeopen: {}; retrying in {:?}", e, delay);
        })
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell);
        }

        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let token = cancel_token(cli.timeout_ms);
        let opener = build_opener(&cfg, token.clone());

        let command = async move {
            match cli.command {
                CliCommand::Open { path } => run_open(opener, path).await,
                CliCommand::Create { path } => run_create(opener, path).await,
                CliCommand::Checksum { path } => run_checksum(opener, path).await,
                CliCommand::Exhaust { path, limit } => run_exhaust(opener, path, limit).await,
                CliCommand::Completions { .. } => Ok(()),
            }
        };
        run_interruptible(command, ctrl_c(), token).await
    }
}

#[cfg(test)]
mod tests;
