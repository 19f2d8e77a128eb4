use safeopen_core::logging;

mod cli;

use crate::cli::{CliCommand, Interrupted};

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; a full descriptor table should not stop the CLI.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    // Exit directly: a blocking open or read may still be running after an interrupt,
    // and returning would wait for it.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("safeopen error: {:#}", err);
        let code = if err.is::<Interrupted>() { 130 } else { 1 };
        std::process::exit(code);
    }
}
