mod app;
mod backup;
mod bootstrap;
mod browser;
mod cli;
mod config;
mod consts;
mod error;
mod storage;
mod utils;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::BackupError;
use utils::InterruptFlag;

/// Conventional exit status for a run stopped with Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    Cli::parse();
    init_tracing();

    let interrupt = match InterruptFlag::install() {
        Ok(flag) => flag,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&interrupt) {
        Ok(summary) => {
            match &summary.folder {
                Some(folder) => info!(
                    "Backup complete! {} of {} songs uploaded to {} ({} skipped)",
                    summary.uploaded, summary.discovered, folder.name, summary.skipped
                ),
                None => info!("Nothing to back up"),
            }
            ExitCode::SUCCESS
        }
        Err(BackupError::Interrupted) => {
            warn!("Backup interrupted by user.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("Backup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("song_backup=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}
