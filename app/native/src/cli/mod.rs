//! CLI module for AlbumPaper.
//!
//! Without a subcommand the binary runs the poller; the other commands are
//! one-shot helpers around the same configuration.

mod commands;
mod output;

use clap::Parser;
pub use commands::{Cli, Commands};
use tracing_subscriber::EnvFilter;

use crate::error::AlbumPaperError;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "albumpaper=info,albumpaper_lib=info";

/// Log filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_LOG_FILTER: &str = "albumpaper=debug,albumpaper_lib=debug";

/// Installs the global `tracing` subscriber. Later calls are ignored.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), AlbumPaperError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.execute()
}
