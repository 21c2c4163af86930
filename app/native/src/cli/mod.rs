//! CLI module for barik.
//!
//! `barik` without a subcommand watches the detected window manager and
//! prints every snapshot. The other commands query or drive the window
//! manager once and exit, or notify a running `AeroSpace` backend.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::BarikError;
use crate::logging;

/// Runs the CLI.
///
/// Parses command-line arguments, sets up logging and executes the
/// appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), BarikError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    cli.execute()
}
