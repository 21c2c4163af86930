//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `spaces` - Watching, querying and focusing spaces
//! - `notify` - Notifications for a running `AeroSpace` backend

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::BarikError;
use crate::{config, schema};

pub mod notify;
pub mod spaces;

pub use notify::NotifyEvent;
pub use spaces::FocusArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// barik - spaces and window synchronization for yabai and `AeroSpace`.
#[derive(Parser, Debug)]
#[command(name = "barik")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// `BARIK_LOG` or `RUST_LOG` take precedence when set.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Watch the window manager and print every snapshot.
    ///
    /// This is the default when no command is given. Stops on Ctrl-C.
    Watch {
        /// Output in JSON format, one snapshot per line.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Print the current spaces and their windows once.
    #[command(after_long_help = r#"Examples:
  barik spaces          # Table of spaces and windows
  barik spaces --json   # Output as JSON"#)]
    Spaces {
        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Show which window manager backend was detected.
    Backend {
        /// Output in JSON format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Focus a space or a window.
    Focus(FocusArgs),

    /// Notify a running `AeroSpace` backend that its state changed.
    ///
    /// Meant to be called from `AeroSpace` callbacks:
    ///
    ///   exec-on-workspace-change = ['/bin/bash', '-c', 'barik notify workspace-changed']
    ///   on-focus-changed = ['exec-and-forget barik notify focus-changed']
    Notify {
        /// The event to report.
        #[arg(value_enum)]
        event: NotifyEvent,
    },

    /// Output barik configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(barik completions --shell zsh)"
    ///   barik completions --shell fish > ~/.config/fish/completions/barik.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), BarikError> {
        if let Some(path_buf) = self.config_path() {
            if !path_buf.exists() {
                return Err(BarikError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path_buf.display()
                )));
            }
            config::set_custom_config_path(path_buf);
        }

        match &self.command {
            None => spaces::execute_watch(false),
            Some(Commands::Watch { json }) => spaces::execute_watch(*json),
            Some(Commands::Spaces { json }) => spaces::execute_spaces(*json),
            Some(Commands::Backend { json }) => spaces::execute_backend(*json),
            Some(Commands::Focus(args)) => spaces::execute_focus(args),
            Some(Commands::Notify { event }) => notify::execute(*event),

            Some(Commands::Schema) => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Some(Commands::Completions { shell }) => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "barik", &mut io::stdout());
    }
}
