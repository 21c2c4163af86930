//! Logging setup using tracing.
//!
//! Logs go to stderr so `--json` output on stdout stays machine-readable.
//! `BARIK_LOG` takes precedence over `RUST_LOG`; both accept the usual
//! `EnvFilter` directives.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BARIK_LOG";

/// Maps the number of `-v` flags to a level (0=warn, 1=info, 2=debug, 3+=trace).
#[must_use]
pub const fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    let directives = std::env::var(LOG_ENV).or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV));

    match directives {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::default().add_directive(level_for(verbosity).into()),
    }
}

/// Initializes the global tracing subscriber.
///
/// Calling it again is a no-op.
pub fn init(verbosity: u8) {
    let _ = fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}
