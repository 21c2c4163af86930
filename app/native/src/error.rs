//! Error types for barik.
//!
//! The spaces core never surfaces errors to its consumer; backends and the
//! command runner use [`BarikError`] internally and collapse it to `None` at
//! the trait boundary. The CLI reports it to the user.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::platform::ipc::IpcError;

/// Errors that can occur during application execution.
///
/// Serializes as `{"kind": "...", "message": "..."}` so JSON output of the
/// CLI carries structured errors.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum BarikError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IPC communication error.
    #[error("IPC error: {0}")]
    IpcError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// No supported window manager is running.
    #[error("No supported window manager is running (expected yabai or AeroSpace)")]
    NoBackend,
    /// Shell command execution failed.
    #[error("Shell error: {0}")]
    ShellError(String),
    /// Window manager output could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for BarikError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for BarikError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err.to_string()) }
}

impl From<ConfigError> for BarikError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<IpcError> for BarikError {
    fn from(err: IpcError) -> Self { Self::IpcError(err.to_string()) }
}

impl From<String> for BarikError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for BarikError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
