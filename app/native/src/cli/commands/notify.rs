//! Notification commands for a running `AeroSpace` backend.

use clap::ValueEnum;

use crate::config;
use crate::error::BarikError;
use crate::platform::ipc::{self, Notification};

/// Events `barik notify` can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifyEvent {
    /// The focused workspace changed.
    WorkspaceChanged,
    /// The focused window changed.
    FocusChanged,
    /// Check that a backend is listening.
    Ping,
}

impl From<NotifyEvent> for Notification {
    fn from(event: NotifyEvent) -> Self {
        match event {
            NotifyEvent::WorkspaceChanged => Self::WorkspaceChanged,
            NotifyEvent::FocusChanged => Self::FocusChanged,
            NotifyEvent::Ping => Self::Ping,
        }
    }
}

/// Sends `event` to the socket from the configuration, or the default one.
///
/// # Errors
///
/// Returns an error if no backend is listening or it rejects the message.
pub fn execute(event: NotifyEvent) -> Result<(), BarikError> {
    let socket = config::get_config()
        .spaces
        .notification_socket_path(config::get_config_dir())
        .unwrap_or_else(ipc::default_socket_path);

    ipc::send_notification(&socket, event.into())?;
    Ok(())
}
