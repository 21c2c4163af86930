//! Platform plumbing shared by the spaces core and the CLI.
//!
//! - [`thread`] - named threads and the UI-thread dispatcher
//! - [`ipc`] - the notification socket fed by window manager callbacks
//! - [`path`] - expansion of user-provided paths

pub mod ipc;
pub mod path;
pub mod thread;

pub use ipc::{IpcError, Notification, NotificationServer, default_socket_path, send_notification};
pub use thread::{UiDispatcher, UiTask, UiThread, spawn_named_thread};
