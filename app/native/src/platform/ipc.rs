//! Unix Domain Socket notifications from window manager callbacks.
//!
//! `AeroSpace` does not offer a push channel of its own. Instead, users point
//! its `exec-on-workspace-change` and `on-focus-changed` callbacks at
//! `barik notify ...`, which connects to the socket served by the running
//! `AeroSpace` backend and tells it to refresh.
//!
//! # Message Format
//!
//! One JSON object per line, tagged by `type`:
//!
//! ```json
//! {"type": "workspaceChanged"}
//! {"type": "focusChanged"}
//! {"type": "ping"}
//! ```
//!
//! Every message is answered with `{"ok": true}` or
//! `{"ok": false, "error": "..."}`.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::get_cache_dir;
use crate::platform::thread::spawn_named_thread;

/// Socket filename within the cache directory.
const SOCKET_FILENAME: &str = "barik.sock";

/// Timeout for socket reads and writes in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Notifications that can be sent to a running backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    /// The focused workspace changed.
    WorkspaceChanged,
    /// The focused window changed.
    FocusChanged,
    /// Liveness check; never triggers a refresh.
    Ping,
}

/// Acknowledgement written back for every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    const fn ok() -> Self { Self { ok: true, error: None } }

    fn error(message: impl Into<String>) -> Self {
        Self { ok: false, error: Some(message.into()) }
    }
}

/// Errors returned to the sending side.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Nothing is listening on the socket.
    #[error("no running barik instance is listening on {0}")]
    NotListening(PathBuf),

    /// The socket did not answer in time.
    #[error("timed out waiting for barik to answer")]
    Timeout,

    /// The answer could not be understood or reported an error.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default socket path inside the cache directory.
#[must_use]
pub fn default_socket_path() -> PathBuf { get_cache_dir().join(SOCKET_FILENAME) }

// ============================================================================
// Server (backend side)
// ============================================================================

/// Listens for notifications on a Unix socket and hands them to a callback.
///
/// Connections are served one at a time on a single background thread, so
/// the callback observes notifications in arrival order. Dropping the server
/// stops it.
pub struct NotificationServer {
    path: PathBuf,
    running: Arc<AtomicBool>,
}

impl NotificationServer {
    /// Binds `path` and starts serving.
    ///
    /// A stale socket file left behind by a previous run is removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn start<F>(path: PathBuf, handler: F) -> std::io::Result<Self>
    where F: Fn(Notification) + Send + 'static {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        remove_socket(&path);

        let listener = UnixListener::bind(&path)?;
        let running = Arc::new(AtomicBool::new(true));

        tracing::debug!(path = %path.display(), "ipc: listening for notifications");

        let loop_running = Arc::clone(&running);
        spawn_named_thread("ipc-server", move || {
            server_loop(&listener, &loop_running, &handler);
        });

        Ok(Self { path, running })
    }

    /// Path of the socket being served.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Whether the server is still accepting connections.
    #[must_use]
    pub fn is_running(&self) -> bool { self.running.load(Ordering::SeqCst) }

    /// Stops the server and removes the socket file. Idempotent.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        // Wake the blocking accept so the loop can observe the flag.
        let _ = UnixStream::connect(&self.path);
        remove_socket(&self.path);
        tracing::debug!(path = %self.path.display(), "ipc: notification server stopped");
    }
}

impl Drop for NotificationServer {
    fn drop(&mut self) { self.stop(); }
}

fn server_loop<F>(listener: &UnixListener, running: &AtomicBool, handler: &F)
where F: Fn(Notification) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match stream {
            Ok(stream) => {
                if let Some(notification) = handle_connection(stream) {
                    handler(notification);
                }
            }
            Err(err) => tracing::warn!(error = %err, "ipc: connection error"),
        }
    }
}

/// Reads one message, acknowledges it and returns it.
fn handle_connection(stream: UnixStream) -> Option<Notification> {
    let timeout = Some(Duration::from_millis(DEFAULT_TIMEOUT_MS));
    let _ = stream.set_read_timeout(timeout);
    let _ = stream.set_write_timeout(timeout);

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
        return None;
    }

    let (ack, notification) = match serde_json::from_str::<Notification>(line.trim()) {
        Ok(notification) => (Ack::ok(), Some(notification)),
        Err(err) => (Ack::error(format!("invalid message: {err}")), None),
    };

    let response = serde_json::to_string(&ack)
        .unwrap_or_else(|_| r#"{"ok":false,"error":"failed to serialize response"}"#.to_string());
    let mut stream = reader.into_inner();
    let _ = writeln!(stream, "{response}");

    notification
}

fn remove_socket(path: &Path) {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

// ============================================================================
// Client (CLI side)
// ============================================================================

/// Sends a notification and waits for the acknowledgement.
///
/// # Errors
///
/// Returns [`IpcError::NotListening`] when no server is bound to `path`,
/// [`IpcError::Timeout`] when it does not answer, and
/// [`IpcError::InvalidResponse`] when the answer is malformed or negative.
pub fn send_notification(path: &Path, notification: Notification) -> Result<(), IpcError> {
    if !path.exists() {
        return Err(IpcError::NotListening(path.to_path_buf()));
    }

    let mut stream = UnixStream::connect(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound => {
            IpcError::NotListening(path.to_path_buf())
        }
        _ => IpcError::Io(err),
    })?;

    let timeout = Some(Duration::from_millis(DEFAULT_TIMEOUT_MS));
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;

    let message = serde_json::to_string(&notification)
        .map_err(|err| IpcError::InvalidResponse(format!("failed to serialize message: {err}")))?;
    writeln!(stream, "{message}")?;

    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    reader.read_line(&mut response).map_err(|err| match err.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => IpcError::Timeout,
        _ => IpcError::Io(err),
    })?;

    let ack: Ack = serde_json::from_str(response.trim())
        .map_err(|err| IpcError::InvalidResponse(format!("failed to parse response: {err}")))?;

    if ack.ok {
        Ok(())
    } else {
        Err(IpcError::InvalidResponse(ack.error.unwrap_or_else(|| "unknown error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn socket_in(dir: &tempfile::TempDir) -> PathBuf { dir.path().join("barik-test.sock") }

    #[test]
    fn test_default_socket_path() {
        assert!(default_socket_path().to_string_lossy().ends_with(SOCKET_FILENAME));
    }

    #[test]
    fn test_notification_serialization() {
        let json = serde_json::to_string(&Notification::WorkspaceChanged).unwrap();
        assert_eq!(json, r#"{"type":"workspaceChanged"}"#);

        let parsed: Notification = serde_json::from_str(r#"{"type":"focusChanged"}"#).unwrap();
        assert_eq!(parsed, Notification::FocusChanged);
    }

    #[test]
    fn test_ack_serialization() {
        assert_eq!(serde_json::to_string(&Ack::ok()).unwrap(), r#"{"ok":true}"#);
        let json = serde_json::to_string(&Ack::error("nope")).unwrap();
        assert_eq!(json, r#"{"ok":false,"error":"nope"}"#);
    }

    #[test]
    fn test_send_without_server_reports_not_listening() {
        let dir = tempfile::tempdir().unwrap();
        let result = send_notification(&socket_in(&dir), Notification::Ping);
        assert!(matches!(result, Err(IpcError::NotListening(_))));
    }

    #[test]
    fn test_server_delivers_notifications_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_in(&dir);
        let (tx, rx) = mpsc::channel();

        let server = NotificationServer::start(path.clone(), move |n| {
            let _ = tx.send(n);
        })
        .unwrap();

        send_notification(&path, Notification::WorkspaceChanged).unwrap();
        send_notification(&path, Notification::FocusChanged).unwrap();

        let timeout = Duration::from_secs(2);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), Notification::WorkspaceChanged);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), Notification::FocusChanged);
        assert!(server.is_running());
    }

    #[test]
    fn test_server_rejects_invalid_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_in(&dir);
        let _server = NotificationServer::start(path.clone(), |_| {}).unwrap();

        let mut stream = UnixStream::connect(&path).unwrap();
        writeln!(stream, "not json").unwrap();
        let mut response = String::new();
        BufReader::new(stream).read_line(&mut response).unwrap();

        let ack: Ack = serde_json::from_str(response.trim()).unwrap();
        assert!(!ack.ok);
        assert!(ack.error.unwrap().contains("invalid message"));
    }

    #[test]
    fn test_stop_is_idempotent_and_removes_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_in(&dir);
        let server = NotificationServer::start(path.clone(), |_| {}).unwrap();
        assert!(path.exists());

        server.stop();
        server.stop();

        assert!(!server.is_running());
        assert!(!path.exists());
        assert!(send_notification(&path, Notification::Ping).is_err());
    }

    #[test]
    fn test_start_replaces_stale_socket_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_in(&dir);
        std::fs::write(&path, b"stale").unwrap();

        let _server = NotificationServer::start(path.clone(), |_| {}).unwrap();
        send_notification(&path, Notification::Ping).unwrap();
    }
}
