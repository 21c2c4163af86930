//! `AeroSpace` backend.
//!
//! `AeroSpace` is queried through its CLI, but instead of being polled it is
//! refreshed when its `exec-on-workspace-change` and `on-focus-changed`
//! callbacks run `barik notify`. Those notifications arrive on the
//! notification socket; each one triggers a full re-fetch that is pushed to
//! the engine.
//!
//! ```toml
//! # ~/.aerospace.toml
//! exec-on-workspace-change = ['/bin/bash', '-c', 'barik notify workspace-changed']
//! on-focus-changed = ['exec-and-forget barik notify focus-changed']
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

use parking_lot::Mutex;
use serde::Deserialize;

use super::backend::{Capabilities, SpacesBackend, SpacesSender};
use super::types::{Space, Window, sort_spaces};
use crate::error::BarikError;
use crate::platform::ipc::{Notification, NotificationServer};
use crate::platform::thread::spawn_named_thread;
use crate::utils::command::ResolvedBinary;

/// Output format requested from `list-windows`.
const WINDOW_FORMAT: &str = "%{window-id} %{app-name} %{window-title} %{workspace}";

#[derive(Debug, Clone, Deserialize)]
struct AeroWorkspace {
    workspace: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AeroWindow {
    window_id: u32,
    #[serde(default)]
    app_name: String,
    #[serde(default)]
    window_title: String,
    #[serde(default)]
    workspace: Option<String>,
}

/// Joins the workspace and window listings into the unified model.
///
/// Workspaces without windows are dropped unless focused, since `AeroSpace`
/// lists every persistent workspace. Windows keep `AeroSpace`'s order.
fn build_spaces(
    workspaces: Vec<AeroWorkspace>,
    windows: &[AeroWindow],
    focused_workspace: Option<&str>,
    focused_window: Option<u32>,
) -> Vec<Space> {
    let mut spaces: Vec<Space> = workspaces
        .into_iter()
        .filter_map(|workspace| {
            let name = workspace.workspace;
            let members: Vec<Window> = windows
                .iter()
                .filter(|window| window.workspace.as_deref() == Some(name.as_str()))
                .map(|window| {
                    let entry = Window::new(window.window_id, window.window_title.clone())
                        .focused(focused_window == Some(window.window_id));
                    if window.app_name.is_empty() {
                        entry
                    } else {
                        entry.with_app_name(window.app_name.clone())
                    }
                })
                .collect();

            let is_focused = focused_workspace == Some(name.as_str());
            (is_focused || !members.is_empty()).then(|| Space::new(name, is_focused, members))
        })
        .collect();

    sort_spaces(&mut spaces);
    spaces
}

/// The CLI side of the backend, shared with the refresh thread.
#[derive(Debug)]
struct AeroSpaceClient {
    binary: ResolvedBinary,
}

impl AeroSpaceClient {
    fn query(&self) -> Result<Vec<Space>, BarikError> {
        let workspaces: Vec<AeroWorkspace> =
            self.binary.run_json(&["list-workspaces", "--all", "--json"])?;
        let windows: Vec<AeroWindow> = self.binary.run_json(&[
            "list-windows",
            "--all",
            "--json",
            "--format",
            WINDOW_FORMAT,
        ])?;

        // Focus is decoration; a failed focus query must not blank the snapshot.
        let focused_workspace: Vec<AeroWorkspace> = self
            .binary
            .run_json(&["list-workspaces", "--focused", "--json"])
            .inspect_err(|err| tracing::debug!(error = %err, "aerospace: focus query failed"))
            .unwrap_or_default();
        // No window is focused on an empty workspace; that is not an error.
        let focused_window: Vec<AeroWindow> = self
            .binary
            .run_json(&["list-windows", "--focused", "--json"])
            .unwrap_or_default();

        Ok(build_spaces(
            workspaces,
            &windows,
            focused_workspace.first().map(|w| w.workspace.as_str()),
            focused_window.first().map(|w| w.window_id),
        ))
    }

    fn snapshot(&self) -> Option<Vec<Space>> {
        self.query()
            .inspect_err(|err| tracing::debug!(error = %err, "aerospace: query failed"))
            .ok()
    }

    fn switch_workspace(&self, name: &str) -> Result<(), BarikError> {
        // `aerospace workspace` wants a terminal when run from a GUI context.
        #[cfg(target_os = "macos")]
        {
            let binary = self.binary.path().to_string_lossy().into_owned();
            crate::utils::command::run_command(
                Path::new("/usr/bin/script"),
                &["-q", "-t", "0", "/dev/null", &binary, "workspace", name],
            )?;
        }

        #[cfg(not(target_os = "macos"))]
        self.binary.run(&["workspace", name])?;

        Ok(())
    }

    fn focus_window(&self, window_id: u32) -> Result<(), BarikError> {
        self.binary.run(&["focus", "--window-id", &window_id.to_string()])?;
        Ok(())
    }

    fn first_window_of(&self, name: &str) -> Result<Option<u32>, BarikError> {
        let windows: Vec<AeroWindow> =
            self.binary.run_json(&["list-windows", "--workspace", name, "--json"])?;
        Ok(windows.first().map(|window| window.window_id))
    }
}

/// Event-driven, switchable backend for `AeroSpace`.
pub struct AeroSpaceBackend {
    client: Arc<AeroSpaceClient>,
    socket_path: PathBuf,
    server: Mutex<Option<NotificationServer>>,
}

impl AeroSpaceBackend {
    /// Creates a backend talking to `binary` and listening on `socket_path`.
    pub fn new(binary: impl Into<String>, socket_path: PathBuf) -> Self {
        Self {
            client: Arc::new(AeroSpaceClient { binary: ResolvedBinary::new(binary) }),
            socket_path,
            server: Mutex::new(None),
        }
    }

    /// Socket the backend listens on while observed.
    #[must_use]
    pub fn socket_path(&self) -> &Path { &self.socket_path }
}

/// Re-fetches and pushes a snapshot for every queued request.
///
/// Requests that pile up while a fetch runs are coalesced into one fetch.
/// Exits once every request sender is gone or the sink is closed.
fn refresh_loop(client: &AeroSpaceClient, requests: &mpsc::Receiver<()>, sink: &SpacesSender) {
    while requests.recv().is_ok() {
        while requests.try_recv().is_ok() {}

        let spaces = client.snapshot().unwrap_or_default();
        if sink.send(spaces).is_err() {
            tracing::trace!("aerospace: observer is gone, stopping refresh loop");
            break;
        }
    }
}

impl SpacesBackend for AeroSpaceBackend {
    fn name(&self) -> &'static str { "aerospace" }

    fn capabilities(&self) -> Capabilities { Capabilities::EVENT_SWITCHABLE }

    fn spaces_with_windows(&self) -> Option<Vec<Space>> { self.client.snapshot() }

    fn focus_space(&self, space_id: &str, need_window_focus: bool) {
        let result = self.client.switch_workspace(space_id).and_then(|()| {
            if need_window_focus && let Some(window_id) = self.client.first_window_of(space_id)? {
                self.client.focus_window(window_id)?;
            }
            Ok(())
        });

        if let Err(err) = result {
            tracing::warn!(space = space_id, error = %err, "aerospace: failed to focus workspace");
        }
    }

    fn focus_window(&self, window_id: u32) {
        if let Err(err) = self.client.focus_window(window_id) {
            tracing::warn!(window = window_id, error = %err, "aerospace: failed to focus window");
        }
    }

    fn start_observing(&self, sink: SpacesSender) {
        let mut server = self.server.lock();
        if server.is_some() {
            tracing::warn!("aerospace: already observing");
            return;
        }

        let (requests, pending) = mpsc::channel::<()>();
        // Initial snapshot.
        let _ = requests.send(());

        let client = Arc::clone(&self.client);
        spawn_named_thread("aerospace-refresh", move || refresh_loop(&client, &pending, &sink));

        let started = NotificationServer::start(self.socket_path.clone(), move |notification| {
            if notification != Notification::Ping {
                let _ = requests.send(());
            }
        });

        match started {
            Ok(started) => {
                tracing::info!(
                    socket = %self.socket_path.display(),
                    "aerospace: listening for workspace notifications"
                );
                *server = Some(started);
            }
            Err(err) => tracing::warn!(
                socket = %self.socket_path.display(),
                error = %err,
                "aerospace: failed to start notification socket, updates will not arrive"
            ),
        }
    }

    fn stop_observing(&self) {
        if let Some(server) = self.server.lock().take() {
            server.stop();
            tracing::debug!("aerospace: stopped observing");
        }
    }
}

impl std::fmt::Debug for AeroSpaceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AeroSpaceBackend")
            .field("binary", &self.client.binary.name())
            .field("socket_path", &self.socket_path)
            .field("observing", &self.server.lock().is_some())
            .finish()
    }
}
