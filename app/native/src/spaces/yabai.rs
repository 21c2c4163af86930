//! yabai backend.
//!
//! yabai has no push channel barik can subscribe to without extra user
//! setup, so it is polled through `yabai -m query`. Spaces are identified by
//! their mission-control index.

use serde::Deserialize;

use super::backend::{Capabilities, SpacesBackend};
use super::types::{Space, Window};
use crate::error::BarikError;
use crate::utils::command::ResolvedBinary;

/// A space as printed by `yabai -m query --spaces`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct YabaiSpace {
    index: u32,
    // Older releases print `focused` instead.
    #[serde(default, alias = "focused")]
    has_focus: bool,
}

/// A window as printed by `yabai -m query --windows`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct YabaiWindow {
    id: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    app: String,
    #[serde(default)]
    space: u32,
    #[serde(default, alias = "focused")]
    has_focus: bool,
    #[serde(default)]
    is_hidden: bool,
    #[serde(default)]
    is_minimized: bool,
    #[serde(default)]
    is_sticky: bool,
}

impl YabaiWindow {
    /// Hidden and minimized windows are not on screen. Sticky windows show
    /// on every space and would be listed everywhere.
    const fn is_listed(&self) -> bool { !self.is_hidden && !self.is_minimized && !self.is_sticky }

    fn into_window(self) -> Window {
        let window = Window::new(self.id, self.title).focused(self.has_focus);
        if self.app.is_empty() { window } else { window.with_app_name(self.app) }
    }
}

/// Joins the space and window listings into the unified model.
///
/// Spaces keep yabai's order; windows inside a space are ordered by ID so
/// consecutive polls produce identical snapshots.
fn build_spaces(spaces: Vec<YabaiSpace>, windows: Vec<YabaiWindow>) -> Vec<Space> {
    let mut windows: Vec<YabaiWindow> =
        windows.into_iter().filter(YabaiWindow::is_listed).collect();
    windows.sort_by_key(|window| window.id);

    spaces
        .into_iter()
        .map(|space| {
            let members = windows
                .iter()
                .filter(|window| window.space == space.index)
                .cloned()
                .map(YabaiWindow::into_window)
                .collect();
            Space::new(space.index.to_string(), space.has_focus, members)
        })
        .collect()
}

/// Polling, switchable backend for yabai.
#[derive(Debug)]
pub struct YabaiBackend {
    binary: ResolvedBinary,
}

impl YabaiBackend {
    /// Creates a backend talking to `binary` (a name or a path).
    pub fn new(binary: impl Into<String>) -> Self { Self { binary: ResolvedBinary::new(binary) } }

    fn query(&self) -> Result<Vec<Space>, BarikError> {
        let spaces: Vec<YabaiSpace> = self.binary.run_json(&["-m", "query", "--spaces"])?;
        let windows: Vec<YabaiWindow> = self.binary.run_json(&["-m", "query", "--windows"])?;
        Ok(build_spaces(spaces, windows))
    }

    fn first_window_of(&self, space_id: &str) -> Result<Option<u32>, BarikError> {
        let windows: Vec<YabaiWindow> =
            self.binary.run_json(&["-m", "query", "--windows", "--space", space_id])?;
        Ok(windows.iter().filter(|window| window.is_listed()).map(|window| window.id).min())
    }

    fn focus_space_inner(&self, space_id: &str, need_window_focus: bool) -> Result<(), BarikError> {
        self.binary.run(&["-m", "space", "--focus", space_id])?;

        if need_window_focus && let Some(window_id) = self.first_window_of(space_id)? {
            self.binary.run(&["-m", "window", "--focus", &window_id.to_string()])?;
        }

        Ok(())
    }
}

impl SpacesBackend for YabaiBackend {
    fn name(&self) -> &'static str { "yabai" }

    fn capabilities(&self) -> Capabilities { Capabilities::POLLING_SWITCHABLE }

    fn spaces_with_windows(&self) -> Option<Vec<Space>> {
        self.query()
            .inspect_err(|err| tracing::debug!(error = %err, "yabai: query failed"))
            .ok()
    }

    fn focus_space(&self, space_id: &str, need_window_focus: bool) {
        if let Err(err) = self.focus_space_inner(space_id, need_window_focus) {
            tracing::warn!(space = space_id, error = %err, "yabai: failed to focus space");
        }
    }

    fn focus_window(&self, window_id: u32) {
        if let Err(err) = self.binary.run(&["-m", "window", "--focus", &window_id.to_string()]) {
            tracing::warn!(window = window_id, error = %err, "yabai: failed to focus window");
        }
    }
}
