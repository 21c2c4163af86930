//! The window manager backend contract.
//!
//! Every concrete backend implements [`SpacesBackend`]. The pull operation is
//! mandatory; switching and event delivery are optional capabilities that a
//! backend declares up front through [`Capabilities`] instead of being
//! discovered at runtime. Operations a backend does not support fall back to
//! the trait's no-op defaults.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;

use super::types::Space;

/// Sending half of a backend's snapshot stream.
pub type SpacesSender = mpsc::UnboundedSender<Vec<Space>>;

/// Receiving half of a backend's snapshot stream.
pub type SpacesReceiver = mpsc::UnboundedReceiver<Vec<Space>>;

/// Window managers barik knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    /// yabai, queried by polling its CLI.
    Yabai,
    /// `AeroSpace`, refreshed when its callbacks notify barik.
    AeroSpace,
}

impl BackendKind {
    /// Name of the window manager process, compared case-insensitively.
    #[must_use]
    pub const fn process_name(self) -> &'static str {
        match self {
            Self::Yabai => "yabai",
            Self::AeroSpace => "aerospace",
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Yabai => "yabai",
            Self::AeroSpace => "AeroSpace",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.display_name()) }
}

/// Optional capabilities of a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Supports `focus_space` and `focus_window`.
    pub switchable: bool,
    /// Pushes snapshots through `start_observing` instead of being polled.
    pub event_based: bool,
}

impl Capabilities {
    /// Pull only.
    pub const PULL_ONLY: Self = Self { switchable: false, event_based: false };

    /// Polled backend that can switch spaces and windows.
    pub const POLLING_SWITCHABLE: Self = Self { switchable: true, event_based: false };

    /// Event-driven backend that can switch spaces and windows.
    pub const EVENT_SWITCHABLE: Self = Self { switchable: true, event_based: true };
}

/// A window manager backend.
///
/// Implementations must never panic on communication failures: the pull
/// returns `None` and commands are best-effort.
pub trait SpacesBackend: Send + Sync + 'static {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Capabilities of this backend. Must return the same value on every call.
    fn capabilities(&self) -> Capabilities;

    /// Returns all spaces with their windows, or `None` when the window
    /// manager could not be reached.
    fn spaces_with_windows(&self) -> Option<Vec<Space>>;

    /// Focuses a space, optionally also focusing a window inside it.
    fn focus_space(&self, _space_id: &str, _need_window_focus: bool) {}

    /// Focuses a window.
    fn focus_window(&self, _window_id: u32) {}

    /// Starts pushing full snapshots into `sink`.
    fn start_observing(&self, _sink: SpacesSender) {}

    /// Stops pushing snapshots and releases the sink.
    fn stop_observing(&self) {}
}
