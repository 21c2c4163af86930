//! Uniform handle over the active backend.
//!
//! The engine never sees a concrete backend type. [`BackendHandle`] reads the
//! backend's capabilities once when it is created and turns every call on a
//! capability the backend lacks into a no-op.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::backend::{Capabilities, SpacesBackend, SpacesReceiver};
use super::types::Space;

/// Cheap-to-clone handle over a boxed [`SpacesBackend`].
#[derive(Clone)]
pub struct BackendHandle {
    backend: Arc<dyn SpacesBackend>,
    capabilities: Capabilities,
    observing: Arc<AtomicBool>,
}

impl BackendHandle {
    /// Wraps a backend.
    pub fn new<B: SpacesBackend>(backend: B) -> Self { Self::from_arc(Arc::new(backend)) }

    /// Wraps an already shared backend.
    #[must_use]
    pub fn from_arc(backend: Arc<dyn SpacesBackend>) -> Self {
        let capabilities = backend.capabilities();
        tracing::debug!(
            backend = backend.name(),
            switchable = capabilities.switchable,
            event_based = capabilities.event_based,
            "spaces: wrapped backend"
        );

        Self {
            backend,
            capabilities,
            observing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Name of the wrapped backend.
    #[must_use]
    pub fn name(&self) -> &'static str { self.backend.name() }

    /// Capabilities captured when the handle was created.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities { self.capabilities }

    /// Whether the backend pushes snapshots instead of being polled.
    #[must_use]
    pub const fn is_event_based(&self) -> bool { self.capabilities.event_based }

    /// Whether the backend can switch spaces and windows.
    #[must_use]
    pub const fn is_switchable(&self) -> bool { self.capabilities.switchable }

    /// Whether an event subscription is currently active.
    #[must_use]
    pub fn is_observing(&self) -> bool { self.observing.load(Ordering::SeqCst) }

    /// Pulls the current spaces. Blocks on the window manager.
    #[must_use]
    pub fn spaces_with_windows(&self) -> Option<Vec<Space>> { self.backend.spaces_with_windows() }

    /// Focuses a space. No-op when the backend cannot switch.
    pub fn focus_space(&self, space_id: &str, need_window_focus: bool) {
        if !self.capabilities.switchable {
            tracing::trace!(backend = self.name(), "spaces: focus_space not supported");
            return;
        }
        self.backend.focus_space(space_id, need_window_focus);
    }

    /// Focuses a window. No-op when the backend cannot switch.
    pub fn focus_window(&self, window_id: u32) {
        if !self.capabilities.switchable {
            tracing::trace!(backend = self.name(), "spaces: focus_window not supported");
            return;
        }
        self.backend.focus_window(window_id);
    }

    /// Starts the backend's snapshot stream.
    ///
    /// Returns `None` when the backend is not event based or a subscription
    /// is already active.
    #[must_use]
    pub fn start_observing(&self) -> Option<SpacesReceiver> {
        if !self.capabilities.event_based {
            return None;
        }

        if self.observing.swap(true, Ordering::SeqCst) {
            tracing::warn!(backend = self.name(), "spaces: backend is already being observed");
            return None;
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        self.backend.start_observing(sender);
        Some(receiver)
    }

    /// Stops the snapshot stream. Safe to call any number of times.
    pub fn stop_observing(&self) {
        if !self.capabilities.event_based {
            return;
        }

        if self.observing.swap(false, Ordering::SeqCst) {
            self.backend.stop_observing();
        }
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("backend", &self.name())
            .field("capabilities", &self.capabilities)
            .field("observing", &self.is_observing())
            .finish()
    }
}
