//! The spaces synchronization engine.
//!
//! The engine owns the active backend and keeps an observable snapshot of
//! all spaces up to date. The operating mode is picked once, when the engine
//! is created:
//!
//! - **Polling**: a timer fires every poll interval and each tick pulls on the
//!   blocking pool. Ticks are independent; a slow pull never holds back the
//!   next one, so results may land out of tick order.
//! - **Event**: the backend pushes full snapshots, which are forwarded in
//!   emission order.
//! - **Idle**: no backend was detected; the snapshot stays empty.
//!
//! Every mutation of the snapshot happens on the UI thread through a
//! [`UiDispatcher`]. Once [`SpacesEngine::stop`] returns, nothing is
//! published anymore, including pulls that were still in flight.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use eyeball::{SharedObservable, Subscriber};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::backend::SpacesReceiver;
use super::detect::detect_backend;
use super::handle::BackendHandle;
use super::icons::{self, IconCache};
use super::types::{Space, Window, normalize_snapshot, same_snapshot};
use crate::config::SpacesConfig;
use crate::constants::{DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};
use crate::platform::thread::UiDispatcher;

/// How the engine keeps its snapshot current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineMode {
    /// No backend; nothing runs.
    Idle,
    /// The backend is pulled on a timer.
    Polling,
    /// The backend pushes snapshots.
    Event,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
            Self::Event => "event",
        })
    }
}

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Interval between pulls in polling mode.
    pub poll_interval: Duration,
    /// Attach application icons to windows before publishing.
    pub resolve_icons: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            resolve_icons: true,
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn from_config(config: &SpacesConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            resolve_icons: config.resolve_icons,
        }
    }

    fn icon_cache(self) -> Option<&'static IconCache> {
        self.resolve_icons.then(icons::global)
    }
}

/// Marshals snapshots onto the UI thread.
#[derive(Clone)]
struct Publisher {
    spaces: SharedObservable<Vec<Space>>,
    alive: Arc<Mutex<bool>>,
    ui: Arc<dyn UiDispatcher>,
}

impl Publisher {
    /// Schedules `spaces` to replace the snapshot.
    ///
    /// With `only_if_changed`, an identical snapshot does not wake
    /// subscribers. Icons count towards identity here.
    fn publish(&self, spaces: Vec<Space>, only_if_changed: bool) {
        let observable = self.spaces.clone();
        let alive = Arc::clone(&self.alive);

        self.ui.dispatch(Box::new(move || {
            // Held across the update so `stop` cannot slip in between.
            let alive = alive.lock();
            if !*alive {
                tracing::trace!("spaces: engine stopped, discarding snapshot");
                return;
            }

            if only_if_changed {
                if !same_snapshot(&observable.get(), &spaces) {
                    observable.set(spaces);
                }
            } else {
                observable.set(spaces);
            }
        }));
    }
}

/// Keeps the unified spaces snapshot in sync with the window manager.
pub struct SpacesEngine {
    backend: Option<BackendHandle>,
    mode: EngineMode,
    spaces: SharedObservable<Vec<Space>>,
    alive: Arc<Mutex<bool>>,
    runtime: Handle,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SpacesEngine {
    /// Creates the engine and starts polling or observing right away.
    ///
    /// `runtime` hosts the timer, the event forwarding and the blocking
    /// pulls and switch commands; `ui` is where the snapshot is mutated.
    pub fn new(
        backend: Option<BackendHandle>,
        ui: Arc<dyn UiDispatcher>,
        runtime: Handle,
        options: EngineOptions,
    ) -> Self {
        let mode = match &backend {
            None => EngineMode::Idle,
            Some(handle) if handle.is_event_based() => EngineMode::Event,
            Some(_) => EngineMode::Polling,
        };

        let spaces = SharedObservable::new(Vec::new());
        let alive = Arc::new(Mutex::new(true));
        let publisher = Publisher {
            spaces: spaces.clone(),
            alive: Arc::clone(&alive),
            ui,
        };

        let worker = match (&backend, mode) {
            (Some(handle), EngineMode::Polling) => Some(runtime.spawn(poll_loop(
                handle.clone(),
                publisher,
                options.poll_interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS)),
                options.icon_cache(),
            ))),
            (Some(handle), EngineMode::Event) => match handle.start_observing() {
                Some(receiver) => {
                    Some(runtime.spawn(event_loop(receiver, publisher, options.icon_cache())))
                }
                None => {
                    tracing::warn!(
                        backend = handle.name(),
                        "spaces: could not subscribe to backend"
                    );
                    None
                }
            },
            _ => None,
        };

        tracing::info!(
            backend = backend.as_ref().map_or("none", BackendHandle::name),
            mode = %mode,
            "spaces: engine started"
        );

        Self {
            backend,
            mode,
            spaces,
            alive,
            runtime,
            worker: Mutex::new(worker),
        }
    }

    /// Detects the running window manager and creates an engine for it.
    pub fn detect(
        config: &SpacesConfig,
        base_dir: Option<&Path>,
        ui: Arc<dyn UiDispatcher>,
        runtime: Handle,
    ) -> Self {
        let backend = detect_backend(config, base_dir);
        Self::new(backend, ui, runtime, EngineOptions::from_config(config))
    }

    /// The operating mode chosen at construction.
    #[must_use]
    pub const fn mode(&self) -> EngineMode { self.mode }

    /// Name of the active backend, if any.
    #[must_use]
    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(BackendHandle::name)
    }

    /// Whether the engine has not been stopped yet.
    #[must_use]
    pub fn is_running(&self) -> bool { *self.alive.lock() }

    /// Current snapshot, sorted by space identity.
    #[must_use]
    pub fn spaces(&self) -> Vec<Space> { self.spaces.get() }

    /// Subscribes to snapshot updates.
    ///
    /// The subscriber yields every snapshot published after this call;
    /// `Subscriber::get` returns the current one.
    #[must_use]
    pub fn subscribe(&self) -> Subscriber<Vec<Space>> { self.spaces.subscribe() }

    /// Focuses `space`, optionally also focusing a window inside it.
    ///
    /// Runs on the blocking pool and returns immediately. No-op without a
    /// switchable backend or after [`stop`](Self::stop).
    pub fn switch_to_space(&self, space: &Space, need_window_focus: bool) {
        let Some(backend) = self.switch_backend() else {
            return;
        };

        let space_id = space.id.clone();
        self.runtime.spawn_blocking(move || backend.focus_space(&space_id, need_window_focus));
    }

    /// Focuses `window`. Same contract as [`switch_to_space`](Self::switch_to_space).
    pub fn switch_to_window(&self, window: &Window) {
        let Some(backend) = self.switch_backend() else {
            return;
        };

        let window_id = window.id;
        self.runtime.spawn_blocking(move || backend.focus_window(window_id));
    }

    fn switch_backend(&self) -> Option<BackendHandle> {
        let backend = self.backend.as_ref()?;
        if !backend.is_switchable() || !self.is_running() {
            return None;
        }
        Some(backend.clone())
    }

    /// Stops the timer or the subscription. Safe to call more than once.
    ///
    /// Pulls already running are not interrupted, but their results are
    /// discarded.
    pub fn stop(&self) {
        {
            let mut alive = self.alive.lock();
            if !*alive {
                return;
            }
            *alive = false;
        }

        if let Some(worker) = self.worker.lock().take() {
            worker.abort();
        }

        if self.mode == EngineMode::Event
            && let Some(backend) = &self.backend
        {
            backend.stop_observing();
        }

        tracing::debug!(mode = %self.mode, "spaces: engine stopped");
    }
}

impl Drop for SpacesEngine {
    fn drop(&mut self) { self.stop(); }
}

impl fmt::Debug for SpacesEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpacesEngine")
            .field("backend", &self.backend_name())
            .field("mode", &self.mode)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Pulls one snapshot and brings it into published form.
fn pull_snapshot(backend: &BackendHandle, icons: Option<&IconCache>) -> Vec<Space> {
    let mut spaces = backend.spaces_with_windows().unwrap_or_default();
    if let Some(cache) = icons {
        cache.attach_icons(&mut spaces);
    }
    normalize_snapshot(spaces)
}

async fn poll_loop(
    backend: BackendHandle,
    publisher: Publisher,
    interval: Duration,
    icons: Option<&'static IconCache>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let backend = backend.clone();
        let publisher = publisher.clone();
        tokio::spawn(async move {
            match tokio::task::spawn_blocking(move || pull_snapshot(&backend, icons)).await {
                Ok(spaces) => publisher.publish(spaces, true),
                Err(err) => tracing::warn!(error = %err, "spaces: pull task failed"),
            }
        });
    }
}

async fn event_loop(
    mut receiver: SpacesReceiver,
    publisher: Publisher,
    icons: Option<&'static IconCache>,
) {
    while let Some(mut spaces) = receiver.recv().await {
        if let Some(cache) = icons {
            spaces = match tokio::task::spawn_blocking(move || {
                cache.attach_icons(&mut spaces);
                spaces
            })
            .await
            {
                Ok(spaces) => spaces,
                Err(err) => {
                    tracing::warn!(error = %err, "spaces: icon task failed");
                    continue;
                }
            };
        }

        publisher.publish(spaces, false);
    }

    tracing::debug!("spaces: backend event stream closed");
}
