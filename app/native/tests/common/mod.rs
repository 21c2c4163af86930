//! Shared fixtures: scripted backends and a counting UI dispatcher.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use barik_lib::platform::thread::{UiDispatcher, UiTask, UiThread};
use barik_lib::spaces::backend::{Capabilities, SpacesBackend, SpacesSender};
use barik_lib::spaces::engine::{EngineOptions, SpacesEngine};
use barik_lib::spaces::handle::BackendHandle;
use barik_lib::spaces::types::{Space, Window};
use eyeball::Subscriber;
use parking_lot::Mutex;

/// How long to wait for something that should happen.
pub const SETTLE: Duration = Duration::from_secs(2);

/// How long to wait before concluding that nothing happens.
pub const QUIET: Duration = Duration::from_millis(250);

/// A command routed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FocusSpace(String, bool),
    FocusWindow(u32),
}

/// A polled backend whose answer the test controls.
pub struct ScriptedBackend {
    capabilities: Capabilities,
    snapshot: Mutex<Option<Vec<Space>>>,
    delay: Duration,
    pulls: AtomicUsize,
    commands: Mutex<Vec<Command>>,
}

impl ScriptedBackend {
    pub fn new(snapshot: Option<Vec<Space>>) -> Arc<Self> {
        Self::build(Capabilities::POLLING_SWITCHABLE, snapshot, Duration::ZERO)
    }

    pub fn read_only(snapshot: Option<Vec<Space>>) -> Arc<Self> {
        Self::build(Capabilities::PULL_ONLY, snapshot, Duration::ZERO)
    }

    pub fn slow(snapshot: Option<Vec<Space>>, delay: Duration) -> Arc<Self> {
        Self::build(Capabilities::POLLING_SWITCHABLE, snapshot, delay)
    }

    fn build(
        capabilities: Capabilities,
        snapshot: Option<Vec<Space>>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            capabilities,
            snapshot: Mutex::new(snapshot),
            delay,
            pulls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        })
    }

    pub fn set_snapshot(&self, snapshot: Option<Vec<Space>>) { *self.snapshot.lock() = snapshot; }

    pub fn pulls(&self) -> usize { self.pulls.load(Ordering::SeqCst) }

    pub fn commands(&self) -> Vec<Command> { self.commands.lock().clone() }
}

impl SpacesBackend for ScriptedBackend {
    fn name(&self) -> &'static str { "scripted" }

    fn capabilities(&self) -> Capabilities { self.capabilities }

    fn spaces_with_windows(&self) -> Option<Vec<Space>> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.snapshot.lock().clone()
    }

    fn focus_space(&self, space_id: &str, need_window_focus: bool) {
        self.commands.lock().push(Command::FocusSpace(space_id.to_string(), need_window_focus));
    }

    fn focus_window(&self, window_id: u32) {
        self.commands.lock().push(Command::FocusWindow(window_id));
    }
}

/// An event backend that pushes whatever the test emits.
#[derive(Default)]
pub struct PushBackend {
    sink: Mutex<Option<SpacesSender>>,
    pulls: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl PushBackend {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    /// Pushes a snapshot; returns `false` when nobody is observing.
    pub fn emit(&self, spaces: Vec<Space>) -> bool {
        self.sink.lock().as_ref().is_some_and(|sink| sink.send(spaces).is_ok())
    }

    pub fn pulls(&self) -> usize { self.pulls.load(Ordering::SeqCst) }

    pub fn starts(&self) -> usize { self.starts.load(Ordering::SeqCst) }

    pub fn stops(&self) -> usize { self.stops.load(Ordering::SeqCst) }
}

impl SpacesBackend for PushBackend {
    fn name(&self) -> &'static str { "push" }

    fn capabilities(&self) -> Capabilities { Capabilities::EVENT_SWITCHABLE }

    fn spaces_with_windows(&self) -> Option<Vec<Space>> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        None
    }

    fn start_observing(&self, sink: SpacesSender) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock() = Some(sink);
    }

    fn stop_observing(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.sink.lock().take();
    }
}

/// Runs tasks on a [`UiThread`] and counts them.
pub struct CountingUi {
    thread: UiThread,
    dispatched: AtomicUsize,
}

impl CountingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            thread: UiThread::spawn("test-ui").expect("ui thread"),
            dispatched: AtomicUsize::new(0),
        })
    }

    pub fn dispatched(&self) -> usize { self.dispatched.load(Ordering::SeqCst) }
}

impl UiDispatcher for CountingUi {
    fn dispatch(&self, task: UiTask) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        self.thread.dispatch(task);
    }
}

/// Wraps a shared test backend in a handle.
pub fn handle_for<B: SpacesBackend>(backend: &Arc<B>) -> BackendHandle {
    BackendHandle::from_arc(backend.clone())
}

/// Options for fast tests: 10 ms polling, no icon lookups.
pub fn fast_options() -> EngineOptions {
    EngineOptions { poll_interval: Duration::from_millis(10), resolve_icons: false }
}

/// Starts an engine over `backend` on the current runtime.
pub fn start_engine(backend: BackendHandle, ui: Arc<CountingUi>) -> SpacesEngine {
    SpacesEngine::new(Some(backend), ui, tokio::runtime::Handle::current(), fast_options())
}

/// Waits for the next published snapshot.
pub async fn next_snapshot(subscriber: &mut Subscriber<Vec<Space>>) -> Vec<Space> {
    tokio::time::timeout(SETTLE, subscriber.next())
        .await
        .expect("no snapshot published in time")
        .expect("observable dropped")
}

/// Polls the published snapshot until `predicate` holds.
///
/// Use this for the first snapshot of an engine: it may be published before
/// a subscriber exists.
pub async fn wait_for_spaces<F>(engine: &SpacesEngine, predicate: F) -> Vec<Space>
where F: Fn(&[Space]) -> bool {
    tokio::time::timeout(SETTLE, async {
        loop {
            let spaces = engine.spaces();
            if predicate(&spaces) {
                return spaces;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("snapshot never matched")
}

/// Asserts that nothing is published for a while.
pub async fn assert_quiet(subscriber: &mut Subscriber<Vec<Space>>) {
    let update = tokio::time::timeout(QUIET, subscriber.next()).await;
    assert!(update.is_err(), "unexpected snapshot: {update:?}");
}

pub fn space(id: &str) -> Space { Space::new(id, false, Vec::new()) }

pub fn space_with(id: &str, is_focused: bool, window_ids: &[u32]) -> Space {
    let windows =
        window_ids.iter().map(|&id| Window::new(id, format!("window {id}"))).collect();
    Space::new(id, is_focused, windows)
}

pub fn ids(spaces: &[Space]) -> Vec<&str> { spaces.iter().map(|space| space.id.as_str()).collect() }
