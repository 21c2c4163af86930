//! Thread helpers and the UI-thread dispatcher.
//!
//! All mutations of published state happen on a single UI-affinity thread.
//! Background work hands closures to a [`UiDispatcher`], which runs them on
//! that thread in submission order.

use std::sync::mpsc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

/// Work item executed on the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Schedules closures on the UI-affinity thread.
pub trait UiDispatcher: Send + Sync {
    /// Queues `task` to run on the UI thread. Never blocks on the task itself.
    fn dispatch(&self, task: UiTask);
}

pub fn spawn_named_thread<F>(name: &str, task: F)
where F: FnOnce() + Send + 'static {
    let thread_name = format!("barik-{name}");

    if let Err(err) = thread::Builder::new().name(thread_name.clone()).spawn(task) {
        tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
    }
}

/// A dedicated, named thread acting as the UI thread.
///
/// Tasks run one at a time in the order they were dispatched. The thread
/// exits once the dispatcher is dropped and the queue is drained.
pub struct UiThread {
    sender: Mutex<Option<mpsc::Sender<UiTask>>>,
    thread_id: ThreadId,
}

impl UiThread {
    /// Spawns the UI thread as `barik-{name}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system refuses to create the thread.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<UiTask>();

        let handle = thread::Builder::new().name(format!("barik-{name}")).spawn(move || {
            for task in receiver {
                task();
            }
            tracing::trace!("ui thread queue closed");
        })?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread_id: handle.thread().id(),
        })
    }

    /// Whether the calling thread is this UI thread.
    #[must_use]
    pub fn is_current(&self) -> bool { thread::current().id() == self.thread_id }

    /// Stops accepting tasks. Queued tasks still run.
    pub fn shutdown(&self) { self.sender.lock().take(); }
}

impl UiDispatcher for UiThread {
    fn dispatch(&self, task: UiTask) {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            tracing::trace!("ui thread is shut down, dropping task");
            return;
        };

        if sender.send(task).is_err() {
            tracing::warn!("ui thread has exited, dropping task");
        }
    }
}
