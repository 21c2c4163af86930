//! Spaces and window synchronization.
//!
//! Keeps a unified, sorted snapshot of the window manager's spaces (yabai
//! spaces or `AeroSpace` workspaces) and the windows inside them, and routes
//! focus commands back to the window manager.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │      YabaiBackend        │      │       AeroSpaceBackend       │
//! │  pull: yabai -m query    │      │  pull: aerospace list-*      │
//! │                          │      │  push: notification socket   │
//! └────────────┬─────────────┘      └──────────────┬───────────────┘
//!              │        dyn SpacesBackend          │
//!              └────────────────┬──────────────────┘
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       BackendHandle                              │
//! │  (capabilities cached once, observation guarded)                │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ poll every interval / receive events
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       SpacesEngine                               │
//! │  - Attaches icons from the IconCache                            │
//! │  - Publishes on the UI thread                                   │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ SharedObservable<Vec<Space>>
//!                               ▼
//!                          subscribers
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let ui = Arc::new(UiThread::spawn("ui")?);
//! let engine = SpacesEngine::detect(&config.spaces, base_dir, ui, runtime.handle().clone());
//! let mut updates = engine.subscribe();
//! while let Some(spaces) = updates.next().await {
//!     render(&spaces);
//! }
//! ```

pub mod aerospace;
pub mod backend;
pub mod detect;
pub mod engine;
pub mod handle;
pub mod icons;
pub mod types;
pub mod yabai;

pub use aerospace::AeroSpaceBackend;
pub use backend::{BackendKind, Capabilities, SpacesBackend, SpacesReceiver, SpacesSender};
pub use detect::{create_backend, detect_backend, select_backend};
pub use engine::{EngineMode, EngineOptions, SpacesEngine};
pub use handle::BackendHandle;
pub use icons::{IconCache, IconResolver};
pub use types::{AppIcon, Space, Window};
pub use yabai::YabaiBackend;
