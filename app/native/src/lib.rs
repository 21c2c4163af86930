//! barik - spaces and window synchronization for a macOS menu bar.
//!
//! The library keeps a unified view of the window manager's spaces and
//! their windows, whichever of yabai or `AeroSpace` is running, and routes
//! focus commands back to it. See [`spaces`] for the architecture.
//!
//! The `barik` binary wraps it in a small CLI; see [`cli`].

// Core modules
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;
pub mod schema;
pub mod spaces;
pub mod utils;

pub use error::BarikError;
pub use spaces::{Space, SpacesEngine, Window};
