//! Window and space value types shared by every backend.
//!
//! Snapshots are plain values: a backend builds a fresh `Vec<Space>` on every
//! pull or push and the engine replaces the published collection wholesale.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};

// ============================================================================
// Icons
// ============================================================================

/// A resolved application icon.
///
/// Holds the raw image bytes read from the application bundle. Cloning is
/// cheap, the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct AppIcon {
    path: PathBuf,
    data: Arc<[u8]>,
}

impl AppIcon {
    /// Creates an icon from the file it was loaded from and its contents.
    pub fn new(path: impl Into<PathBuf>, data: impl Into<Arc<[u8]>>) -> Self {
        Self { path: path.into(), data: data.into() }
    }

    /// Path of the image file inside the application bundle.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Raw image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] { &self.data }

    /// MIME type guessed from the file extension.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
            Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
                "image/jpeg"
            }
            Some(ext) if ext.eq_ignore_ascii_case("icns") => "image/icns",
            _ => "application/octet-stream",
        }
    }

    /// Encodes the icon as a `data:` URL for web-based renderers.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.data))
    }
}

impl fmt::Debug for AppIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIcon")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Serialize for AppIcon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

// ============================================================================
// Window
// ============================================================================

/// A window as reported by the window manager.
///
/// Equality and hashing ignore `icon`: two windows that only differ in their
/// resolved icon are the same window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// Window ID, unique within one snapshot of a backend.
    pub id: u32,
    /// Window title. May be empty.
    pub title: String,
    /// Name of the owning application.
    pub app_name: Option<String>,
    /// Whether this window currently has focus.
    pub is_focused: bool,
    /// Lazily resolved application icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<AppIcon>,
}

impl Window {
    /// Creates an unfocused window without application name or icon.
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            app_name: None,
            is_focused: false,
            icon: None,
        }
    }

    /// Sets the owning application name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Sets the focus flag.
    #[must_use]
    pub fn focused(mut self, is_focused: bool) -> Self {
        self.is_focused = is_focused;
        self
    }

    /// Attaches a resolved icon.
    #[must_use]
    pub fn with_icon(mut self, icon: AppIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.app_name == other.app_name
            && self.is_focused == other.is_focused
    }
}

impl Eq for Window {}

impl Hash for Window {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.title.hash(state);
        self.app_name.hash(state);
        self.is_focused.hash(state);
    }
}

// ============================================================================
// Space
// ============================================================================

/// A space (virtual desktop or workspace) and the windows it holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    /// Backend-agnostic identity: a yabai space index or an `AeroSpace`
    /// workspace name, always rendered as a string.
    pub id: String,
    /// Whether this space is the focused one.
    pub is_focused: bool,
    /// Windows in display order.
    pub windows: Vec<Window>,
}

impl Space {
    /// Creates a space.
    pub fn new(id: impl Into<String>, is_focused: bool, windows: Vec<Window>) -> Self {
        Self { id: id.into(), is_focused, windows }
    }

    /// Returns the focused window of this space, if any.
    #[must_use]
    pub fn focused_window(&self) -> Option<&Window> { self.windows.iter().find(|w| w.is_focused) }
}

/// Sorts spaces by identity string (lexicographic, so `"10"` sorts before `"2"`).
pub fn sort_spaces(spaces: &mut [Space]) { spaces.sort_by(|a, b| a.id.cmp(&b.id)); }

/// Produces the published form of a pulled snapshot.
///
/// Spaces are sorted by identity string, duplicate space identities keep the
/// first occurrence, and duplicate window IDs inside a space are dropped.
#[must_use]
pub fn normalize_snapshot(mut spaces: Vec<Space>) -> Vec<Space> {
    sort_spaces(&mut spaces);
    spaces.dedup_by(|later, earlier| later.id == earlier.id);

    for space in &mut spaces {
        let mut seen = HashSet::with_capacity(space.windows.len());
        space.windows.retain(|window| seen.insert(window.id));
    }

    spaces
}

/// Whether two snapshots would render identically, icons included.
///
/// `Window` equality leaves icons out, so a window whose icon was resolved
/// after the first pull still counts as a change here.
#[must_use]
pub fn same_snapshot(a: &[Space], b: &[Space]) -> bool {
    a == b
        && a.iter().zip(b).all(|(left, right)| {
            left.windows.iter().zip(&right.windows).all(|(l, r)| l.icon == r.icon)
        })
}
