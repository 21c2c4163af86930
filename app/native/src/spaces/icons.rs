//! Application icon resolution and caching.
//!
//! Windows only carry an application name. The icon is found by locating a
//! running process with that name, walking up from its executable to the
//! enclosing `.app` bundle and reading the bundle's `.icns` file.
//!
//! Lookups go through a process-wide [`IconCache`]. Negative results are
//! cached too: a name that resolved to nothing stays unresolved until
//! [`IconCache::invalidate`] or [`IconCache::clear`] drops the entry.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::detect::{RunningProcess, running_processes};
use super::types::{AppIcon, Space};

/// Global icon cache, created on first use.
static ICON_CACHE: OnceLock<IconCache> = OnceLock::new();

/// Icon file used when the bundle does not declare one.
const DEFAULT_ICON_FILE: &str = "AppIcon.icns";

/// Resolves an application name to its icon.
pub trait IconResolver: Send + Sync {
    /// Returns the icon, or `None` when it cannot be found.
    fn resolve(&self, app_name: &str) -> Option<AppIcon>;
}

impl<F> IconResolver for F
where F: Fn(&str) -> Option<AppIcon> + Send + Sync
{
    fn resolve(&self, app_name: &str) -> Option<AppIcon> { self(app_name) }
}

/// Resolves icons from the bundles of running applications.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundleIconResolver;

impl IconResolver for BundleIconResolver {
    fn resolve(&self, app_name: &str) -> Option<AppIcon> {
        let processes = running_processes();
        let bundle = find_app_bundle(app_name, &processes)?;
        let icon = load_bundle_icon(&bundle);

        if icon.is_none() {
            tracing::debug!(app = app_name, bundle = %bundle.display(), "icons: bundle has no icon");
        }

        icon
    }
}

/// Finds the `.app` bundle of the running application called `app_name`.
///
/// A process matches when its name or its bundle name (without `.app`)
/// equals `app_name`, ignoring case.
#[must_use]
pub fn find_app_bundle(app_name: &str, processes: &[RunningProcess]) -> Option<PathBuf> {
    let wanted = app_name.trim();
    if wanted.is_empty() {
        return None;
    }

    processes.iter().find_map(|process| {
        let bundle = enclosing_app_bundle(process.exe.as_deref()?)?;
        let matches = process.name.eq_ignore_ascii_case(wanted)
            || bundle
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(wanted));

        matches.then_some(bundle)
    })
}

/// Walks up from an executable to the outermost directory ending in `.app`
/// below which it lives.
#[must_use]
pub fn enclosing_app_bundle(executable: &Path) -> Option<PathBuf> {
    executable
        .ancestors()
        .filter(|dir| dir.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("app")))
        .last()
        .map(Path::to_path_buf)
}

/// Loads the icon of an application bundle.
///
/// Tries, in order: the file named by `CFBundleIconFile` in `Info.plist`,
/// `AppIcon.icns`, and the first `.icns` file in `Contents/Resources`.
#[must_use]
pub fn load_bundle_icon(bundle: &Path) -> Option<AppIcon> {
    let resources = bundle.join("Contents").join("Resources");

    let declared = fs::read_to_string(bundle.join("Contents").join("Info.plist"))
        .ok()
        .and_then(|plist| declared_icon_file(&plist))
        .map(|name| resources.join(name));

    let candidates = declared
        .into_iter()
        .chain(std::iter::once(resources.join(DEFAULT_ICON_FILE)))
        .chain(first_icns_in(&resources));

    for path in candidates {
        match fs::read(&path) {
            Ok(data) if !data.is_empty() => return Some(AppIcon::new(path, data)),
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "icons: failed to read icon");
            }
        }
    }

    None
}

/// Extracts `CFBundleIconFile` from an XML property list, adding the
/// `.icns` extension when it is omitted.
fn declared_icon_file(plist: &str) -> Option<String> {
    let key_at = plist.find("<key>CFBundleIconFile</key>")?;
    let after_key = &plist[key_at..];
    let start = after_key.find("<string>")? + "<string>".len();
    let end = start + after_key[start..].find("</string>")?;
    let name = after_key[start..end].trim();

    if name.is_empty() {
        return None;
    }

    if Path::new(name).extension().is_some() {
        Some(name.to_string())
    } else {
        Some(format!("{name}.icns"))
    }
}

fn first_icns_in(dir: &Path) -> Option<PathBuf> {
    let mut icons: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("icns")))
        .collect();

    icons.sort();
    icons.into_iter().next()
}

/// Thread-safe memoization of icon lookups, keyed by application name.
pub struct IconCache {
    entries: DashMap<String, Option<AppIcon>>,
    resolver: Box<dyn IconResolver>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl IconCache {
    /// Creates an empty cache backed by `resolver`.
    pub fn new(resolver: impl IconResolver + 'static) -> Self {
        Self {
            entries: DashMap::new(),
            resolver: Box::new(resolver),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the icon for `app_name`, resolving it on first use.
    pub fn icon_for(&self, app_name: &str) -> Option<AppIcon> {
        if let Some(entry) = self.entries.get(app_name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.value().clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let icon = self.resolver.resolve(app_name);
        tracing::trace!(app = app_name, found = icon.is_some(), "icons: resolved");

        // A concurrent miss may have inserted first; keep that result.
        self.entries.entry(app_name.to_string()).or_insert(icon).value().clone()
    }

    /// Drops the cached result for `app_name`.
    pub fn invalidate(&self, app_name: &str) { self.entries.remove(app_name); }

    /// Drops every cached result and resets the counters.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of cached names, including negative results.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns `(hits, misses)`.
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Fills in the icons of every window that names its application.
    pub fn attach_icons(&self, spaces: &mut [Space]) {
        for window in spaces.iter_mut().flat_map(|space| space.windows.iter_mut()) {
            if let Some(app_name) = window.app_name.as_deref() {
                window.icon = self.icon_for(app_name);
            }
        }
    }
}

impl std::fmt::Debug for IconCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hits, misses) = self.stats();
        f.debug_struct("IconCache")
            .field("entries", &self.len())
            .field("hits", &hits)
            .field("misses", &misses)
            .finish_non_exhaustive()
    }
}

/// The process-wide cache backed by [`BundleIconResolver`].
pub fn global() -> &'static IconCache {
    ICON_CACHE.get_or_init(|| IconCache::new(BundleIconResolver))
}
