//! Path expansion for user-provided paths in the configuration file.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the user's home directory.
///
/// Absolute and relative paths are returned unchanged. Empty input yields an
/// empty path.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Expands `~` and resolves relative paths against `base_dir`.
///
/// Used for paths that are written relative to the configuration file, such
/// as a window manager binary kept next to the config.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let expanded = expand(path);

    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        return expanded;
    }

    match base_dir {
        Some(base) => base.join(expanded),
        None => expanded,
    }
}
