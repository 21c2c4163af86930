//! Cache directory utilities.
//!
//! Uses `~/Library/Caches/{APP_BUNDLE_ID}/` on macOS, with a fallback to
//! `/tmp/{APP_BUNDLE_ID}/` if the cache directory is unavailable. The
//! notification socket lives here.

use std::path::PathBuf;

use crate::constants::APP_BUNDLE_ID;

/// Returns the root cache directory for the application.
#[must_use]
pub fn get_cache_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(
        || PathBuf::from(format!("/tmp/{APP_BUNDLE_ID}")),
        |cache| cache.join(APP_BUNDLE_ID),
    )
}
