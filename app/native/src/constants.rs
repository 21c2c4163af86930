//! Application-wide constants.

/// macOS bundle identifier, also used to name the cache directory.
pub const APP_BUNDLE_ID: &str = "com.mocki-toki.barik";

/// Name used for configuration directories and files.
pub const APP_NAME: &str = "barik";

/// Default interval between polls of a polling backend, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Lower bound for the poll interval, in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
