//! Configuration module for barik.
//!
//! The configuration is loaded once and kept in a process-wide `OnceLock`.
//! A missing file is not an error: every setting has a default.

pub mod types;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use types::{
    BarikConfig, ConfigError, SpacesConfig, config_paths, load_config as load_config_default,
    load_config_from_path,
};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<BarikConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `get_config()` to take effect. Returns `false`
/// if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

fn load_or_default() -> BarikConfig {
    let result = CUSTOM_CONFIG_PATH
        .get()
        .map_or_else(load_config_default, |path| load_config_from_path(path));

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            if let Some(path) = CUSTOM_CONFIG_PATH.get() {
                tracing::warn!(path = %path.display(), "configuration file not found, using defaults");
            }
            BarikConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            BarikConfig::default()
        }
    }
}

/// Returns the global configuration instance, initializing it if necessary.
pub fn get_config() -> &'static BarikConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

/// Directory of the loaded configuration file. Relative paths in the
/// configuration resolve against it.
pub fn get_config_dir() -> Option<&'static Path> { get_config_path().and_then(|path| path.parent()) }
