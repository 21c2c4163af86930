//! Configuration types for barik.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};
use crate::platform::path::expand_and_resolve;

/// Spaces synchronization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacesConfig {
    /// Interval between polls of a polling window manager (yabai), in
    /// milliseconds. Values below 10 are raised to 10.
    pub poll_interval_ms: u64,

    /// Resolve application icons for windows.
    pub resolve_icons: bool,

    /// Path to the `yabai` binary. Searched for in `PATH` and common
    /// install locations when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yabai_path: Option<String>,

    /// Path to the `aerospace` binary. Searched for in `PATH` and common
    /// install locations when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aerospace_path: Option<String>,

    /// Unix socket that `barik notify` and the `AeroSpace` backend share.
    /// Defaults to `barik.sock` in the cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_socket: Option<String>,
}

impl Default for SpacesConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            resolve_icons: true,
            yabai_path: None,
            aerospace_path: None,
            notification_socket: None,
        }
    }
}

impl SpacesConfig {
    /// Poll interval, clamped to the supported minimum.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    /// Binary used to talk to yabai. Relative paths resolve against
    /// `base_dir`, normally the directory of the configuration file.
    #[must_use]
    pub fn yabai_binary(&self, base_dir: Option<&Path>) -> String {
        binary_or_default(self.yabai_path.as_deref(), "yabai", base_dir)
    }

    /// Binary used to talk to `AeroSpace`.
    #[must_use]
    pub fn aerospace_binary(&self, base_dir: Option<&Path>) -> String {
        binary_or_default(self.aerospace_path.as_deref(), "aerospace", base_dir)
    }

    /// Configured notification socket, if overridden.
    #[must_use]
    pub fn notification_socket_path(&self, base_dir: Option<&Path>) -> Option<PathBuf> {
        self.notification_socket
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(|path| expand_and_resolve(path, base_dir))
    }
}

fn binary_or_default(configured: Option<&str>, default: &str, base_dir: Option<&Path>) -> String {
    match configured.map(str::trim).filter(|path| !path.is_empty()) {
        // A bare name is looked up on the search path, not next to the config.
        Some(name) if !name.contains('/') => name.to_string(),
        Some(path) => expand_and_resolve(path, base_dir).to_string_lossy().into_owned(),
        None => default.to_string(),
    }
}

/// Root configuration.
///
/// All sections are optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BarikConfig {
    /// JSON Schema reference, accepted so editors can validate the file.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Spaces and window synchronization.
    pub spaces: SpacesConfig,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/barik/config.jsonc, \
                ~/Library/Application Support/barik/config.jsonc, or ~/.barik.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".barik.jsonc", ".barik.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/barik/` when the variable is set
/// 2. `~/.config/barik/`
/// 3. `~/Library/Application Support/barik/` (macOS native)
/// 4. `~/.barik.jsonc` or `~/.barik.json` (legacy location)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let push_dir = |dir: PathBuf, paths: &mut Vec<PathBuf>| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME is often ~/.config itself
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_NAME), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(BarikConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, and the IO or
/// parse error otherwise.
pub fn load_config_from_path(path: &Path) -> Result<(BarikConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: BarikConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
