//! Running window manager CLIs.
//!
//! Both backends talk to their window manager through its command line tool.
//! This module finds the binary, runs it and decodes JSON output.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;

use crate::error::BarikError;

/// Resolve the absolute path to an executable binary.
///
/// Absolute paths are checked as-is. Otherwise the binary is searched for in:
/// 1. Any directory listed in `BARIK_EXTRA_PATHS` (colon-separated).
/// 2. The current process `PATH`.
/// 3. Homebrew and user-local directories, since apps launched from Finder
///    get a minimal `PATH`.
///
/// # Errors
///
/// Returns a description of the failure when no executable is found.
pub fn resolve_binary(binary: &str) -> Result<PathBuf, String> {
    if binary.is_empty() {
        return Err("Binary name cannot be empty".to_string());
    }

    let candidate = Path::new(binary);
    if candidate.is_absolute() {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(format!("Binary at {} is not executable", candidate.display()))
        };
    }

    let mut search_paths = Vec::new();

    if let Ok(extra) = env::var("BARIK_EXTRA_PATHS") {
        search_paths.extend(extra.split(':').map(PathBuf::from));
    }

    if let Some(path_var) = env::var_os("PATH") {
        search_paths.extend(env::split_paths(&path_var));
    }

    search_paths.extend([
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/opt/homebrew/sbin"),
    ]);

    if let Some(home) = dirs::home_dir() {
        search_paths.push(home.join(".cargo/bin"));
        search_paths.push(home.join(".local/bin"));
    }

    for directory in search_paths {
        if directory.as_os_str().is_empty() {
            continue;
        }

        let candidate_path = directory.join(binary);
        if is_executable(&candidate_path) {
            return Ok(candidate_path);
        }
    }

    Err(format!("Unable to locate executable '{binary}' in known search paths"))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// A window manager binary, resolved lazily on first use and then cached.
#[derive(Debug)]
pub struct ResolvedBinary {
    name: String,
    path: OnceLock<PathBuf>,
}

impl ResolvedBinary {
    /// Creates a binary reference from a name or an explicit path.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), path: OnceLock::new() }
    }

    /// The configured name or path.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Absolute path of the binary.
    ///
    /// Falls back to the bare name when resolution fails so that spawning
    /// still consults `PATH` and produces a meaningful error.
    pub fn path(&self) -> &Path {
        self.path.get_or_init(|| {
            resolve_binary(&self.name).unwrap_or_else(|err| {
                tracing::debug!(binary = %self.name, error = %err, "could not resolve binary");
                PathBuf::from(&self.name)
            })
        })
    }

    /// Runs the binary and returns its standard output.
    ///
    /// # Errors
    ///
    /// See [`run_command`].
    pub fn run(&self, args: &[&str]) -> Result<String, BarikError> { run_command(self.path(), args) }

    /// Runs the binary and decodes its standard output as JSON.
    ///
    /// # Errors
    ///
    /// See [`run_json`].
    pub fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, BarikError> {
        run_json(self.path(), args)
    }
}

/// Runs `program` with `args` and returns its standard output.
///
/// # Errors
///
/// Returns [`BarikError::ShellError`] when the process cannot be spawned and
/// [`BarikError::CommandError`] when it exits unsuccessfully.
pub fn run_command(program: &Path, args: &[&str]) -> Result<String, BarikError> {
    let output = Command::new(program).args(args).output().map_err(|err| {
        BarikError::ShellError(format!("failed to run {}: {err}", program.display()))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BarikError::CommandError(format!(
            "{} {} exited with {}: {}",
            program.display(),
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs `program` and decodes its standard output as JSON.
///
/// Empty output is treated as an empty array, which is what both window
/// managers print when there is nothing to list.
///
/// # Errors
///
/// Returns the errors of [`run_command`], and [`BarikError::ParseError`]
/// when the output is not the expected JSON.
pub fn run_json<T: DeserializeOwned>(program: &Path, args: &[&str]) -> Result<T, BarikError> {
    let stdout = run_command(program, args)?;
    parse_json(&stdout)
}

/// Decodes window manager JSON output.
///
/// # Errors
///
/// Returns [`BarikError::ParseError`] on malformed input.
pub fn parse_json<T: DeserializeOwned>(output: &str) -> Result<T, BarikError> {
    let trimmed = output.trim();
    let text = if trimmed.is_empty() { "[]" } else { trimmed };
    serde_json::from_str(text).map_err(|err| BarikError::ParseError(err.to_string()))
}
