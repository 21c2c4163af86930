//! Backend detection.
//!
//! Detection is split in two: [`select_backend`] is a pure policy over
//! process names, [`running_processes`] performs the process listing. The
//! backend is chosen once at startup; switching window managers requires a
//! restart.

use std::path::{Path, PathBuf};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use super::aerospace::AeroSpaceBackend;
use super::backend::BackendKind;
use super::handle::BackendHandle;
use super::yabai::YabaiBackend;
use crate::config::SpacesConfig;
use crate::platform::ipc::default_socket_path;

/// Priority order. Polling yabai wins over event-driven `AeroSpace` when both
/// happen to be running.
const PRIORITY: [BackendKind; 2] = [BackendKind::Yabai, BackendKind::AeroSpace];

/// A running process, as far as backend detection and icon lookup care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningProcess {
    /// Process name as reported by the OS.
    pub name: String,
    /// Path of the executable, when readable.
    pub exe: Option<PathBuf>,
}

/// Lists the running processes.
#[must_use]
pub fn running_processes() -> Vec<RunningProcess> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
    );

    system
        .processes()
        .values()
        .map(|process| RunningProcess {
            name: process.name().to_string_lossy().into_owned(),
            exe: process.exe().map(Path::to_path_buf),
        })
        .collect()
}

/// Names of the running processes.
#[must_use]
pub fn running_process_names() -> Vec<String> {
    running_processes().into_iter().map(|process| process.name).collect()
}

/// Picks the backend for a set of running process names.
///
/// Names are compared case-insensitively after trimming. Returns `None` when
/// no known window manager is among them.
pub fn select_backend<I, S>(process_names: I) -> Option<BackendKind>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut found = [false; PRIORITY.len()];

    for name in process_names {
        let name = name.as_ref().trim();
        for (slot, kind) in found.iter_mut().zip(PRIORITY) {
            if name.eq_ignore_ascii_case(kind.process_name()) {
                *slot = true;
            }
        }
    }

    PRIORITY.into_iter().zip(found).find_map(|(kind, present)| present.then_some(kind))
}

/// Creates the backend for `kind`.
///
/// `base_dir` is the directory relative paths in `config` resolve against.
#[must_use]
pub fn create_backend(
    kind: BackendKind,
    config: &SpacesConfig,
    base_dir: Option<&Path>,
) -> BackendHandle {
    match kind {
        BackendKind::Yabai => BackendHandle::new(YabaiBackend::new(config.yabai_binary(base_dir))),
        BackendKind::AeroSpace => {
            let socket =
                config.notification_socket_path(base_dir).unwrap_or_else(default_socket_path);
            BackendHandle::new(AeroSpaceBackend::new(config.aerospace_binary(base_dir), socket))
        }
    }
}

/// Detects the running window manager and creates its backend.
#[must_use]
pub fn detect_backend(config: &SpacesConfig, base_dir: Option<&Path>) -> Option<BackendHandle> {
    let Some(kind) = select_backend(running_process_names()) else {
        tracing::info!("spaces: no supported window manager is running");
        return None;
    };

    tracing::info!(backend = %kind, "spaces: detected window manager");
    Some(create_backend(kind, config, base_dir))
}
