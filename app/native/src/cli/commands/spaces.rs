//! Spaces CLI commands.
//!
//! These talk to the window manager directly; no running barik instance is
//! needed.

use std::sync::Arc;

use clap::{ArgGroup, Args};
use colored::Colorize;
use eyeball::Subscriber;

use crate::cli::output;
use crate::config;
use crate::error::BarikError;
use crate::platform::thread::UiThread;
use crate::spaces::engine::{EngineMode, SpacesEngine};
use crate::spaces::handle::BackendHandle;
use crate::spaces::types::{Space, normalize_snapshot};
use crate::spaces::{detect, icons};

/// Arguments of `barik focus`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["space", "window"])))]
#[command(after_long_help = r#"Examples:
  barik focus --space 2                 # Focus space 2
  barik focus --space 2 --with-window   # Focus space 2 and a window inside it
  barik focus --window 4711             # Focus window 4711"#)]
pub struct FocusArgs {
    /// Space to focus (yabai index or `AeroSpace` workspace name).
    #[arg(long, value_name = "ID")]
    pub space: Option<String>,

    /// Window to focus.
    #[arg(long, value_name = "ID")]
    pub window: Option<u32>,

    /// Also focus a window inside the space.
    #[arg(long, requires = "space")]
    pub with_window: bool,
}

fn detect_configured() -> Result<BackendHandle, BarikError> {
    let config = config::get_config();
    detect::detect_backend(&config.spaces, config::get_config_dir()).ok_or(BarikError::NoBackend)
}

/// Pulls one snapshot in the form the engine would publish it.
fn pull_once(backend: &BackendHandle) -> Vec<Space> {
    let mut spaces = backend.spaces_with_windows().unwrap_or_default();
    if config::get_config().spaces.resolve_icons {
        icons::global().attach_icons(&mut spaces);
    }
    normalize_snapshot(spaces)
}

/// Execute `barik watch`.
///
/// # Errors
///
/// Returns an error if no window manager is running or the runtime cannot
/// be started.
pub fn execute_watch(json: bool) -> Result<(), BarikError> {
    let config = config::get_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("barik-runtime")
        .build()?;
    let ui = Arc::new(UiThread::spawn("ui")?);

    let engine = SpacesEngine::detect(
        &config.spaces,
        config::get_config_dir(),
        ui.clone(),
        runtime.handle().clone(),
    );
    if engine.mode() == EngineMode::Idle {
        return Err(BarikError::NoBackend);
    }

    if !json {
        let backend = engine.backend_name().unwrap_or("none");
        let mode = engine.mode();
        println!("{}", format!("Watching {backend} ({mode}). Press Ctrl-C to stop.").dimmed());
    }

    let updates = engine.subscribe();
    runtime.block_on(async {
        tokio::select! {
            () = forward_snapshots(updates, |spaces| print_snapshot(spaces, json)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    });

    engine.stop();
    ui.shutdown();
    Ok(())
}

/// Hands the current snapshot to `on_snapshot`, then every later one.
///
/// The engine may have published before `updates` was created, and an
/// unchanged window manager never publishes again, so the current value is
/// not left waiting for a change.
async fn forward_snapshots<F>(mut updates: Subscriber<Vec<Space>>, mut on_snapshot: F)
where
    F: FnMut(&[Space]),
{
    on_snapshot(&updates.next_now());
    while let Some(spaces) = updates.next().await {
        on_snapshot(&spaces);
    }
}

fn print_snapshot(spaces: &[Space], json: bool) {
    if json {
        match serde_json::to_string(spaces) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::warn!(error = %err, "spaces: failed to serialize snapshot"),
        }
    } else {
        output::print_spaces_table(spaces);
    }
}

/// Execute `barik spaces`.
///
/// # Errors
///
/// Returns an error if no window manager is running.
pub fn execute_spaces(json: bool) -> Result<(), BarikError> {
    let backend = detect_configured()?;
    let spaces = pull_once(&backend);

    if json {
        output::print_highlighted_json(&serde_json::to_value(&spaces)?);
    } else {
        output::print_spaces_table(&spaces);
    }
    Ok(())
}

/// Execute `barik backend`.
///
/// # Errors
///
/// Returns an error if the JSON output cannot be serialized.
pub fn execute_backend(json: bool) -> Result<(), BarikError> {
    let config = config::get_config();
    let backend = detect::detect_backend(&config.spaces, config::get_config_dir());

    if json {
        let value = backend.as_ref().map_or(serde_json::Value::Null, |backend| {
            serde_json::json!({
                "name": backend.name(),
                "capabilities": backend.capabilities(),
            })
        });
        output::print_highlighted_json(&serde_json::json!({ "backend": value }));
        return Ok(());
    }

    match backend {
        Some(backend) => {
            let capabilities = backend.capabilities();
            println!("{} {}", "Backend:".bold(), backend.name());
            println!("  Switchable:  {}", output::format_bool(capabilities.switchable));
            println!("  Event-based: {}", output::format_bool(capabilities.event_based));
        }
        None => println!("{}", "No supported window manager is running.".red()),
    }
    Ok(())
}

/// Execute `barik focus`.
///
/// # Errors
///
/// Returns an error if no window manager is running or it cannot switch.
pub fn execute_focus(args: &FocusArgs) -> Result<(), BarikError> {
    let backend = detect_configured()?;
    if !backend.is_switchable() {
        return Err(BarikError::CommandError(format!(
            "{} does not support switching spaces",
            backend.name()
        )));
    }

    match (&args.space, args.window) {
        (Some(space), _) => backend.focus_space(space, args.with_window),
        (None, Some(window)) => backend.focus_window(window),
        (None, None) => {
            return Err(BarikError::InvalidArguments(
                "Either --space or --window must be specified.".to_string(),
            ));
        }
    }
    Ok(())
}
