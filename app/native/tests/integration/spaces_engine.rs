//! Engine behavior over scripted backends.

use std::time::Duration;

use barik_lib::spaces::engine::{EngineMode, SpacesEngine};
use barik_lib::spaces::types::{AppIcon, Space, Window};

use crate::common::*;

// =============================================================================
// Polling mode
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_polling_publishes_sorted_snapshot() {
    let backend = ScriptedBackend::new(Some(vec![space("2"), space("10"), space("1")]));
    let engine = start_engine(handle_for(&backend), CountingUi::new());

    let spaces = wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;

    assert_eq!(engine.mode(), EngineMode::Polling);
    assert_eq!(engine.backend_name(), Some("scripted"));
    assert_eq!(ids(&spaces), vec!["1", "10", "2"]);
    assert_eq!(engine.spaces(), spaces);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend_publishes_empty_snapshot() {
    let backend = ScriptedBackend::new(None);
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    let mut updates = engine.subscribe();

    // Absent equals the initial empty snapshot, so nobody is woken.
    assert_quiet(&mut updates).await;

    assert!(backend.pulls() > 1);
    assert!(engine.spaces().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_going_away_clears_snapshot() {
    let backend = ScriptedBackend::new(Some(vec![space("1")]));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;
    let mut updates = engine.subscribe();

    backend.set_snapshot(None);

    assert!(next_snapshot(&mut updates).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_polling_follows_changes() {
    let backend = ScriptedBackend::new(Some(vec![space_with("1", true, &[10])]));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;
    let mut updates = engine.subscribe();

    backend.set_snapshot(Some(vec![space_with("1", false, &[10]), space_with("2", true, &[20])]));

    let spaces = next_snapshot(&mut updates).await;
    assert_eq!(ids(&spaces), vec!["1", "2"]);
    assert!(spaces[1].is_focused);
    assert_eq!(spaces[1].windows[0].id, 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_identical_polls_do_not_wake_subscribers() {
    let backend = ScriptedBackend::new(Some(vec![space_with("1", true, &[1, 2])]));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;
    let mut updates = engine.subscribe();

    let pulls = backend.pulls();
    assert_quiet(&mut updates).await;

    assert!(backend.pulls() > pulls);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_icon_only_change_is_published() {
    let window = Window::new(1, "doc").with_app_name("Zed");
    let backend = ScriptedBackend::new(Some(vec![Space::new("1", false, vec![window.clone()])]));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;
    let mut updates = engine.subscribe();

    let icon = AppIcon::new("/Applications/Zed.app/Contents/Resources/Zed.icns", vec![1u8, 2]);
    let resolved = window.with_icon(icon.clone());
    backend.set_snapshot(Some(vec![Space::new("1", false, vec![resolved])]));

    let spaces = next_snapshot(&mut updates).await;
    assert_eq!(spaces[0].windows[0].icon, Some(icon.clone()));
    assert_eq!(engine.spaces()[0].windows[0].icon, Some(icon));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_pull_does_not_block_ticks() {
    let backend = ScriptedBackend::slow(Some(vec![space("1")]), Duration::from_millis(300));
    let _engine = start_engine(handle_for(&backend), CountingUi::new());

    tokio::time::sleep(Duration::from_millis(100)).await;

    // A 10 ms interval keeps firing while the first pull is still sleeping.
    assert!(backend.pulls() > 1, "only {} pull(s) started", backend.pulls());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_late_subscriber_reads_current_snapshot() {
    let backend = ScriptedBackend::new(Some(vec![space("1")]));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;

    let mut updates = engine.subscribe();

    // Nothing changes anymore, so only the current value is available.
    assert_eq!(ids(&updates.next_now()), vec!["1"]);
    assert_quiet(&mut updates).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publishes_go_through_ui_dispatcher() {
    let backend = ScriptedBackend::new(Some(vec![space("1")]));
    let ui = CountingUi::new();
    let engine = start_engine(handle_for(&backend), ui.clone());

    wait_for_spaces(&engine, |spaces| !spaces.is_empty()).await;

    assert!(ui.dispatched() >= 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_polling_never_observes() {
    let backend = ScriptedBackend::new(Some(Vec::new()));
    let handle = handle_for(&backend);
    let engine = start_engine(handle.clone(), CountingUi::new());

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!handle.is_observing());
    assert_eq!(engine.mode(), EngineMode::Polling);
}

// =============================================================================
// Event mode
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_event_mode_forwards_in_emission_order() {
    let backend = PushBackend::new();
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    let mut updates = engine.subscribe();

    assert_eq!(engine.mode(), EngineMode::Event);
    assert!(backend.emit(vec![space("1")]));
    assert_eq!(ids(&next_snapshot(&mut updates).await), vec!["1"]);

    assert!(backend.emit(vec![space("1"), space("2")]));
    assert_eq!(ids(&next_snapshot(&mut updates).await), vec!["1", "2"]);

    assert_eq!(backend.starts(), 1);
    assert_eq!(backend.pulls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_event_mode_never_polls() {
    let backend = PushBackend::new();
    let engine = start_engine(handle_for(&backend), CountingUi::new());

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(backend.pulls(), 0);
    assert!(engine.spaces().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_event_mode_stop_unsubscribes_once() {
    let backend = PushBackend::new();
    let engine = start_engine(handle_for(&backend), CountingUi::new());

    engine.stop();
    engine.stop();
    drop(engine);

    assert_eq!(backend.stops(), 1);
    assert!(!backend.emit(vec![space("1")]));
}

// =============================================================================
// Idle mode
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_no_backend_is_idle() {
    let engine = SpacesEngine::new(
        None,
        CountingUi::new(),
        tokio::runtime::Handle::current(),
        fast_options(),
    );
    let mut updates = engine.subscribe();

    engine.switch_to_space(&space("1"), true);
    engine.switch_to_window(&Window::new(1, "x"));

    assert_quiet(&mut updates).await;
    assert_eq!(engine.mode(), EngineMode::Idle);
    assert_eq!(engine.backend_name(), None);
    assert!(engine.spaces().is_empty());
    engine.stop();
}

// =============================================================================
// Switching
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_switch_commands_reach_backend() {
    let backend = ScriptedBackend::new(Some(Vec::new()));
    let engine = start_engine(handle_for(&backend), CountingUi::new());

    engine.switch_to_space(&space("3"), true);
    wait_for_commands(&backend, 1).await;
    engine.switch_to_window(&Window::new(42, "editor"));
    wait_for_commands(&backend, 2).await;

    assert_eq!(
        backend.commands(),
        vec![Command::FocusSpace("3".to_string(), true), Command::FocusWindow(42)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_only_backend_ignores_switches() {
    let backend = ScriptedBackend::read_only(Some(Vec::new()));
    let engine = start_engine(handle_for(&backend), CountingUi::new());

    engine.switch_to_space(&space("1"), false);
    engine.switch_to_window(&Window::new(1, "x"));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(backend.commands().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_switch_after_stop_is_ignored() {
    let backend = ScriptedBackend::new(Some(Vec::new()));
    let engine = start_engine(handle_for(&backend), CountingUi::new());

    engine.stop();
    engine.switch_to_space(&space("1"), true);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(backend.commands().is_empty());
}

async fn wait_for_commands(backend: &ScriptedBackend, count: usize) {
    tokio::time::timeout(SETTLE, async {
        while backend.commands().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("commands did not reach the backend");
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_is_idempotent() {
    let backend = ScriptedBackend::new(Some(Vec::new()));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    assert!(engine.is_running());

    engine.stop();
    engine.stop();

    assert!(!engine.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_halts_polling() {
    let backend = ScriptedBackend::new(Some(Vec::new()));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    tokio::time::sleep(Duration::from_millis(50)).await;

    engine.stop();
    tokio::time::sleep(Duration::from_millis(30)).await;
    let pulls = backend.pulls();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(backend.pulls(), pulls);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_in_flight_pull_is_discarded_after_stop() {
    let backend = ScriptedBackend::slow(Some(vec![space("1")]), Duration::from_millis(150));
    let engine = start_engine(handle_for(&backend), CountingUi::new());
    let mut updates = engine.subscribe();

    // Let the first pull start, then tear down while it is still sleeping.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(backend.pulls() >= 1);
    engine.stop();

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_quiet(&mut updates).await;
    assert!(engine.spaces().is_empty());
}
