//! The `AeroSpace` backend driven through its notification socket.

use std::sync::Arc;

use barik_lib::platform::ipc::{Notification, send_notification};
use barik_lib::spaces::aerospace::AeroSpaceBackend;
use barik_lib::spaces::engine::EngineMode;
use barik_lib::spaces::handle::BackendHandle;

use crate::common::*;

fn backend_in(dir: &tempfile::TempDir) -> (BackendHandle, std::path::PathBuf) {
    let socket = dir.path().join("barik.sock");
    // The binary does not exist, so every refresh yields an empty snapshot.
    let backend = AeroSpaceBackend::new("/nonexistent/aerospace", socket.clone());
    (BackendHandle::from_arc(Arc::new(backend)), socket)
}

async fn notify(socket: std::path::PathBuf, notification: Notification) -> bool {
    tokio::task::spawn_blocking(move || send_notification(&socket, notification).is_ok())
        .await
        .unwrap_or(false)
}

/// Waits for the socket and lets the initial refresh land.
async fn wait_for_socket(socket: &std::path::Path) {
    tokio::time::timeout(SETTLE, async {
        while !socket.exists() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("notification socket never appeared");
    tokio::time::sleep(QUIET).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_notification_triggers_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, socket) = backend_in(&dir);
    let engine = start_engine(handle, CountingUi::new());
    assert_eq!(engine.mode(), EngineMode::Event);

    wait_for_socket(&socket).await;
    let mut updates = engine.subscribe();
    assert!(notify(socket.clone(), Notification::WorkspaceChanged).await);
    assert!(next_snapshot(&mut updates).await.is_empty());

    assert!(notify(socket, Notification::FocusChanged).await);
    assert!(next_snapshot(&mut updates).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ping_does_not_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, socket) = backend_in(&dir);
    let engine = start_engine(handle, CountingUi::new());

    wait_for_socket(&socket).await;
    let mut updates = engine.subscribe();
    assert!(notify(socket, Notification::Ping).await);

    assert_quiet(&mut updates).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_closes_socket() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, socket) = backend_in(&dir);
    let engine = start_engine(handle.clone(), CountingUi::new());
    wait_for_socket(&socket).await;

    engine.stop();

    assert!(!handle.is_observing());
    assert!(!socket.exists());
    assert!(!notify(socket, Notification::WorkspaceChanged).await);
}
