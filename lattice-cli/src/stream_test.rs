use std::time::Duration;

use crate::stream::{StreamController, StreamState};

#[tokio::test]
async fn test_controller_starts_not_started() {
    let ctrl = StreamController::new();
    assert_eq!(ctrl.state(), StreamState::NotStarted);
}

#[tokio::test]
async fn test_initial_running_transition_does_not_signal_resume() {
    let ctrl = StreamController::new();
    ctrl.set_state(StreamState::Running);
    assert_eq!(ctrl.state(), StreamState::Running);

    // No resume signal may be pending after the initial start.
    let waited = tokio::time::timeout(Duration::from_millis(50), ctrl.wait_until_resumed()).await;
    assert!(waited.is_err(), "unexpected resume signal after initial start");
}

#[tokio::test]
async fn test_pause_then_resume_signals_waiter() {
    let ctrl = std::sync::Arc::new(StreamController::new());
    ctrl.set_state(StreamState::Running);
    ctrl.set_state(StreamState::Paused);
    assert_eq!(ctrl.state(), StreamState::Paused);

    let waiter = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.wait_until_resumed().await })
    };
    ctrl.set_state(StreamState::Running);
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("resume signal never arrived")
        .expect("waiter task failed");
}

#[tokio::test]
async fn test_discard_signals_resume() {
    let ctrl = std::sync::Arc::new(StreamController::new());
    ctrl.set_state(StreamState::Running);
    ctrl.set_state(StreamState::Paused);

    let waiter = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.wait_until_resumed().await })
    };
    ctrl.set_state(StreamState::Discard);
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("discard must release a paused waiter")
        .expect("waiter task failed");
    assert_eq!(ctrl.state(), StreamState::Discard);
}

#[tokio::test]
async fn test_paused_handshake() {
    let ctrl = std::sync::Arc::new(StreamController::new());

    let waiter = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.wait_until_paused().await })
    };
    ctrl.paused();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("paused signal never arrived")
        .expect("waiter task failed");
}

#[tokio::test]
async fn test_state_watcher_observes_changes() {
    let ctrl = StreamController::new();
    let mut watcher = ctrl.state_watcher();

    ctrl.set_state(StreamState::Running);
    tokio::time::timeout(Duration::from_secs(1), watcher.changed())
        .await
        .expect("watcher never woke")
        .expect("watch channel closed");
    assert_eq!(*watcher.borrow(), StreamState::Running);
}

#[tokio::test]
async fn test_spurious_resumes_coalesce() {
    let ctrl = StreamController::new();
    ctrl.set_state(StreamState::Running);
    // Several discard transitions while nobody waits must not build up an
    // unbounded backlog; the channel holds at most one pending signal.
    ctrl.set_state(StreamState::Discard);
    ctrl.set_state(StreamState::Discard);
    ctrl.set_state(StreamState::Discard);

    ctrl.wait_until_resumed().await;
    let waited = tokio::time::timeout(Duration::from_millis(50), ctrl.wait_until_resumed()).await;
    assert!(waited.is_err(), "resume signals were not coalesced");
}
