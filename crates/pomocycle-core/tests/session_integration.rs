//! Integration tests for the session runtime.
//!
//! Drives full cycles through `SessionHandle` on a paused clock, with the
//! TOML store on disk so restarts can be simulated by building a second
//! controller over the same file.

use std::sync::Arc;
use std::time::Duration;

use pomocycle_core::{
    Config, ConfigStore, Event, Notice, Phase, RecordingNotifier, SessionController,
    SessionHandle, SessionRuntime, TomlStore,
};

struct Harness {
    handle: SessionHandle,
    store: TomlStore,
    notifier: RecordingNotifier,
    _dir: tempfile::TempDir,
}

async fn start(initial: Option<Config>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = TomlStore::new(dir.path().join("config.toml"));
    if let Some(cfg) = initial {
        store.save(&cfg).await.unwrap();
    }
    let notifier = RecordingNotifier::new();
    let controller =
        SessionController::load(Arc::new(store.clone()), Arc::new(notifier.clone())).await;
    Harness {
        handle: SessionRuntime::spawn(controller),
        store,
        notifier,
        _dir: dir,
    }
}

struct State {
    phase: Phase,
    pending: bool,
    remaining_ms: u64,
    session_ended: bool,
    reset_requested: bool,
}

async fn state(handle: &SessionHandle) -> State {
    match handle.snapshot().await.unwrap() {
        Event::StateSnapshot {
            phase,
            pending,
            remaining_ms,
            session_ended,
            reset_requested,
            ..
        } => State {
            phase,
            pending,
            remaining_ms,
            session_ended,
            reset_requested,
        },
        other => panic!("Expected StateSnapshot, got {other:?}"),
    }
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

#[tokio::test(start_paused = true)]
async fn test_work_session_ends_and_persists() {
    let h = start(None).await;
    h.handle.start_work();
    tokio::time::sleep(minutes(25) + Duration::from_millis(10)).await;

    let s = state(&h.handle).await;
    assert_eq!(s.phase, Phase::Stopped);
    assert!(s.session_ended);
    assert!(!s.pending);

    let saved = h.store.load().await.unwrap().unwrap();
    assert!(saved.session_ended);
    assert_eq!(saved.phase, Phase::Stopped);
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_ended_session_survives_restart() {
    let first = start(None).await;
    first.handle.start_work();
    tokio::time::sleep(minutes(25) + Duration::from_millis(10)).await;
    first.handle.shutdown().await;

    let notifier = RecordingNotifier::new();
    let controller =
        SessionController::load(Arc::new(first.store.clone()), Arc::new(notifier.clone())).await;
    assert_eq!(controller.phase(), Phase::Stopped);
    let handle = SessionRuntime::spawn(controller);

    handle.start_work();
    let s = state(&handle).await;
    assert!(!s.pending);
    assert_eq!(notifier.messages(), vec![Notice::AlreadyEnded.to_string()]);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_long_break_flows_into_work() {
    let h = start(None).await;
    h.handle.start_long_break();
    tokio::time::sleep(minutes(15) + Duration::from_millis(10)).await;

    let s = state(&h.handle).await;
    assert_eq!(s.phase, Phase::Working);
    assert!(s.pending);
    // the new work countdown started when the long break fired
    assert!(s.remaining_ms <= 25 * 60 * 1000 - 10);
    assert!(s.remaining_ms >= 25 * 60 * 1000 - 1000);
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_cycle_restarts_work() {
    let h = start(Some(Config {
        session_ended: true,
        ..Config::default()
    }))
    .await;
    h.handle.reset_cycle();
    let s = state(&h.handle).await;
    assert_eq!(s.phase, Phase::Resetting);
    assert!(s.reset_requested);

    tokio::time::sleep(Duration::from_millis(5_010)).await;
    let s = state(&h.handle).await;
    assert!(!s.reset_requested);
    assert!(!s.session_ended);
    assert_eq!(s.phase, Phase::Working);
    assert!(s.pending);
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_twice_notifies_once() {
    let h = start(None).await;
    h.handle.start_work();
    h.handle.stop_work();
    let _ = state(&h.handle).await;
    let after_first = h.store.load().await.unwrap();

    h.handle.stop_work();
    let _ = state(&h.handle).await;
    assert_eq!(h.notifier.count(Notice::Stopped), 1);
    assert_eq!(h.store.load().await.unwrap(), after_first);
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_full_cycle_with_custom_durations() {
    let h = start(Some(Config {
        work_minutes: 50,
        short_break_minutes: 10,
        ..Config::default()
    }))
    .await;

    h.handle.start_short_break();
    tokio::time::sleep(minutes(10) + Duration::from_millis(10)).await;
    assert_eq!(state(&h.handle).await.phase, Phase::Working);

    tokio::time::sleep(minutes(50)).await;
    let s = state(&h.handle).await;
    assert_eq!(s.phase, Phase::Stopped);
    assert!(s.session_ended);

    assert_eq!(
        h.notifier.messages(),
        vec![
            "Break started!",
            "Break ended!",
            "Pomodoro started!",
            "Pomodoro ended!",
        ]
    );
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_break_recovers_idle() {
    let h = start(Some(Config {
        phase: Phase::LongBreak,
        ..Config::default()
    }))
    .await;
    let s = state(&h.handle).await;
    assert_eq!(s.phase, Phase::Idle);
    assert!(!s.pending);
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_settings_write_persists_and_applies() {
    let h = start(None).await;
    assert!(h.handle.set_work_minutes("abc").await.is_err());
    assert!(h.store.load().await.unwrap().is_none());

    h.handle.set_work_minutes("1").await.unwrap();
    assert_eq!(h.store.load().await.unwrap().unwrap().work_minutes, 1);

    h.handle.start_work();
    tokio::time::sleep(minutes(1) + Duration::from_millis(10)).await;
    assert_eq!(state(&h.handle).await.phase, Phase::Stopped);
    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_negative_duration_on_disk_keeps_session_ended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "work_minutes = -5\nsession_ended = true\nphase = \"stopped\"\n").unwrap();

    let notifier = RecordingNotifier::new();
    let controller =
        SessionController::load(Arc::new(TomlStore::new(&path)), Arc::new(notifier.clone())).await;
    assert_eq!(controller.phase(), Phase::Stopped);
    assert_eq!(controller.config().work_minutes, 25);
    assert!(controller.config().session_ended);
}
