//! Integration tests for the background ticker driving the engine.

use std::{sync::Arc, time::Duration};

use tokio::time::{sleep, timeout};

use flomodoro::{
    services::MemoryStore,
    state::{AppState, Mode, Phase},
    tasks::ticker_task,
};

fn spawn_app(tick_ms: u64) -> Arc<AppState> {
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        Duration::from_millis(tick_ms),
        Box::new(MemoryStore::new()),
    ));
    tokio::spawn(ticker_task(Arc::clone(&state)));
    state
}

#[tokio::test]
async fn ticks_only_while_running() {
    let state = spawn_app(10);

    state.start().unwrap();
    sleep(Duration::from_millis(150)).await;
    let snapshot = state.pause().unwrap();
    assert!(snapshot.total_work_seconds >= 0.1);
    assert!(snapshot.banked_break_seconds > 0.0);

    let frozen = snapshot.total_work_seconds;
    sleep(Duration::from_millis(100)).await;
    assert_eq!(state.get_snapshot().unwrap().total_work_seconds, frozen);
}

#[tokio::test]
async fn rest_running_dry_raises_alert_and_stops() {
    let state = spawn_app(10);
    let mut alerts = state.subscribe_alerts();

    // Bank a sliver of break, then spend it
    state.start().unwrap();
    sleep(Duration::from_millis(100)).await;
    let snapshot = state.switch_phase().unwrap();
    assert_eq!(snapshot.phase, Phase::Resting);
    assert!(snapshot.banked_break_seconds > 0.0);
    state.start().unwrap();

    let alert = timeout(Duration::from_secs(5), alerts.recv())
        .await
        .expect("alert within timeout")
        .unwrap();
    assert_eq!(alert.mode, Mode::Flow);
    assert_eq!(alert.ended, Phase::Resting);

    let snapshot = state.get_snapshot().unwrap();
    assert!(!snapshot.running);
    assert_eq!(snapshot.phase, Phase::Working);
    assert_eq!(snapshot.banked_break_seconds, 0.0);
}
