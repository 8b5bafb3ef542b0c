//! Timer engine state machine

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{Alert, Presenter, Snapshot, Status, Store, TotalWorkInput};
use crate::state::{Mode, Phase, TimerState, FLOW_BREAK_RATIO};

/// Flow/fixed timer driven by wall-clock deltas.
///
/// Idle/running is orthogonal to mode and phase. Every counter change and
/// every mode or phase change is persisted through the store; every change at
/// all is pushed to the presenter.
pub struct TimerEngine<P, S> {
    state: TimerState,
    status: Status,
    edit: Option<TotalWorkInput>,
    presenter: P,
    store: S,
}

impl<P: Presenter, S: Store> TimerEngine<P, S> {
    /// Create an engine with a fresh state
    pub fn new(presenter: P, store: S) -> Self {
        Self::with_state(TimerState::new(), presenter, store)
    }

    /// Create an engine from whatever the store holds, or a fresh state
    pub fn restore(presenter: P, store: S) -> Self {
        let state = match store.load() {
            Ok(Some(record)) => {
                info!("Restored timer state saved at {}", record.saved_at);
                TimerState::from_record(&record)
            }
            Ok(None) => {
                info!("No saved timer state, starting fresh");
                TimerState::new()
            }
            Err(e) => {
                warn!("Failed to load saved timer state, starting fresh: {:#}", e);
                TimerState::new()
            }
        };
        Self::with_state(state, presenter, store)
    }

    /// Create an engine around an existing state. The engine always starts paused.
    pub fn with_state(mut state: TimerState, presenter: P, store: S) -> Self {
        state.running = false;
        state.last_tick = None;
        let status = Status::ready_for(state.phase);
        let mut engine = Self {
            state,
            status,
            edit: None,
            presenter,
            store,
        };
        engine.notify();
        engine
    }

    // Queries

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn staged_edit(&self) -> Option<&TotalWorkInput> {
        self.edit.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.status, self.edit.as_ref())
    }

    // Commands

    /// Begin live accounting from `now`. A pending total work edit is committed first.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.state.running {
            return;
        }
        if let Some(input) = self.edit.clone() {
            self.commit_edit_total_work(&input);
        }

        self.state.running = true;
        self.state.last_tick = Some(now);
        self.status = Status::running_in(self.state.phase);
        info!(
            "Timer started ({:?}, {:?})",
            self.state.mode, self.state.phase
        );
        self.notify();
    }

    /// Freeze every counter where it stands
    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.running = false;
        self.state.last_tick = None;
        self.status = Status::Paused;
        info!("Timer paused");
        self.notify();
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.state.running {
            self.pause();
        } else {
            self.start(now);
        }
    }

    /// Account for the wall-clock time elapsed since the previous update.
    ///
    /// Callbacks may arrive late or not at all for a while, so the real delta
    /// is used rather than a fixed step. A clock that went backwards counts as
    /// no time at all.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let Some(last_tick) = self.state.last_tick.filter(|_| self.state.running) else {
            return;
        };
        let delta = elapsed_seconds(last_tick, now);
        self.state.last_tick = Some(now);
        debug!("Tick: {:.3}s elapsed", delta);

        let state = &mut self.state;
        match (state.mode, state.phase) {
            (Mode::Flow, Phase::Working) => {
                state.current_session_seconds += delta;
                state.total_work_seconds += delta;
                state.banked_break_seconds += delta / FLOW_BREAK_RATIO;
            }
            (Mode::Flow, Phase::Resting) => {
                if state.banked_break_seconds > 0.0 {
                    state.banked_break_seconds = (state.banked_break_seconds - delta).max(0.0);
                }
                if state.banked_break_seconds <= 0.0 {
                    self.expire_phase();
                    return;
                }
            }
            (Mode::Fixed, phase) => {
                if state.fixed_phase_remaining_seconds > 0.0 {
                    state.fixed_phase_remaining_seconds =
                        (state.fixed_phase_remaining_seconds - delta).max(0.0);
                    if phase == Phase::Working {
                        state.total_work_seconds += delta;
                    }
                }
                if state.fixed_phase_remaining_seconds <= 0.0 {
                    state.fixed_phase_remaining_seconds = phase.flipped().fixed_preset();
                    self.expire_phase();
                    return;
                }
            }
        }

        self.persist(now);
        self.notify();
    }

    /// Flip between working and resting. Always leaves the engine paused.
    pub fn switch_phase(&mut self) {
        self.pause();
        let state = &mut self.state;
        state.phase = state.phase.flipped();

        match (state.phase, state.mode) {
            (Phase::Working, Mode::Flow) => state.current_session_seconds = 0.0,
            (Phase::Working, Mode::Fixed) | (Phase::Resting, Mode::Fixed) => {
                state.fixed_phase_remaining_seconds = state.phase.fixed_preset();
            }
            // Banked break carries over into the rest
            (Phase::Resting, Mode::Flow) => {}
        }
        self.status = Status::ready_for(state.phase);

        info!("Switched phase to {:?}", self.state.phase);
        self.notify();
        self.persist(Utc::now());
    }

    /// Toggle between flow and fixed mode, landing in the working phase
    pub fn switch_mode(&mut self) {
        self.pause();
        let state = &mut self.state;
        state.mode = state.mode.toggled();
        state.phase = Phase::Working;

        match state.mode {
            Mode::Fixed => state.fixed_phase_remaining_seconds = Phase::Working.fixed_preset(),
            Mode::Flow => state.current_session_seconds = 0.0,
        }
        self.status = Status::ReadyToWork;

        info!("Switched mode to {:?}", self.state.mode);
        self.notify();
        self.persist(Utc::now());
    }

    /// Throw away all banked break time
    pub fn reset_banked_break(&mut self) {
        self.state.banked_break_seconds = 0.0;
        info!("Banked break reset");
        self.notify();
        self.persist(Utc::now());
    }

    /// Start editing the total work figure, prefilled with the current total
    pub fn begin_edit_total_work(&mut self) {
        self.pause();
        self.edit = Some(TotalWorkInput::from_total_seconds(
            self.state.total_work_seconds,
        ));
        debug!("Editing total work");
        self.notify();
    }

    /// Replace the staged input without committing it. Ignored when not editing.
    pub fn stage_edit_total_work(&mut self, input: TotalWorkInput) {
        if let Some(staged) = self.edit.as_mut() {
            *staged = input;
            self.notify();
        }
    }

    /// Set the total work figure. Components that do not parse count as zero.
    pub fn commit_edit_total_work(&mut self, input: &TotalWorkInput) {
        self.pause();
        self.edit = None;
        self.state.total_work_seconds = input.total_seconds() as f64;
        info!("Total work set to {}s", self.state.total_work_seconds);
        self.notify();
        self.persist(Utc::now());
    }

    pub fn cancel_edit_total_work(&mut self) {
        if self.edit.take().is_some() {
            debug!("Total work edit cancelled");
            self.notify();
        }
    }

    // Internals

    /// Pause, raise the alert, and move on to the next phase
    fn expire_phase(&mut self) {
        let alert = Alert {
            mode: self.state.mode,
            ended: self.state.phase,
        };
        self.pause();
        info!("{:?} phase ran out", alert.ended);
        self.presenter.on_alert(&alert);
        self.switch_phase();
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.presenter.on_snapshot(&snapshot);
    }

    fn persist(&mut self, saved_at: DateTime<Utc>) {
        let record = self.state.to_record(saved_at);
        if let Err(e) = self.store.save(&record) {
            warn!("Failed to persist timer state: {:#}", e);
        }
    }
}

/// Fractional seconds from `from` to `to`, never negative
fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::MemoryStore, state::FIXED_REST_SECONDS};
    use chrono::{Duration, TimeZone};

    #[derive(Default)]
    struct Recorder {
        snapshots: Vec<Snapshot>,
        alerts: Vec<Alert>,
    }

    impl Presenter for Recorder {
        fn on_snapshot(&mut self, snapshot: &Snapshot) {
            self.snapshots.push(snapshot.clone());
        }

        fn on_alert(&mut self, alert: &Alert) {
            self.alerts.push(*alert);
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn secs(seconds: f64) -> Duration {
        Duration::microseconds((seconds * 1_000_000.0) as i64)
    }

    fn engine_with(state: TimerState) -> TimerEngine<Recorder, MemoryStore> {
        TimerEngine::with_state(state, Recorder::default(), MemoryStore::new())
    }

    #[test]
    fn flow_working_accrues_break_at_five_to_one() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.tick(t0() + secs(5.0));

        let state = engine.state();
        assert_eq!(state.current_session_seconds, 5.0);
        assert_eq!(state.total_work_seconds, 5.0);
        assert_eq!(state.banked_break_seconds, 1.0);
        assert_eq!(state.last_tick, Some(t0() + secs(5.0)));
    }

    #[test]
    fn tick_uses_real_elapsed_time() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.tick(t0() + secs(1.0));
        // A throttled callback arriving late
        engine.tick(t0() + secs(31.0));
        engine.tick(t0() + secs(31.5));

        assert_eq!(engine.state().total_work_seconds, 31.5);
        assert!((engine.state().banked_break_seconds - 6.3).abs() < 1e-9);
    }

    #[test]
    fn backwards_clock_accrues_nothing() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.tick(t0() - secs(10.0));
        assert_eq!(engine.state().total_work_seconds, 0.0);
    }

    #[test]
    fn tick_while_paused_is_ignored() {
        let mut engine = engine_with(TimerState::new());
        engine.tick(t0() + secs(100.0));
        assert_eq!(engine.state(), &TimerState::new());
        assert_eq!(engine.store().save_count(), 0);
    }

    #[test]
    fn flow_rest_depletes_bank() {
        let mut state = TimerState::new();
        state.phase = Phase::Resting;
        state.banked_break_seconds = 10.0;
        let mut engine = engine_with(state);

        engine.start(t0());
        assert_eq!(engine.status(), Status::Recharging);
        engine.tick(t0() + secs(4.0));

        assert_eq!(engine.state().banked_break_seconds, 6.0);
        assert_eq!(engine.state().total_work_seconds, 0.0);
        assert!(engine.is_running());
        assert!(engine.presenter().alerts.is_empty());
    }

    #[test]
    fn flow_rest_running_out_flips_to_work() {
        let mut state = TimerState::new();
        state.phase = Phase::Resting;
        state.banked_break_seconds = 0.5;
        state.current_session_seconds = 42.0;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.tick(t0() + secs(1.0));

        let state = engine.state();
        assert_eq!(state.banked_break_seconds, 0.0);
        assert!(!state.running);
        assert_eq!(state.phase, Phase::Working);
        assert_eq!(state.current_session_seconds, 0.0);
        assert_eq!(engine.status(), Status::ReadyToWork);
        assert_eq!(
            engine.presenter().alerts,
            vec![Alert {
                mode: Mode::Flow,
                ended: Phase::Resting
            }]
        );
    }

    #[test]
    fn flow_rest_with_empty_bank_expires_immediately() {
        let mut state = TimerState::new();
        state.phase = Phase::Resting;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.tick(t0());

        assert_eq!(engine.state().phase, Phase::Working);
        assert_eq!(engine.presenter().alerts.len(), 1);
    }

    #[test]
    fn fixed_work_counts_down_and_accrues_total() {
        let mut state = TimerState::new();
        state.mode = Mode::Fixed;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.tick(t0() + secs(60.0));

        let state = engine.state();
        assert_eq!(state.fixed_phase_remaining_seconds, 1440.0);
        assert_eq!(state.total_work_seconds, 60.0);
        assert_eq!(state.banked_break_seconds, 0.0);
    }

    #[test]
    fn fixed_rest_does_not_accrue_total() {
        let mut state = TimerState::new();
        state.mode = Mode::Fixed;
        state.phase = Phase::Resting;
        state.fixed_phase_remaining_seconds = FIXED_REST_SECONDS;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.tick(t0() + secs(30.0));

        assert_eq!(engine.state().fixed_phase_remaining_seconds, 270.0);
        assert_eq!(engine.state().total_work_seconds, 0.0);
    }

    #[test]
    fn fixed_work_expiry_moves_to_rest() {
        let mut state = TimerState::new();
        state.mode = Mode::Fixed;
        state.fixed_phase_remaining_seconds = 0.3;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.tick(t0() + secs(1.0));

        let state = engine.state();
        assert!(!state.running);
        assert_eq!(state.phase, Phase::Resting);
        assert_eq!(state.fixed_phase_remaining_seconds, 300.0);
        assert_eq!(engine.status(), Status::ReadyToRest);
        assert_eq!(
            engine.presenter().alerts,
            vec![Alert {
                mode: Mode::Fixed,
                ended: Phase::Working
            }]
        );
    }

    #[test]
    fn fixed_rest_expiry_moves_to_work() {
        let mut state = TimerState::new();
        state.mode = Mode::Fixed;
        state.phase = Phase::Resting;
        state.fixed_phase_remaining_seconds = 2.0;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.tick(t0() + secs(2.0));

        assert_eq!(engine.state().phase, Phase::Working);
        assert_eq!(engine.state().fixed_phase_remaining_seconds, 1500.0);
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.start(t0() + secs(9.0));
        assert_eq!(engine.state().last_tick, Some(t0()));

        engine.pause();
        let once = engine.state().clone();
        let notified = engine.presenter().snapshots.len();
        engine.pause();
        assert_eq!(engine.state(), &once);
        assert_eq!(engine.presenter().snapshots.len(), notified);
        assert_eq!(once.last_tick, None);
        assert_eq!(engine.status(), Status::Paused);
    }

    #[test]
    fn toggle_alternates() {
        let mut engine = engine_with(TimerState::new());
        engine.toggle(t0());
        assert!(engine.is_running());
        assert_eq!(engine.status(), Status::Flowing);
        engine.toggle(t0());
        assert!(!engine.is_running());
    }

    #[test]
    fn switch_phase_keeps_bank_in_flow() {
        let mut state = TimerState::new();
        state.banked_break_seconds = 12.0;
        state.current_session_seconds = 60.0;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.switch_phase();
        assert!(!engine.is_running());
        assert_eq!(engine.state().phase, Phase::Resting);
        assert_eq!(engine.state().banked_break_seconds, 12.0);
        assert_eq!(engine.status(), Status::ReadyToRest);

        engine.switch_phase();
        assert_eq!(engine.state().phase, Phase::Working);
        assert_eq!(engine.state().current_session_seconds, 0.0);
        assert_eq!(engine.store().save_count(), 2);
    }

    #[test]
    fn switch_phase_resets_fixed_countdown() {
        let mut state = TimerState::new();
        state.mode = Mode::Fixed;
        state.fixed_phase_remaining_seconds = 12.0;
        let mut engine = engine_with(state);

        engine.switch_phase();
        assert_eq!(engine.state().fixed_phase_remaining_seconds, 300.0);
        engine.switch_phase();
        assert_eq!(engine.state().fixed_phase_remaining_seconds, 1500.0);
    }

    #[test]
    fn switch_mode_from_fixed_rest_lands_in_flow_work() {
        let mut state = TimerState::new();
        state.mode = Mode::Fixed;
        state.phase = Phase::Resting;
        state.fixed_phase_remaining_seconds = 123.0;
        state.current_session_seconds = 77.0;
        state.total_work_seconds = 900.0;
        state.banked_break_seconds = 40.0;
        let mut engine = engine_with(state);

        engine.switch_mode();

        let state = engine.state();
        assert_eq!(state.mode, Mode::Flow);
        assert_eq!(state.phase, Phase::Working);
        assert_eq!(state.current_session_seconds, 0.0);
        assert_eq!(state.fixed_phase_remaining_seconds, 123.0);
        assert_eq!(state.total_work_seconds, 900.0);
        assert_eq!(state.banked_break_seconds, 40.0);
        assert_eq!(engine.status(), Status::ReadyToWork);
    }

    #[test]
    fn switch_mode_to_fixed_sets_work_preset() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.switch_mode();
        assert!(!engine.is_running());
        assert_eq!(engine.state().mode, Mode::Fixed);
        assert_eq!(engine.state().fixed_phase_remaining_seconds, 1500.0);
        assert!(!engine.snapshot().show_break_stats);
    }

    #[test]
    fn reset_banked_break_works_while_running() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.tick(t0() + secs(50.0));
        engine.reset_banked_break();

        assert!(engine.is_running());
        assert_eq!(engine.state().banked_break_seconds, 0.0);
        assert_eq!(engine.state().total_work_seconds, 50.0);
    }

    #[test]
    fn commit_edit_sets_total() {
        let mut engine = engine_with(TimerState::new());
        engine.begin_edit_total_work();
        engine.commit_edit_total_work(&TotalWorkInput::new("1", "2", "3"));
        assert_eq!(engine.state().total_work_seconds, 3723.0);
        assert!(!engine.is_editing());
    }

    #[test]
    fn begin_edit_pauses_and_prefills() {
        let mut state = TimerState::new();
        state.total_work_seconds = 3723.4;
        let mut engine = engine_with(state);

        engine.start(t0());
        engine.begin_edit_total_work();
        assert!(!engine.is_running());
        assert_eq!(
            engine.staged_edit(),
            Some(&TotalWorkInput::new("1", "2", "3"))
        );
        assert!(engine.snapshot().editing);
    }

    #[test]
    fn start_commits_staged_edit() {
        let mut engine = engine_with(TimerState::new());
        engine.begin_edit_total_work();
        engine.stage_edit_total_work(TotalWorkInput::new("2", "oops", "30"));
        engine.start(t0());

        assert!(engine.is_running());
        assert!(!engine.is_editing());
        assert_eq!(engine.state().total_work_seconds, 7230.0);
    }

    #[test]
    fn cancel_edit_keeps_total() {
        let mut state = TimerState::new();
        state.total_work_seconds = 10.0;
        let mut engine = engine_with(state);

        engine.begin_edit_total_work();
        engine.stage_edit_total_work(TotalWorkInput::new("9", "9", "9"));
        engine.cancel_edit_total_work();
        engine.start(t0());

        assert_eq!(engine.state().total_work_seconds, 10.0);
    }

    #[test]
    fn staging_without_edit_is_ignored() {
        let mut engine = engine_with(TimerState::new());
        engine.stage_edit_total_work(TotalWorkInput::new("1", "0", "0"));
        assert!(!engine.is_editing());
    }

    #[test]
    fn restore_reads_store_and_starts_paused() {
        let mut store = MemoryStore::new();
        let mut saved = TimerState::new();
        saved.mode = Mode::Fixed;
        saved.phase = Phase::Resting;
        saved.total_work_seconds = 4000.0;
        saved.fixed_phase_remaining_seconds = 120.5;
        store.save(&saved.to_record(t0())).unwrap();

        let engine = TimerEngine::restore(Recorder::default(), store);
        assert_eq!(engine.state(), &saved);
        assert_eq!(engine.status(), Status::ReadyToRest);
        assert_eq!(engine.presenter().snapshots.len(), 1);
    }

    #[test]
    fn restore_from_empty_store_is_fresh() {
        let engine = TimerEngine::restore(Recorder::default(), MemoryStore::new());
        assert_eq!(engine.state(), &TimerState::new());
    }

    #[test]
    fn ticks_persist_progress() {
        let mut engine = engine_with(TimerState::new());
        engine.start(t0());
        engine.tick(t0() + secs(2.0));

        let record = engine.store().load().unwrap().unwrap();
        assert_eq!(record.total_work_seconds, 2.0);
        assert_eq!(record.saved_at, t0() + secs(2.0));
    }
}
