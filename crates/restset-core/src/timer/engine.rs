//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. While running, the
//! deadline is the source of truth and the remaining time is derived from it,
//! so long gaps between polls never cause drift.
//! It does not use internal threads - the caller is responsible for calling
//! `poll()` periodically, which dispatches the engine's own deferred tasks.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> Idle (complete)
//!   ^        |                              |
//!   +--------+-------- reset ---------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SystemClock);
//! engine.select_duration(90, &mut observer)?;
//! engine.start(None, &mut observer)?;
//! // In a loop:
//! engine.poll(&mut observer); // Returns events such as TimerCompleted
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clock::Clock;
use super::schedule::{TaskHandle, TaskKind, TaskQueue};
use crate::error::TimerError;
use crate::events::Event;

/// Delay between completion and restoring the full duration on screen.
pub const GRACE_DELAY_MS: u64 = 1_000;

/// Default spacing between scheduled ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Point-in-time view of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub status: TimerStatus,
    pub remaining_ms: u64,
    pub total_ms: u64,
    /// Only set while running.
    pub deadline_ms: Option<u64>,
}

/// Receives the engine's side effects.
///
/// Callbacks run synchronously inside the transition that triggers them.
pub trait TimerObserver {
    /// Countdown display changed. `progress` is `remaining / total`.
    fn on_tick(&mut self, remaining_ms: u64, progress: f64);

    fn on_controls_changed(&mut self, _is_running: bool) {}

    /// Fired once per Idle -> Running transition, before the status flips.
    fn on_fresh_start(&mut self) {}

    /// The countdown reached zero.
    fn on_complete(&mut self) {}
}

impl TimerObserver for () {
    fn on_tick(&mut self, _remaining_ms: u64, _progress: f64) {}
}

/// Core timer engine.
pub struct TimerEngine {
    clock: Box<dyn Clock>,
    status: TimerStatus,
    remaining_ms: u64,
    total_ms: u64,
    deadline_ms: Option<u64>,
    tick_interval_ms: u64,
    /// Bumped on every fresh selection or start; stale restores compare against it.
    generation: u64,
    tick_task: Option<TaskHandle>,
    restore_task: Option<TaskHandle>,
    tasks: TaskQueue,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("status", &self.status)
            .field("remaining_ms", &self.remaining_ms)
            .field("total_ms", &self.total_ms)
            .field("deadline_ms", &self.deadline_ms)
            .field("generation", &self.generation)
            .field("pending_tasks", &self.tasks.len())
            .finish()
    }
}

impl TimerEngine {
    /// Create an idle engine with nothing selected.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            status: TimerStatus::Idle,
            remaining_ms: 0,
            total_ms: 0,
            deadline_ms: None,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            generation: 0,
            tick_task: None,
            restore_task: None,
            tasks: TaskQueue::new(),
        }
    }

    pub fn with_tick_interval(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Remaining time, derived from the deadline while running.
    pub fn remaining_ms(&self) -> u64 {
        match (self.status, self.deadline_ms) {
            (TimerStatus::Running, Some(deadline)) => deadline.saturating_sub(self.clock.now_ms()),
            _ => self.remaining_ms,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// 0.0 .. 1.0 fraction of the countdown still left.
    pub fn progress(&self) -> f64 {
        progress_of(self.remaining_ms(), self.total_ms)
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            status: self.status,
            remaining_ms: self.remaining_ms(),
            total_ms: self.total_ms,
            deadline_ms: self.deadline_ms,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            remaining_ms: self.remaining_ms(),
            total_ms: self.total_ms,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    /// When the host should poll next, if anything is pending.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.tasks.next_due_ms()
    }

    /// True once nothing is left to dispatch: no tick, no pending restore.
    pub fn is_settled(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_ticks(&self) -> usize {
        self.tasks
            .count_matching(|kind| matches!(kind, TaskKind::Tick))
    }

    pub fn has_pending_restore(&self) -> bool {
        self.restore_task.is_some()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a new countdown length. Cancels anything in flight.
    pub fn select_duration(
        &mut self,
        seconds: u32,
        observer: &mut dyn TimerObserver,
    ) -> Result<Event, TimerError> {
        if seconds == 0 {
            return Err(TimerError::InvalidDuration(seconds));
        }
        self.cancel_tick();
        self.cancel_restore();
        self.generation += 1;
        self.status = TimerStatus::Idle;
        self.deadline_ms = None;
        self.total_ms = u64::from(seconds) * 1_000;
        self.remaining_ms = self.total_ms;
        debug!(total_ms = self.total_ms, "duration selected");

        observer.on_tick(self.remaining_ms, 1.0);
        observer.on_controls_changed(false);
        Ok(Event::DurationSelected {
            total_ms: self.total_ms,
            at: Utc::now(),
        })
    }

    /// Start or resume the countdown.
    ///
    /// With `explicit`, selects that duration first and always starts fresh.
    /// Without it, resumes a paused countdown or starts the selected one.
    /// Returns `Ok(None)` if already running.
    pub fn start(
        &mut self,
        explicit: Option<u32>,
        observer: &mut dyn TimerObserver,
    ) -> Result<Option<Event>, TimerError> {
        if let Some(seconds) = explicit {
            self.select_duration(seconds, observer)?;
        } else if self.status == TimerStatus::Running {
            return Ok(None);
        }
        if self.remaining_ms == 0 {
            return Err(TimerError::NothingToStart);
        }

        let fresh = self.status == TimerStatus::Idle;
        self.cancel_restore();
        self.generation += 1;
        if fresh {
            observer.on_fresh_start();
        }

        let now = self.clock.now_ms();
        self.deadline_ms = Some(now.saturating_add(self.remaining_ms));
        self.status = TimerStatus::Running;
        debug!(fresh, remaining_ms = self.remaining_ms, "timer started");
        observer.on_controls_changed(true);

        let event = Event::TimerStarted {
            fresh,
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms,
            at: Utc::now(),
        };
        self.tick(observer);
        Ok(Some(event))
    }

    /// Freeze the countdown. No-op unless running.
    pub fn pause(&mut self, observer: &mut dyn TimerObserver) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let remaining = self.remaining_ms();
        if remaining == 0 {
            return Some(self.complete(observer));
        }
        self.cancel_tick();
        self.remaining_ms = remaining;
        self.deadline_ms = None;
        self.status = TimerStatus::Paused;
        debug!(remaining_ms = remaining, "timer paused");

        observer.on_controls_changed(false);
        Some(Event::TimerPaused {
            remaining_ms: remaining,
            at: Utc::now(),
        })
    }

    /// Back to the full selected duration, idle.
    pub fn reset(&mut self, observer: &mut dyn TimerObserver) -> Event {
        self.cancel_tick();
        self.cancel_restore();
        self.status = TimerStatus::Idle;
        self.deadline_ms = None;
        self.remaining_ms = self.total_ms;
        debug!(remaining_ms = self.remaining_ms, "timer reset");

        observer.on_tick(self.remaining_ms, 1.0);
        observer.on_controls_changed(false);
        Event::TimerReset {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        }
    }

    /// Recompute the countdown from the deadline.
    ///
    /// Normally dispatched by `poll()`. Returns `Some(Event::TimerCompleted)`
    /// when the deadline has passed.
    pub fn tick(&mut self, observer: &mut dyn TimerObserver) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.cancel_tick();
        let now = self.clock.now_ms();
        let remaining = self.deadline_ms.unwrap_or(now).saturating_sub(now);
        if remaining == 0 {
            return Some(self.complete(observer));
        }

        self.remaining_ms = remaining;
        observer.on_tick(remaining, progress_of(remaining, self.total_ms));
        self.tick_task = Some(
            self.tasks
                .schedule(now.saturating_add(self.tick_interval_ms), TaskKind::Tick),
        );
        None
    }

    /// Finish the countdown: notify, then restore the full duration after
    /// the grace delay.
    pub fn complete(&mut self, observer: &mut dyn TimerObserver) -> Event {
        self.cancel_tick();
        self.cancel_restore();
        self.status = TimerStatus::Idle;
        self.remaining_ms = 0;
        self.deadline_ms = None;
        debug!(total_ms = self.total_ms, "timer completed");

        observer.on_tick(0, 0.0);
        observer.on_controls_changed(false);
        observer.on_complete();

        let due = self.clock.now_ms().saturating_add(GRACE_DELAY_MS);
        self.restore_task = Some(self.tasks.schedule(
            due,
            TaskKind::Restore {
                generation: self.generation,
            },
        ));
        Event::TimerCompleted {
            total_ms: self.total_ms,
            at: Utc::now(),
        }
    }

    /// Dispatch every deferred task that is due.
    pub fn poll(&mut self, observer: &mut dyn TimerObserver) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((handle, kind)) = self.tasks.pop_due(self.clock.now_ms()) {
            match kind {
                TaskKind::Tick => {
                    if self.tick_task == Some(handle) {
                        self.tick_task = None;
                    }
                    events.extend(self.tick(observer));
                }
                TaskKind::Restore { generation } => {
                    if self.restore_task == Some(handle) {
                        self.restore_task = None;
                    }
                    events.extend(self.restore(generation, observer));
                }
            }
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restore(&mut self, generation: u64, observer: &mut dyn TimerObserver) -> Option<Event> {
        if generation != self.generation
            || self.status != TimerStatus::Idle
            || self.remaining_ms != 0
        {
            debug!(generation, current = self.generation, "stale restore ignored");
            return None;
        }
        self.remaining_ms = self.total_ms;
        observer.on_tick(self.remaining_ms, 1.0);
        Some(Event::TimerRestored {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            self.tasks.cancel(handle);
        }
    }

    fn cancel_restore(&mut self) {
        if let Some(handle) = self.restore_task.take() {
            self.tasks.cancel(handle);
        }
    }
}

fn progress_of(remaining_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    remaining_ms as f64 / total_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;

    #[derive(Default)]
    struct Recorder {
        ticks: Vec<(u64, f64)>,
        controls: Vec<bool>,
        fresh_starts: u32,
        completions: u32,
    }

    impl TimerObserver for Recorder {
        fn on_tick(&mut self, remaining_ms: u64, progress: f64) {
            self.ticks.push((remaining_ms, progress));
        }
        fn on_controls_changed(&mut self, is_running: bool) {
            self.controls.push(is_running);
        }
        fn on_fresh_start(&mut self) {
            self.fresh_starts += 1;
        }
        fn on_complete(&mut self) {
            self.completions += 1;
        }
    }

    fn engine() -> (TimerEngine, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (TimerEngine::new(clock.clone()), clock)
    }

    fn run_for(engine: &mut TimerEngine, clock: &ManualClock, ms: u64, obs: &mut Recorder) {
        let step = engine.tick_interval_ms();
        let mut elapsed = 0;
        while elapsed < ms {
            clock.advance(step);
            elapsed += step;
            engine.poll(obs);
        }
    }

    #[test]
    fn select_then_reset_restores_full_duration() {
        let (mut engine, _clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(45, &mut obs).unwrap();
        engine.reset(&mut obs);
        assert_eq!(engine.remaining_ms(), 45_000);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(obs.ticks.last(), Some(&(45_000, 1.0)));
    }

    #[test]
    fn zero_duration_is_rejected_without_state_change() {
        let (mut engine, _clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(30, &mut obs).unwrap();
        assert_eq!(
            engine.select_duration(0, &mut obs),
            Err(TimerError::InvalidDuration(0))
        );
        assert_eq!(
            engine.start(Some(0), &mut obs),
            Err(TimerError::InvalidDuration(0))
        );
        assert_eq!(engine.total_ms(), 30_000);
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn start_with_nothing_selected_is_rejected() {
        let (mut engine, _clock) = engine();
        let mut obs = Recorder::default();
        assert_eq!(engine.start(None, &mut obs), Err(TimerError::NothingToStart));
        assert_eq!(obs.fresh_starts, 0);
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn fresh_start_fires_once_resume_does_not() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(60, &mut obs).unwrap();

        let started = engine.start(None, &mut obs).unwrap().unwrap();
        assert!(matches!(started, Event::TimerStarted { fresh: true, .. }));
        assert_eq!(obs.fresh_starts, 1);

        clock.advance(5_000);
        engine.pause(&mut obs).unwrap();
        let resumed = engine.start(None, &mut obs).unwrap().unwrap();
        assert!(matches!(resumed, Event::TimerStarted { fresh: false, .. }));
        assert_eq!(obs.fresh_starts, 1);

        // Already running.
        assert_eq!(engine.start(None, &mut obs), Ok(None));
        assert_eq!(obs.fresh_starts, 1);
    }

    #[test]
    fn pause_preserves_remaining_across_the_pause_interval() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.start(Some(60), &mut obs).unwrap();

        clock.advance(12_345);
        engine.pause(&mut obs).unwrap();
        let frozen = engine.remaining_ms();
        assert_eq!(frozen, 60_000 - 12_345);
        assert_eq!(engine.pending_ticks(), 0);

        clock.advance(300_000);
        assert_eq!(engine.remaining_ms(), frozen);
        engine.start(None, &mut obs).unwrap();
        assert_eq!(engine.remaining_ms(), frozen);
        assert_eq!(engine.total_ms(), 60_000);
    }

    #[test]
    fn pause_when_not_running_is_noop() {
        let (mut engine, _clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(10, &mut obs).unwrap();
        assert!(engine.pause(&mut obs).is_none());
        assert_eq!(engine.status(), TimerStatus::Idle);
    }

    #[test]
    fn at_most_one_tick_is_pending() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.start(Some(30), &mut obs).unwrap();
        assert_eq!(engine.pending_ticks(), 1);
        engine.tick(&mut obs);
        engine.tick(&mut obs);
        assert_eq!(engine.pending_ticks(), 1);
        clock.advance(1_000);
        engine.poll(&mut obs);
        assert_eq!(engine.pending_ticks(), 1);
    }

    #[test]
    fn completion_notifies_once_then_restores_after_grace() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(2, &mut obs).unwrap();
        engine.start(None, &mut obs).unwrap();

        clock.advance(2_000);
        let events = engine.poll(&mut obs);
        assert!(matches!(events.as_slice(), [Event::TimerCompleted { .. }]));
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_ms(), 0);
        assert_eq!(obs.completions, 1);
        assert_eq!(obs.ticks.last(), Some(&(0, 0.0)));

        clock.advance(GRACE_DELAY_MS - 1);
        assert!(engine.poll(&mut obs).is_empty());
        assert_eq!(engine.remaining_ms(), 0);

        clock.advance(1);
        let events = engine.poll(&mut obs);
        assert!(matches!(events.as_slice(), [Event::TimerRestored { .. }]));
        assert_eq!(engine.remaining_ms(), 2_000);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(obs.completions, 1);
        assert_eq!(obs.ticks.last(), Some(&(2_000, 1.0)));
    }

    #[test]
    fn long_gap_catches_up_in_one_tick() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.start(Some(90), &mut obs).unwrap();

        clock.advance(40_000);
        engine.poll(&mut obs);
        assert_eq!(engine.remaining_ms(), 50_000);
        assert_eq!(obs.ticks.last(), Some(&(50_000, 50_000.0 / 90_000.0)));

        clock.advance(120_000);
        let events = engine.poll(&mut obs);
        assert_eq!(events.len(), 1);
        assert_eq!(obs.completions, 1);
    }

    #[test]
    fn new_selection_suppresses_pending_restore() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.start(Some(1), &mut obs).unwrap();
        clock.advance(1_000);
        engine.poll(&mut obs);
        assert!(engine.has_pending_restore());

        engine.select_duration(30, &mut obs).unwrap();
        assert!(!engine.has_pending_restore());
        engine.start(None, &mut obs).unwrap();
        clock.advance(500);
        engine.poll(&mut obs);
        assert_eq!(engine.status(), TimerStatus::Running);
        assert_eq!(engine.remaining_ms(), 29_500);
        assert_eq!(engine.total_ms(), 30_000);
    }

    #[test]
    fn stale_restore_is_ignored_by_generation() {
        let (mut engine, _clock) = engine();
        let mut obs = Recorder::default();
        engine.start(Some(5), &mut obs).unwrap();
        let stale = engine.generation;
        engine.complete(&mut obs);
        engine.select_duration(8, &mut obs).unwrap();
        engine.start(None, &mut obs).unwrap();
        engine.complete(&mut obs);
        assert!(engine.restore(stale, &mut obs).is_none());
        assert_eq!(engine.remaining_ms(), 0);
    }

    #[test]
    fn preset_then_start_keeps_total_baseline() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(120, &mut obs).unwrap();
        engine.start(None, &mut obs).unwrap();
        clock.advance(30_000);
        engine.pause(&mut obs);
        engine.reset(&mut obs);
        assert_eq!(engine.remaining_ms(), 120_000);
        assert_eq!(engine.total_ms(), 120_000);
        assert_eq!(obs.fresh_starts, 1);

        engine.start(None, &mut obs).unwrap();
        assert_eq!(obs.fresh_starts, 2);
        assert_eq!(engine.total_ms(), 120_000);
    }

    #[test]
    fn full_countdown_scenario() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        engine.select_duration(60, &mut obs).unwrap();
        engine.start(None, &mut obs).unwrap();

        run_for(&mut engine, &clock, 60_000, &mut obs);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_ms(), 0);
        assert_eq!(obs.ticks.iter().filter(|t| t.0 == 0).count(), 1);

        run_for(&mut engine, &clock, 1_000, &mut obs);
        assert_eq!(engine.remaining_ms(), 60_000);
        assert_eq!(obs.completions, 1);
        assert_eq!(obs.fresh_starts, 1);
        assert!(engine.next_due_ms().is_none());
        assert!(engine.is_settled());
    }

    #[test]
    fn running_and_grace_window_are_not_settled() {
        let (mut engine, clock) = engine();
        let mut obs = Recorder::default();
        assert!(engine.is_settled());
        engine.start(Some(1), &mut obs).unwrap();
        assert!(!engine.is_settled());
        engine.pause(&mut obs);
        assert!(engine.is_settled());
        engine.start(None, &mut obs).unwrap();
        run_for(&mut engine, &clock, 1_000, &mut obs);
        assert_eq!(obs.completions, 1);
        assert!(!engine.is_settled());
        run_for(&mut engine, &clock, 1_000, &mut obs);
        assert!(engine.is_settled());
    }

    #[test]
    fn snapshot_reports_state() {
        let (mut engine, _clock) = engine();
        engine.select_duration(90, &mut ()).unwrap();
        match engine.snapshot() {
            Event::StateSnapshot {
                status,
                remaining_ms,
                total_ms,
                progress,
                ..
            } => {
                assert_eq!(status, TimerStatus::Idle);
                assert_eq!(remaining_ms, 90_000);
                assert_eq!(total_ms, 90_000);
                assert_eq!(progress, 1.0);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
