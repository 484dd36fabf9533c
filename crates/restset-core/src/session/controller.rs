//! Session controller.
//!
//! Owns the session progress and settings, drives the timer engine, and
//! writes the persisted record after every change to either. The engine's
//! side effects arrive through [`SessionHooks`], which borrows exactly the
//! parts of the controller they touch.

use tracing::{debug, warn};

use super::form::SettingsForm;
use super::format::format_slot_label;
use super::model::{SessionProgress, Settings};
use super::sink::{Highlight, Notifier, NotifyCue, RenderSink, SlotLabels};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::storage::{AppConfig, PersistentStore};
use crate::timer::{Clock, TimerEngine, TimerObserver, TimerState};

pub struct SessionController<R: RenderSink, N: Notifier> {
    engine: TimerEngine,
    progress: SessionProgress,
    settings: Settings,
    store: PersistentStore,
    presets: Vec<u32>,
    default_duration_secs: u32,
    render: R,
    notifier: N,
}

/// Engine callbacks wired to the session state and sinks.
struct SessionHooks<'a, R, N> {
    progress: &'a mut SessionProgress,
    settings: &'a Settings,
    store: &'a mut PersistentStore,
    render: &'a mut R,
    notifier: &'a mut N,
}

impl<R: RenderSink, N: Notifier> SessionHooks<'_, R, N> {
    /// Count one set. Only ever reached through a fresh start.
    fn increment_set(&mut self) {
        self.progress.current = self.progress.current.saturating_add(1);
        self.store.save(&*self.progress, self.settings);
        self.render
            .on_sets_changed(self.progress.current, self.progress.target);
    }
}

impl<R: RenderSink, N: Notifier> TimerObserver for SessionHooks<'_, R, N> {
    fn on_tick(&mut self, remaining_ms: u64, progress: f64) {
        self.render.on_tick(remaining_ms, progress);
    }

    fn on_controls_changed(&mut self, is_running: bool) {
        self.render.on_controls_changed(is_running);
    }

    fn on_fresh_start(&mut self) {
        self.increment_set();
    }

    fn on_complete(&mut self) {
        if let Err(e) = self.notifier.notify(NotifyCue::from(self.settings)) {
            warn!(error = %e, "completion signal failed");
        }
    }
}

impl<R: RenderSink, N: Notifier> SessionController<R, N> {
    /// Build a controller around `engine`, loading state from `store`.
    pub fn new(engine: TimerEngine, mut store: PersistentStore, render: R, notifier: N) -> Self {
        let (progress, settings) = store.load();
        let defaults = AppConfig::default();
        Self {
            engine,
            progress,
            settings,
            store,
            presets: defaults.timer.presets,
            default_duration_secs: defaults.timer.default_duration_secs,
            render,
            notifier,
        }
    }

    /// Build a controller with engine pacing, presets and launch duration
    /// taken from `config`.
    pub fn from_config(
        config: &AppConfig,
        clock: impl Clock + 'static,
        store: PersistentStore,
        render: R,
        notifier: N,
    ) -> Self {
        let engine = TimerEngine::new(clock).with_tick_interval(config.timer.tick_interval_ms);
        let mut controller = Self::new(engine, store, render, notifier);
        controller.presets = config.timer.presets.clone();
        controller.default_duration_secs = config.timer.default_duration_secs;
        controller
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn progress(&self) -> SessionProgress {
        self.progress
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn timer(&self) -> TimerState {
        self.engine.state()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn presets(&self) -> &[u32] {
        &self.presets
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_persistence_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    pub fn slot_labels(&self) -> SlotLabels {
        SlotLabels {
            slot_1: format_slot_label(self.settings.custom_duration_1),
            slot_2: format_slot_label(self.settings.custom_duration_2),
        }
    }

    /// Which button corresponds to `seconds`: presets first, then custom slots.
    pub fn highlight_for(&self, seconds: u32) -> Highlight {
        if self.presets.contains(&seconds) {
            Highlight::Preset(seconds)
        } else if self.settings.custom_duration_1 == seconds {
            Highlight::CustomSlot(1)
        } else if self.settings.custom_duration_2 == seconds {
            Highlight::CustomSlot(2)
        } else {
            Highlight::None
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// First render: set counter, slot labels, and the launch duration
    /// selected without auto-starting.
    ///
    /// # Errors
    /// Returns an error if the configured launch duration is zero.
    pub fn init(&mut self) -> Result<Event> {
        self.render
            .on_sets_changed(self.progress.current, self.progress.target);
        self.refresh_labels();
        self.set_duration(self.default_duration_secs, false)
    }

    /// Select a countdown length. With `interactive` and `start_on_select`
    /// the countdown starts right away.
    ///
    /// # Errors
    /// Returns `TimerError::InvalidDuration` for zero seconds.
    pub fn set_duration(&mut self, seconds: u32, interactive: bool) -> Result<Event> {
        let selected = {
            let (engine, mut hooks) = self.split();
            engine.select_duration(seconds, &mut hooks)?
        };
        let highlight = self.highlight_for(seconds);
        self.render.on_duration_highlighted(highlight);

        if interactive && self.settings.start_on_select {
            if let Some(started) = self.start_with(Some(seconds))? {
                return Ok(started);
            }
        }
        Ok(selected)
    }

    /// Select the duration stored in custom slot 1 or 2.
    ///
    /// # Errors
    /// Returns `CoreError::CustomSlotUnset` when the slot has no duration,
    /// so the host can open the settings instead.
    pub fn select_custom_slot(&mut self, slot: u8) -> Result<Event> {
        match self.settings.custom_slot(slot) {
            None => Err(ValidationError::invalid("slot", format!("no custom slot {slot}")).into()),
            Some(0) => Err(CoreError::CustomSlotUnset(slot)),
            Some(seconds) => self.set_duration(seconds, true),
        }
    }

    /// Store a new duration in a custom slot. The only duration change that
    /// is persisted.
    ///
    /// # Errors
    /// Returns a validation error for an unknown slot.
    pub fn edit_custom_slot(&mut self, slot: u8, seconds: u32) -> Result<()> {
        let mut updated = self.settings;
        let target = updated
            .custom_slot_mut(slot)
            .ok_or_else(|| ValidationError::invalid("slot", format!("no custom slot {slot}")))?;
        *target = seconds;
        updated.validate()?;

        self.settings = updated;
        self.store.save(&self.progress, &self.settings);
        self.refresh_labels();
        Ok(())
    }

    /// Start or resume the selected countdown.
    ///
    /// # Errors
    /// Returns `TimerError::NothingToStart` when no time is left.
    pub fn start(&mut self) -> Result<Option<Event>> {
        self.start_with(None)
    }

    /// Start, optionally with a fresh explicit duration.
    ///
    /// # Errors
    /// Returns a timer error if the duration is zero or nothing is left to run.
    pub fn start_with(&mut self, explicit: Option<u32>) -> Result<Option<Event>> {
        let (engine, mut hooks) = self.split();
        Ok(engine.start(explicit, &mut hooks)?)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let (engine, mut hooks) = self.split();
        engine.pause(&mut hooks)
    }

    pub fn reset(&mut self) -> Event {
        let (engine, mut hooks) = self.split();
        engine.reset(&mut hooks)
    }

    /// Pause when running, otherwise start or resume.
    ///
    /// # Errors
    /// Returns `TimerError::NothingToStart` when no time is left.
    pub fn toggle(&mut self) -> Result<Option<Event>> {
        if self.engine.is_running() {
            Ok(self.pause())
        } else {
            self.start()
        }
    }

    /// Dispatch due engine tasks. Call this periodically.
    pub fn poll(&mut self) -> Vec<Event> {
        let (engine, mut hooks) = self.split();
        engine.poll(&mut hooks)
    }

    pub fn reset_sets(&mut self) {
        self.progress.current = 0;
        self.store.save(&self.progress, &self.settings);
        self.render
            .on_sets_changed(self.progress.current, self.progress.target);
    }

    /// Replace the settings and sync the set target.
    ///
    /// # Errors
    /// Returns a validation error and keeps the previous settings if
    /// `settings` is invalid.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.progress.target = settings.target_sets;
        self.store.save(&self.progress, &self.settings);
        debug!(target = settings.target_sets, "settings applied");

        self.render
            .on_sets_changed(self.progress.current, self.progress.target);
        self.refresh_labels();
        Ok(())
    }

    /// Settings form loaded from the current state.
    pub fn open_settings(&self) -> SettingsForm {
        SettingsForm::new(&self.settings, self.progress.target)
    }

    /// Apply an edited settings form.
    ///
    /// # Errors
    /// Returns a validation error if the form produces invalid settings.
    pub fn save_settings(&mut self, form: &SettingsForm) -> Result<()> {
        self.apply_settings(form.to_settings())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn refresh_labels(&mut self) {
        let labels = self.slot_labels();
        self.render.on_labels_changed(&labels);
    }

    fn split(&mut self) -> (&mut TimerEngine, SessionHooks<'_, R, N>) {
        (
            &mut self.engine,
            SessionHooks {
                progress: &mut self.progress,
                settings: &self.settings,
                store: &mut self.store,
                render: &mut self.render,
                notifier: &mut self.notifier,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimerError;
    use crate::session::picker::ValueSelector;
    use crate::session::sink::NotifyError;
    use crate::storage::MemoryKv;
    use crate::timer::{ManualClock, TimerStatus, GRACE_DELAY_MS};

    #[derive(Default)]
    struct RecordingSink {
        ticks: Vec<(u64, f64)>,
        controls: Vec<bool>,
        sets: Vec<(u32, u32)>,
        highlights: Vec<Highlight>,
        labels: Vec<SlotLabels>,
    }

    impl RenderSink for RecordingSink {
        fn on_tick(&mut self, remaining_ms: u64, progress: f64) {
            self.ticks.push((remaining_ms, progress));
        }
        fn on_controls_changed(&mut self, is_running: bool) {
            self.controls.push(is_running);
        }
        fn on_sets_changed(&mut self, current: u32, target: u32) {
            self.sets.push((current, target));
        }
        fn on_duration_highlighted(&mut self, highlight: Highlight) {
            self.highlights.push(highlight);
        }
        fn on_labels_changed(&mut self, labels: &SlotLabels) {
            self.labels.push(labels.clone());
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        cues: Vec<NotifyCue>,
        fail: bool,
    }

    impl Notifier for CountingNotifier {
        fn notify(&mut self, cue: NotifyCue) -> Result<(), NotifyError> {
            self.cues.push(cue);
            if self.fail {
                return Err(NotifyError::Blocked("autoplay".into()));
            }
            Ok(())
        }
    }

    type Controller = SessionController<RecordingSink, CountingNotifier>;

    fn controller() -> (Controller, ManualClock) {
        let clock = ManualClock::new(5_000_000);
        let engine = TimerEngine::new(clock.clone());
        let store = PersistentStore::new(MemoryKv::new());
        let mut c = SessionController::new(
            engine,
            store,
            RecordingSink::default(),
            CountingNotifier::default(),
        );
        c.init().unwrap();
        (c, clock)
    }

    fn advance(c: &mut Controller, clock: &ManualClock, ms: u64) {
        let step = c.engine().tick_interval_ms();
        let mut elapsed = 0;
        while elapsed < ms {
            clock.advance(step);
            elapsed += step;
            c.poll();
        }
    }

    #[test]
    fn init_selects_default_duration_without_starting() {
        let (c, _clock) = controller();
        assert_eq!(c.timer().status, TimerStatus::Idle);
        assert_eq!(c.timer().remaining_ms, 60_000);
        assert_eq!(c.progress().current, 0);
        assert_eq!(c.render().highlights, vec![Highlight::Preset(60)]);
        assert_eq!(c.render().sets, vec![(0, 10)]);
        assert_eq!(c.render().labels[0].slot_1, "0:45");
        assert_eq!(c.render().labels[0].slot_2, "--:--");
    }

    #[test]
    fn fresh_start_counts_one_set_resume_does_not() {
        let (mut c, clock) = controller();
        c.start().unwrap();
        assert_eq!(c.progress().current, 1);

        clock.advance(3_000);
        c.pause();
        c.start().unwrap();
        assert_eq!(c.progress().current, 1);

        c.toggle().unwrap();
        assert_eq!(c.timer().status, TimerStatus::Paused);
        c.toggle().unwrap();
        assert_eq!(c.timer().status, TimerStatus::Running);
        assert_eq!(c.progress().current, 1);
    }

    #[test]
    fn selecting_a_duration_never_counts_a_set() {
        let (mut c, _clock) = controller();
        c.set_duration(90, true).unwrap();
        c.set_duration(30, false).unwrap();
        assert_eq!(c.progress().current, 0);
        assert_eq!(c.timer().status, TimerStatus::Idle);
    }

    #[test]
    fn start_on_select_starts_interactive_selections_only() {
        let (mut c, _clock) = controller();
        c.apply_settings(Settings {
            start_on_select: true,
            ..c.settings()
        })
        .unwrap();

        c.set_duration(90, false).unwrap();
        assert_eq!(c.timer().status, TimerStatus::Idle);

        let event = c.set_duration(90, true).unwrap();
        assert!(matches!(event, Event::TimerStarted { fresh: true, .. }));
        assert_eq!(c.timer().status, TimerStatus::Running);
        assert_eq!(c.progress().current, 1);
    }

    #[test]
    fn highlight_prefers_presets_then_custom_slots() {
        let (mut c, _clock) = controller();
        c.set_duration(45, true).unwrap();
        c.edit_custom_slot(2, 200).unwrap();
        c.set_duration(200, true).unwrap();
        c.set_duration(17, true).unwrap();
        assert_eq!(
            &c.render().highlights[1..],
            &[
                Highlight::CustomSlot(1),
                Highlight::CustomSlot(2),
                Highlight::None
            ]
        );
    }

    #[test]
    fn unset_custom_slot_is_reported() {
        let (mut c, _clock) = controller();
        assert!(matches!(
            c.select_custom_slot(2),
            Err(CoreError::CustomSlotUnset(2))
        ));
        assert!(c.select_custom_slot(7).is_err());
        c.select_custom_slot(1).unwrap();
        assert_eq!(c.timer().total_ms, 45_000);
    }

    #[test]
    fn invalid_duration_keeps_previous_state() {
        let (mut c, _clock) = controller();
        assert!(matches!(
            c.set_duration(0, true),
            Err(CoreError::Timer(TimerError::InvalidDuration(0)))
        ));
        assert_eq!(c.timer().total_ms, 60_000);
    }

    #[test]
    fn completion_notifies_once_and_swallows_failures() {
        let (mut c, clock) = controller();
        c.notifier.fail = true;
        c.set_duration(5, false).unwrap();
        c.start().unwrap();

        advance(&mut c, &clock, 5_000);
        assert_eq!(c.timer().status, TimerStatus::Idle);
        assert_eq!(c.timer().remaining_ms, 0);
        assert_eq!(
            c.notifier().cues,
            vec![NotifyCue {
                sound: true,
                vibration: true
            }]
        );

        advance(&mut c, &clock, GRACE_DELAY_MS);
        assert_eq!(c.timer().remaining_ms, 5_000);
        assert_eq!(c.notifier().cues.len(), 1);
    }

    #[test]
    fn notify_cue_follows_settings() {
        let (mut c, clock) = controller();
        c.apply_settings(Settings {
            sound_enabled: false,
            ..c.settings()
        })
        .unwrap();
        c.start_with(Some(1)).unwrap();
        advance(&mut c, &clock, 1_000);
        assert_eq!(
            c.notifier().cues,
            vec![NotifyCue {
                sound: false,
                vibration: true
            }]
        );
    }

    #[test]
    fn apply_settings_syncs_target_immediately() {
        let (mut c, _clock) = controller();
        c.start().unwrap();
        c.apply_settings(Settings {
            target_sets: 5,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(c.progress(), SessionProgress { current: 1, target: 5 });
        assert_eq!(c.render().sets.last(), Some(&(1, 5)));
    }

    #[test]
    fn invalid_settings_are_rejected_atomically() {
        let (mut c, _clock) = controller();
        let before = (c.settings(), c.progress());
        let result = c.apply_settings(Settings {
            target_sets: 0,
            sound_enabled: false,
            ..Settings::default()
        });
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!((c.settings(), c.progress()), before);
    }

    #[test]
    fn reset_sets_clears_counter_only() {
        let (mut c, _clock) = controller();
        c.start().unwrap();
        c.reset();
        c.start().unwrap();
        assert_eq!(c.progress().current, 2);
        c.reset_sets();
        assert_eq!(c.progress(), SessionProgress { current: 0, target: 10 });
        assert_eq!(c.timer().status, TimerStatus::Running);
    }

    #[test]
    fn settings_form_round_trip() {
        let (mut c, _clock) = controller();
        let mut form = c.open_settings();
        form.target_sets.set_value(8);
        form.slot_2.scroll_to(2, 0);
        form.vibration_enabled = false;
        c.save_settings(&form).unwrap();

        assert_eq!(c.progress().target, 8);
        assert_eq!(c.settings().custom_duration_2, 120);
        assert!(!c.settings().vibration_enabled);
        assert_eq!(c.render().labels.last().unwrap().slot_2, "2:00");
    }

    #[test]
    fn edit_custom_slot_validates() {
        let (mut c, _clock) = controller();
        assert!(c.edit_custom_slot(3, 10).is_err());
        assert_eq!(c.settings().custom_duration_1, 45);
        c.edit_custom_slot(1, 0).unwrap();
        assert_eq!(c.slot_labels().slot_1, "--:--");
        c.edit_custom_slot(2, 900).unwrap();
        assert_eq!(c.settings().custom_duration_2, 900);
        assert_eq!(c.slot_labels().slot_2, "15:00");
    }
}
