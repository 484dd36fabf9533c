use thiserror::Error;

use super::model::Settings;

/// Which duration button should appear selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// One of the built-in presets, in seconds.
    Preset(u32),
    /// Custom slot 1 or 2.
    CustomSlot(u8),
    None,
}

/// Labels for the two custom duration buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLabels {
    pub slot_1: String,
    pub slot_2: String,
}

/// Presentation layer. Every method except `on_tick` has a no-op default.
pub trait RenderSink {
    fn on_tick(&mut self, remaining_ms: u64, progress: f64);

    fn on_controls_changed(&mut self, _is_running: bool) {}

    fn on_sets_changed(&mut self, _current: u32, _target: u32) {}

    fn on_duration_highlighted(&mut self, _highlight: Highlight) {}

    fn on_labels_changed(&mut self, _labels: &SlotLabels) {}
}

/// What the completion signal should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyCue {
    pub sound: bool,
    pub vibration: bool,
}

impl From<&Settings> for NotifyCue {
    fn from(settings: &Settings) -> Self {
        Self {
            sound: settings.sound_enabled,
            vibration: settings.vibration_enabled,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Playback refused by the platform, e.g. autoplay policy
    #[error("Playback blocked: {0}")]
    Blocked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sound/haptic signal played when a countdown completes.
pub trait Notifier {
    /// # Errors
    /// Failures are logged by the caller and never reach the timer.
    fn notify(&mut self, cue: NotifyCue) -> Result<(), NotifyError>;
}

/// Discards everything. Useful for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn on_tick(&mut self, _remaining_ms: u64, _progress: f64) {}
}

impl Notifier for NullSink {
    fn notify(&mut self, _cue: NotifyCue) -> Result<(), NotifyError> {
        Ok(())
    }
}
