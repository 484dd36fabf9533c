mod controller;
mod form;
pub mod format;
mod model;
mod picker;
mod sink;

pub use controller::SessionController;
pub use form::SettingsForm;
pub use format::{format_clock, format_sets, format_slot_label};
pub use model::{SessionProgress, Settings, DEFAULT_CUSTOM_DURATION_1, DEFAULT_TARGET_SETS};
pub use picker::{
    CountSelector, DurationSelector, ValueSelector, MAX_DURATION_SECS, MAX_SETS, MIN_SETS,
};
pub use sink::{Highlight, Notifier, NotifyCue, NotifyError, NullSink, RenderSink, SlotLabels};
