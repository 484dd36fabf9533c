//! Value selectors backing the settings form.
//!
//! A selector is a set of scroll columns that together produce one integer.

/// Minutes column runs 0..=9.
pub const MAX_MINUTES: u32 = 9;
pub const MAX_DURATION_SECS: u32 = MAX_MINUTES * 60 + 59;
pub const MIN_SETS: u32 = 1;
pub const MAX_SETS: u32 = 50;

/// Opaque integer source for duration and set-count inputs.
pub trait ValueSelector {
    fn value(&self) -> u32;
    fn set_value(&mut self, value: u32);
}

/// Minutes and seconds columns for a duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationSelector {
    minutes: u32,
    seconds: u32,
}

impl DurationSelector {
    pub fn new(total_secs: u32) -> Self {
        let mut selector = Self::default();
        selector.set_value(total_secs);
        selector
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Scroll each column independently; out-of-range rows snap to the ends.
    pub fn scroll_to(&mut self, minutes: u32, seconds: u32) {
        self.minutes = minutes.min(MAX_MINUTES);
        self.seconds = seconds.min(59);
    }
}

impl ValueSelector for DurationSelector {
    fn value(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }

    fn set_value(&mut self, value: u32) {
        let value = value.min(MAX_DURATION_SECS);
        self.minutes = value / 60;
        self.seconds = value % 60;
    }
}

/// Single column counting 1..=50.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSelector {
    value: u32,
}

impl CountSelector {
    pub fn new(value: u32) -> Self {
        let mut selector = Self { value: MIN_SETS };
        selector.set_value(value);
        selector
    }
}

impl ValueSelector for CountSelector {
    fn value(&self) -> u32 {
        self.value
    }

    fn set_value(&mut self, value: u32) {
        self.value = value.clamp(MIN_SETS, MAX_SETS);
    }
}
