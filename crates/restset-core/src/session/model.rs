//! Session progress and user settings.
//!
//! Both serialize with the camelCase field names of the persisted record.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_TARGET_SETS: u32 = 10;
pub const DEFAULT_CUSTOM_DURATION_1: u32 = 45;

/// Sets completed in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub current: u32,
    pub target: u32,
}

impl Default for SessionProgress {
    fn default() -> Self {
        Self {
            current: 0,
            target: DEFAULT_TARGET_SETS,
        }
    }
}

/// User preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "soundEnabled")]
    pub sound_enabled: bool,
    #[serde(rename = "vibrationEnabled")]
    pub vibration_enabled: bool,
    /// Start the countdown as soon as a duration is picked.
    #[serde(rename = "startOnSelect")]
    pub start_on_select: bool,
    #[serde(rename = "targetSets")]
    pub target_sets: u32,
    /// Seconds, 0 = unset.
    #[serde(rename = "customDuration1")]
    pub custom_duration_1: u32,
    /// Seconds, 0 = unset.
    #[serde(rename = "customDuration2")]
    pub custom_duration_2: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            start_on_select: false,
            target_sets: DEFAULT_TARGET_SETS,
            custom_duration_1: DEFAULT_CUSTOM_DURATION_1,
            custom_duration_2: 0,
        }
    }
}

impl Settings {
    /// Check the invariants `apply_settings` relies on. Custom durations
    /// are unsigned, so any value is accepted.
    ///
    /// # Errors
    /// Returns an error for a zero set target.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.target_sets < 1 {
            return Err(ValidationError::invalid("targetSets", "must be at least 1"));
        }
        Ok(())
    }

    /// Seconds stored in custom slot 1 or 2. `None` for any other slot.
    pub fn custom_slot(&self, slot: u8) -> Option<u32> {
        match slot {
            1 => Some(self.custom_duration_1),
            2 => Some(self.custom_duration_2),
            _ => None,
        }
    }

    pub fn custom_slot_mut(&mut self, slot: u8) -> Option<&mut u32> {
        match slot {
            1 => Some(&mut self.custom_duration_1),
            2 => Some(&mut self.custom_duration_2),
            _ => None,
        }
    }
}
