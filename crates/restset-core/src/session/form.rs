use super::model::Settings;
use super::picker::{CountSelector, DurationSelector, ValueSelector};

/// Editable copy of the settings, backed by value selectors.
///
/// Nothing changes until the form is handed back to
/// `SessionController::save_settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub start_on_select: bool,
    pub slot_1: DurationSelector,
    pub slot_2: DurationSelector,
    pub target_sets: CountSelector,
}

impl SettingsForm {
    /// Load the selectors from the current settings and set target.
    pub fn new(settings: &Settings, target_sets: u32) -> Self {
        Self {
            sound_enabled: settings.sound_enabled,
            vibration_enabled: settings.vibration_enabled,
            start_on_select: settings.start_on_select,
            slot_1: DurationSelector::new(settings.custom_duration_1),
            slot_2: DurationSelector::new(settings.custom_duration_2),
            target_sets: CountSelector::new(target_sets),
        }
    }

    pub fn to_settings(&self) -> Settings {
        Settings {
            sound_enabled: self.sound_enabled,
            vibration_enabled: self.vibration_enabled,
            start_on_select: self.start_on_select,
            target_sets: self.target_sets.value(),
            custom_duration_1: self.slot_1.value(),
            custom_duration_2: self.slot_2.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_form_reproduces_settings() {
        let settings = Settings {
            custom_duration_2: 200,
            target_sets: 4,
            ..Settings::default()
        };
        let form = SettingsForm::new(&settings, settings.target_sets);
        assert_eq!(form.to_settings(), settings);
    }

    #[test]
    fn selectors_drive_the_result() {
        let mut form = SettingsForm::new(&Settings::default(), 10);
        form.slot_2.scroll_to(1, 30);
        form.target_sets.set_value(3);
        form.sound_enabled = false;
        let settings = form.to_settings();
        assert_eq!(settings.custom_duration_2, 90);
        assert_eq!(settings.target_sets, 3);
        assert!(!settings.sound_enabled);
    }
}
