use clap::Subcommand;
use restset_core::Settings;
use serde_json::Value;

use super::open_headless;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "soundEnabled", "targetSets")
    Get {
        key: String,
    },
    /// Change a setting and save it
    Set {
        key: String,
        value: String,
    },
    /// List all settings
    List,
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_headless()?;
    match action {
        SettingsAction::Get { key } => {
            let json = serde_json::to_value(controller.settings())?;
            match json.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown setting: {key}").into()),
            }
        }
        SettingsAction::Set { key, value } => {
            match custom_slot_for(&key) {
                Some(slot) => controller.edit_custom_slot(slot, value.parse()?)?,
                None => {
                    let updated = with_value(controller.settings(), &key, &value)?;
                    controller.apply_settings(updated)?;
                }
            }
            println!("ok");
        }
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(&controller.settings())?);
        }
        SettingsAction::Reset => {
            controller.apply_settings(Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

fn custom_slot_for(key: &str) -> Option<u8> {
    match key {
        "customDuration1" => Some(1),
        "customDuration2" => Some(2),
        _ => None,
    }
}

/// Copy of `settings` with `key` replaced, parsed as the type it already has.
fn with_value(
    settings: Settings,
    key: &str,
    value: &str,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut json = serde_json::to_value(settings)?;
    let slot = json
        .get_mut(key)
        .ok_or_else(|| format!("unknown setting: {key}"))?;
    *slot = match &*slot {
        Value::Bool(_) => Value::Bool(value.parse()?),
        Value::Number(_) => Value::Number(value.parse::<u32>()?.into()),
        _ => return Err(format!("setting {key} cannot be changed").into()),
    };
    Ok(serde_json::from_value(json)?)
}
