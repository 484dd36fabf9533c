use serde_json::json;

use super::open_headless;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let controller = open_headless()?;
    let out = json!({
        "sets": controller.progress(),
        "settings": controller.settings(),
        "timer": controller.timer(),
        "presets": controller.presets(),
        "persistence": if controller.is_persistence_degraded() { "memory" } else { "sqlite" },
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
