pub mod config;
pub mod run;
pub mod sets;
pub mod settings;
pub mod status;

use restset_core::session::{Notifier, NullSink, RenderSink};
use restset_core::{AppConfig, PersistentStore, SessionController, SystemClock};

/// Controller over the default store, already initialised.
pub fn open_controller<R: RenderSink, N: Notifier>(
    config: &AppConfig,
    render: R,
    notifier: N,
) -> Result<SessionController<R, N>, Box<dyn std::error::Error>> {
    let store = PersistentStore::open_default();
    let mut controller = SessionController::from_config(config, SystemClock, store, render, notifier);
    controller.init()?;
    Ok(controller)
}

/// Headless controller for commands that only read or edit session state.
pub fn open_headless() -> Result<SessionController<NullSink, NullSink>, Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    open_controller(&config, NullSink, NullSink)
}
