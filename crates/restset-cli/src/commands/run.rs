use std::time::Duration;

use clap::Args;
use restset_core::session::{Notifier, NullSink, RenderSink};
use restset_core::{AppConfig, Event, SessionController};
use tracing::debug;

use super::open_controller;
use crate::terminal::{BellNotifier, TerminalSink};

#[derive(Args)]
pub struct RunArgs {
    /// Countdown length in seconds (defaults to timer.default_duration_secs)
    #[arg(conflicts_with = "slot")]
    pub seconds: Option<u32>,
    /// Use custom slot 1 or 2 instead of an explicit length
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub slot: Option<u8>,
    /// Do not ring the terminal bell on completion
    #[arg(long)]
    pub no_bell: bool,
    /// Print every engine event as a JSON line instead of the status line
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let bell = BellNotifier::new(std::io::stderr(), config.terminal.bell && !args.no_bell);

    if args.json {
        let mut controller = open_controller(&config, NullSink, bell)?;
        drive(&mut controller, &args, |event| {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
        })
    } else {
        let mut controller = open_controller(&config, TerminalSink::new(std::io::stdout()), bell)?;
        let result = drive(&mut controller, &args, |_| {});
        controller.render_mut().finish();
        result
    }
}

/// Select, start and poll until the countdown has completed and the grace
/// delay has restored the display.
fn drive<R: RenderSink, N: Notifier>(
    controller: &mut SessionController<R, N>,
    args: &RunArgs,
    mut on_event: impl FnMut(&Event),
) -> Result<(), Box<dyn std::error::Error>> {
    let mut emit = |event: &Event| {
        debug!(kind = event.kind(), "engine event");
        on_event(event);
    };
    let selected = match (args.seconds, args.slot) {
        (Some(seconds), _) => controller.set_duration(seconds, false)?,
        (None, Some(slot)) => controller.select_custom_slot(slot)?,
        (None, None) => controller.engine().snapshot(),
    };
    emit(&selected);
    if let Some(started) = controller.start()? {
        emit(&started);
    }

    let interval = Duration::from_millis(controller.engine().tick_interval_ms());
    loop {
        for event in controller.poll() {
            let done = matches!(event, Event::TimerRestored { .. });
            emit(&event);
            if done {
                return Ok(());
            }
        }
        if controller.engine().is_settled() {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}
