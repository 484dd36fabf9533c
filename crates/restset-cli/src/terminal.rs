//! Terminal render and notify sinks for the foreground countdown.

use std::io::Write;

use restset_core::session::{
    format_clock, format_sets, Notifier, NotifyCue, NotifyError, RenderSink,
};
use tracing::debug;

const BAR_WIDTH: usize = 20;

/// Redraws a single status line: clock, progress bar and set counter.
pub struct TerminalSink<W: Write> {
    out: W,
    sets: (u32, u32),
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, sets: (0, 0) }
    }

    /// Move past the status line so later output starts on a fresh line.
    pub fn finish(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `[#####...............]` for `progress` in `0.0..=1.0`.
pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn on_tick(&mut self, remaining_ms: u64, progress: f64) {
        let (current, target) = self.sets;
        let _ = write!(
            self.out,
            "\r  {}  {}  sets {}",
            format_clock(remaining_ms),
            progress_bar(progress),
            format_sets(current, target)
        );
        let _ = self.out.flush();
    }

    fn on_sets_changed(&mut self, current: u32, target: u32) {
        self.sets = (current, target);
    }
}

/// Rings the terminal bell on completion.
pub struct BellNotifier<W: Write> {
    out: W,
    enabled: bool,
}

impl<W: Write> BellNotifier<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self { out, enabled }
    }
}

impl<W: Write> Notifier for BellNotifier<W> {
    fn notify(&mut self, cue: NotifyCue) -> Result<(), NotifyError> {
        if cue.vibration {
            debug!("vibration requested, terminal has no haptics");
        }
        if !(self.enabled && cue.sound) {
            return Ok(());
        }
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}
