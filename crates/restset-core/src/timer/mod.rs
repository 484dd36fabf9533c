mod clock;
mod engine;
mod schedule;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    TimerEngine, TimerObserver, TimerState, TimerStatus, DEFAULT_TICK_INTERVAL_MS,
    GRACE_DELAY_MS,
};
pub use schedule::{TaskHandle, TaskKind, TaskQueue};
