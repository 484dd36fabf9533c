use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerStatus;

/// Every state change in the engine produces an Event.
/// Hosts print or forward them; the render sink sees the same changes as callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DurationSelected {
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        /// True when the engine was Idle before the start (a set was counted).
        fresh: bool,
        remaining_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        total_ms: u64,
        at: DateTime<Utc>,
    },
    /// The grace delay after completion elapsed and the full duration is shown again.
    TimerRestored {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        remaining_ms: u64,
        total_ms: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::DurationSelected { .. } => "DurationSelected",
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerReset { .. } => "TimerReset",
            Event::TimerCompleted { .. } => "TimerCompleted",
            Event::TimerRestored { .. } => "TimerRestored",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}
