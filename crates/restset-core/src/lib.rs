//! # restset Core Library
//!
//! This library provides the core logic for the restset rest timer: a
//! countdown between exercise sets that counts each set as it starts.
//! The CLI binary is a thin terminal layer over the same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `poll()` for progress updates
//! - **Session**: Set counter, settings and the "start counts a set" policy
//! - **Storage**: One versioned JSON record in a SQLite key-value table, and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionController`]: Mediates input, set counter, settings and engine
//! - [`PersistentStore`]: Settings and progress persistence
//! - [`AppConfig`]: Application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, TimerError, ValidationError};
pub use events::Event;
pub use session::{
    Highlight, Notifier, NotifyCue, RenderSink, SessionController, SessionProgress, Settings,
    SettingsForm,
};
pub use storage::{AppConfig, KeyValueStore, MemoryKv, PersistentStore, SqliteKv};
pub use timer::{Clock, ManualClock, SystemClock, TimerEngine, TimerState, TimerStatus};
