//! The persisted settings + progress record.
//!
//! One JSON document under a versioned key. Loading never fails: anything
//! missing, mistyped or out of range falls back to its default, field by
//! field, so records written by older versions still load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{KeyValueStore, MemoryKv, SqliteKv};
use crate::error::StorageError;
use crate::session::{SessionProgress, Settings};

/// Key of the current record schema.
pub const STORE_KEY: &str = "rest-set-timer-data-v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub sets: SessionProgress,
    pub settings: Settings,
}

/// Reads and writes the record. Falls back to in-memory operation for the
/// rest of the session once the backing surface fails.
pub struct PersistentStore {
    backend: Option<Box<dyn KeyValueStore>>,
    /// Mirror of every write, served once the backend is gone.
    memory: MemoryKv,
}

impl PersistentStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Some(Box::new(backend)),
            memory: MemoryKv::new(),
        }
    }

    /// No durable storage at all.
    pub fn in_memory() -> Self {
        Self {
            backend: None,
            memory: MemoryKv::new(),
        }
    }

    /// Open the default SQLite store, or degrade to memory if that fails.
    pub fn open_default() -> Self {
        match SqliteKv::open() {
            Ok(db) => Self::new(db),
            Err(e) => {
                warn!(error = %e, "persistence unavailable, keeping state in memory");
                Self::in_memory()
            }
        }
    }

    /// True once writes and reads only reach the in-memory mirror.
    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    /// Write the record. Never fails; a storage failure is logged and the
    /// store degrades to memory.
    pub fn save(&mut self, progress: &SessionProgress, settings: &Settings) {
        let record = PersistedRecord {
            sets: *progress,
            settings: *settings,
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize record");
                return;
            }
        };
        let _ = self.memory.set(STORE_KEY, &json);
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.set(STORE_KEY, &json) {
                self.degrade(e);
            }
        }
        debug!(current = progress.current, target = progress.target, "record saved");
    }

    /// Read the record, merged onto defaults.
    pub fn load(&mut self) -> (SessionProgress, Settings) {
        let raw = match self.backend.as_ref().map(|b| b.get(STORE_KEY)) {
            Some(Ok(raw)) => raw,
            Some(Err(e)) => {
                self.degrade(e);
                self.memory.get(STORE_KEY).unwrap_or_default()
            }
            None => self.memory.get(STORE_KEY).unwrap_or_default(),
        };
        match raw {
            Some(raw) => merge_record(&raw),
            None => (SessionProgress::default(), Settings::default()),
        }
    }

    fn degrade(&mut self, error: StorageError) {
        warn!(error = %error, "persistence unavailable, continuing in memory");
        self.backend = None;
    }
}

/// Merge a stored record onto defaults, field by field.
pub fn merge_record(raw: &str) -> (SessionProgress, Settings) {
    let mut progress = SessionProgress::default();
    let mut settings = Settings::default();

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "stored record is not valid JSON, using defaults");
            return (progress, settings);
        }
    };

    if let Some(sets) = value.get("sets").and_then(Value::as_object) {
        merge_field(sets, &["current"], &mut progress.current, |_| true);
        merge_field(sets, &["target"], &mut progress.target, |t| *t >= 1);
    }

    if let Some(stored) = value.get("settings").and_then(Value::as_object) {
        merge_field(stored, &["soundEnabled"], &mut settings.sound_enabled, |_| true);
        merge_field(stored, &["vibrationEnabled"], &mut settings.vibration_enabled, |_| true);
        merge_field(
            stored,
            &["startOnSelect", "startOnPreset"],
            &mut settings.start_on_select,
            |_| true,
        );
        let has_target =
            merge_field(stored, &["targetSets"], &mut settings.target_sets, |t| *t >= 1);
        merge_field(
            stored,
            &["customDuration1", "custom1"],
            &mut settings.custom_duration_1,
            |_| true,
        );
        merge_field(
            stored,
            &["customDuration2", "custom2"],
            &mut settings.custom_duration_2,
            |_| true,
        );
        // Settings are canonical for the target when they carry a valid one.
        if has_target {
            progress.target = settings.target_sets;
        } else {
            settings.target_sets = progress.target;
        }
    }

    (progress, settings)
}

/// Overwrite `slot` with the first key that parses and passes `accept`.
fn merge_field<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    keys: &[&str],
    slot: &mut T,
    accept: impl Fn(&T) -> bool,
) -> bool {
    for key in keys {
        let Some(raw) = obj.get(*key) else {
            continue;
        };
        match T::deserialize(raw) {
            Ok(parsed) if accept(&parsed) => {
                *slot = parsed;
                return true;
            }
            _ => debug!(key, "ignoring stored field"),
        }
    }
    false
}
