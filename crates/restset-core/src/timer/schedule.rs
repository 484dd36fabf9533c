//! Cancellable deferred tasks owned by the timer engine.
//!
//! The queue never runs anything by itself. The host polls the engine, and
//! the engine pops whatever is due and dispatches it. Handles are never
//! reused, so cancelling an already-fired or already-cancelled handle is a
//! harmless no-op.

use std::collections::BTreeMap;

/// What a deferred task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Recompute the countdown from the deadline.
    Tick,
    /// Restore the full duration after completion, if `generation` is still current.
    Restore { generation: u64 },
}

/// Cancellation handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    due_ms: u64,
    kind: TaskKind,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    next_id: u64,
    pending: BTreeMap<TaskHandle, Pending>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, kind: TaskKind) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert(handle, Pending { due_ms, kind });
        handle
    }

    /// Returns true if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    /// Remove and return the earliest task due at or before `now_ms`.
    /// Ties go to the task scheduled first.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskHandle, TaskKind)> {
        let handle = self
            .pending
            .iter()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by_key(|(h, p)| (p.due_ms, **h))
            .map(|(h, _)| *h)?;
        let pending = self.pending.remove(&handle)?;
        Some((handle, pending.kind))
    }

    /// Earliest due time among pending tasks.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.values().map(|p| p.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn count_matching(&self, pred: impl Fn(&TaskKind) -> bool) -> usize {
        self.pending.values().filter(|p| pred(&p.kind)).count()
    }
}
