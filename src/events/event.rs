//! # Lifecycle events emitted by the runner, pipeline, watcher and adapters.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task lifecycle**: a named task (or pipeline) starting, finishing, failing
//! - **Adapter events**: non-fatal per-file transform errors
//! - **Watch/reload events**: watch triggers and live-reload coordination
//!
//! The [`Event`] struct carries metadata such as a wall-clock timestamp, the
//! task name, the target label, a reason string and an elapsed duration.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order when events are buffered.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of pipeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// A task (or a top-level pipeline) started.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskStarting,

    /// A task finished successfully.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `elapsed`: wall-clock time since the paired start
    /// - `at`, `seq`
    TaskFinished,

    /// A task failed (at least one fan-out invocation reported an error).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: aggregated failure message
    /// - `at`, `seq`
    TaskFailed,

    // === Adapter events ===
    /// A single file transform inside an adapter failed.
    ///
    /// Non-fatal: the adapter skips the file and continues. Sets:
    /// - `task`: task name
    /// - `target`: target label, if the target is named
    /// - `reason`: error message
    /// - `at`, `seq`
    AdapterError,

    // === Watch / reload events ===
    /// A watch binding observed a matching filesystem change.
    ///
    /// Sets:
    /// - `task`: binding name (`files`, `js`, `jsx`, `scss`)
    /// - `reason`: the changed path
    /// - `at`, `seq`
    WatchTriggered,

    /// The live-reload coordinator armed itself (first eligible target).
    ///
    /// Sets:
    /// - `target`: target label, if named
    /// - `at`, `seq`
    ReloadArmed,

    /// A reload signal was broadcast to connected clients.
    ///
    /// Sets: `at`, `seq`
    ReloadBroadcast,
}

/// Pipeline event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task or watch binding, if applicable.
    pub task: Option<Arc<str>>,
    /// Label of the config target, if the target is named.
    pub target: Option<Arc<str>>,
    /// Human-readable reason (errors, changed paths, etc.).
    pub reason: Option<Arc<str>>,
    /// Elapsed duration (set on `TaskFinished`).
    pub elapsed: Option<Duration>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            target: None,
            reason: None,
            elapsed: None,
        }
    }

    /// Attaches a task (or binding) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a target label.
    #[inline]
    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an elapsed duration.
    #[inline]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::TaskStarting);
        let b = Event::now(EventKind::TaskFinished);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_sets_fields() {
        let ev = Event::now(EventKind::AdapterError)
            .with_task("copy")
            .with_target("theme")
            .with_reason("permission denied");
        assert_eq!(ev.task.as_deref(), Some("copy"));
        assert_eq!(ev.target.as_deref(), Some("theme"));
        assert_eq!(ev.reason.as_deref(), Some("permission denied"));
        assert!(ev.elapsed.is_none());
    }
}
