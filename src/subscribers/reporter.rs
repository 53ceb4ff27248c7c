//! # Timing reporter: live status lines for running tasks.
//!
//! [`TimingTable`] is the explicit state machine behind the reporter: one
//! open entry per task name, `start` force-closes a stale entry (an implicit
//! abort-and-restart, e.g. rapid watch re-triggers) and `end` yields the
//! elapsed time. [`TimingReporter`] consumes bus events and renders
//! `[HH:MM:SS] <label> ...` lines.
//!
//! ## Example output
//! ```text
//! [14:02:10] SCSS Compiler
//! [14:02:11] SCSS Compiler after 1.02 s
//! [14:02:11] Error: copy: dist/a.txt: permission denied
//! [14:02:30] Watch scss: "assets/scss/style.scss"
//! [14:02:31] Live reload
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use console::style;

use super::subscribe::Subscribe;
use crate::events::{Event, EventKind};
use crate::tasks::TaskId;

/// Outcome of [`TimingTable::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No prior open entry for this name.
    Fresh,
    /// A stale entry was open; it was closed first (elapsed returned).
    Restarted(Duration),
}

/// Per-task-name start timestamps.
///
/// At most one live entry per name: starting an already-open name is an
/// explicit Idle→Running→Idle transition, never an error.
#[derive(Debug, Default)]
pub struct TimingTable {
    entries: HashMap<String, Instant>,
}

impl TimingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an entry for `name`, force-closing a stale one if present.
    pub fn start(&mut self, name: &str) -> StartOutcome {
        let outcome = match self.entries.remove(name) {
            Some(stale) => StartOutcome::Restarted(stale.elapsed()),
            None => StartOutcome::Fresh,
        };
        self.entries.insert(name.to_string(), Instant::now());
        outcome
    }

    /// Closes the entry for `name`, returning its elapsed time.
    ///
    /// No-op (returns `None`) if no entry is open.
    pub fn end(&mut self, name: &str) -> Option<Duration> {
        self.entries.remove(name).map(|t| t.elapsed())
    }

    /// Returns `true` if an entry is open for `name`.
    pub fn is_running(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Formats a duration the way the status lines expect (`340 ms`, `1.24 s`).
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{} ms", d.as_millis())
    } else {
        format!("{:.2} s", d.as_secs_f64())
    }
}

/// Renders task lifecycle, adapter, watch and reload events as status lines.
pub struct TimingReporter {
    table: Mutex<TimingTable>,
}

impl TimingReporter {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(TimingTable::new()),
        }
    }

    /// Human label for an event's task/binding name.
    fn label(name: &str) -> &str {
        TaskId::from_name(name).map(TaskId::label).unwrap_or(name)
    }

    fn line(&self, text: impl std::fmt::Display) {
        let ts = chrono::Local::now().format("%H:%M:%S");
        println!("[{}] {}", style(ts).dim(), text);
    }

    fn on_starting(&self, name: &str) {
        let outcome = self
            .table
            .lock()
            .expect("timing table poisoned")
            .start(name);
        let label = Self::label(name);
        if let StartOutcome::Restarted(stale) = outcome {
            self.line(format!(
                "{} {}",
                style(label).blue(),
                style(format!("restarted (was open {})", format_duration(stale))).dim(),
            ));
        }
        self.line(style(label).blue().to_string());
    }

    fn on_finished(&self, name: &str, fallback: Option<Duration>) {
        let elapsed = self
            .table
            .lock()
            .expect("timing table poisoned")
            .end(name)
            .or(fallback);
        let label = Self::label(name);
        match elapsed {
            Some(d) => self.line(format!(
                "{} after {}",
                style(label).blue(),
                style(format_duration(d)).red(),
            )),
            None => self.line(style(label).blue().to_string()),
        }
    }

    fn on_failed(&self, name: &str, reason: Option<&str>) {
        self.table.lock().expect("timing table poisoned").end(name);
        self.line(format!(
            "{} {} failed: {}",
            style("Error:").cyan(),
            style(Self::label(name)).blue(),
            style(reason.unwrap_or("unknown")).red(),
        ));
    }
}

impl Default for TimingReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for TimingReporter {
    async fn on_event(&self, event: &Event) {
        let name = event.task.as_deref().unwrap_or("");
        match event.kind {
            EventKind::TaskStarting => self.on_starting(name),
            EventKind::TaskFinished => self.on_finished(name, event.elapsed),
            EventKind::TaskFailed => self.on_failed(name, event.reason.as_deref()),
            EventKind::AdapterError => {
                let prefix = match &event.target {
                    Some(t) => format!("{name} [{t}]"),
                    None => name.to_string(),
                };
                self.line(format!(
                    "{} {}: {}",
                    style("Error:").cyan(),
                    style(prefix).blue(),
                    style(event.reason.as_deref().unwrap_or("unknown")).red(),
                ));
            }
            EventKind::WatchTriggered => {
                self.line(format!(
                    "{} {}: {}",
                    style("Watch").magenta(),
                    style(name).blue(),
                    style(event.reason.as_deref().unwrap_or("?")).dim(),
                ));
            }
            EventKind::ReloadArmed => {
                self.line(style("Live reload armed").magenta().to_string());
            }
            EventKind::ReloadBroadcast => {
                self.line(style("Live reload").magenta().to_string());
            }
        }
    }

    fn name(&self) -> &'static str {
        "TimingReporter"
    }
}
