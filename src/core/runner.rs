//! # Run one task across all eligible targets (fan-out engine).
//!
//! [`Runner::run_task`] is the single entry point the pipeline composer and
//! watch bindings use to execute a task:
//!
//! 1. filter targets by the adapter's `is_allowed` predicate;
//! 2. empty set → succeed immediately as a no-op (absent configuration is
//!    "feature disabled", not an error) — no events are emitted;
//! 3. publish `TaskStarting`;
//! 4. fan out per the task's declared [`Fanout`]:
//!    - **Parallel**: all invocations dispatched concurrently and awaited
//!      together; one failure never interrupts running siblings, but the
//!      stage reports failure;
//!    - **Sequential**: strictly one at a time; the first failure aborts the
//!      not-yet-started rest;
//! 5. publish `TaskFinished` (with elapsed wall-clock time) or `TaskFailed`.
//!
//! Partial completion is never surfaced as success: the stage result is
//! decided only after every dispatched invocation has finished.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::config::Target;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{Fanout, Registry, TaskId};

/// Executes tasks from a [`Registry`] with per-task fan-out discipline.
///
/// Owns nothing global: registry and bus are injected at construction, so
/// multiple runners can coexist (tests run several side by side).
pub struct Runner {
    registry: Arc<Registry>,
    bus: Bus,
}

impl Runner {
    pub fn new(registry: Arc<Registry>, bus: Bus) -> Self {
        Self { registry, bus }
    }

    /// Borrow of the event bus (for composing components around the runner).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs `id` once per eligible target.
    pub async fn run_task(
        &self,
        id: TaskId,
        targets: &[Target],
        is_dev: bool,
    ) -> Result<(), RuntimeError> {
        let task = self.registry.get(id)?;

        let eligible: Vec<&Target> = targets
            .iter()
            .filter(|t| task.is_allowed(t, is_dev))
            .collect();
        if eligible.is_empty() {
            return Ok(());
        }

        self.bus
            .publish(Event::now(EventKind::TaskStarting).with_task(id.name()));
        let started = Instant::now();

        let mut failures: Vec<String> = Vec::new();
        match task.fanout() {
            Fanout::Parallel => {
                let results = join_all(eligible.iter().map(|t| task.run(t, is_dev))).await;
                for (target, result) in eligible.iter().zip(results) {
                    if let Err(e) = result {
                        failures.push(format!("[{}] {e}", target.label()));
                    }
                }
            }
            Fanout::Sequential => {
                for target in &eligible {
                    if let Err(e) = task.run(target, is_dev).await {
                        failures.push(format!("[{}] {e}", target.label()));
                        break;
                    }
                }
            }
        }

        if failures.is_empty() {
            self.bus.publish(
                Event::now(EventKind::TaskFinished)
                    .with_task(id.name())
                    .with_elapsed(started.elapsed()),
            );
            Ok(())
        } else {
            self.bus.publish(
                Event::now(EventKind::TaskFailed)
                    .with_task(id.name())
                    .with_reason(failures.join("; ")),
            );
            Err(RuntimeError::TaskFailed {
                task: id.name().to_string(),
                failures,
            })
        }
    }
}
