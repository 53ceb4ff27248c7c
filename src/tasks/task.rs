//! # Task abstraction for pipeline adapters.
//!
//! This module defines the [`Task`] trait implemented by every adapter: a
//! stable identity, a pure applicability predicate and an async execution
//! method. The common handle type is [`TaskRef`], an `Arc<dyn Task>` suitable
//! for sharing across the runtime.
//!
//! Fan-out discipline is an explicit, declared property of each task
//! ([`Task::fanout`]), not a hidden runner default: tasks whose per-target
//! side effects are not provably independent stay [`Fanout::Sequential`].

use std::sync::Arc;

use async_trait::async_trait;

use super::TaskId;
use crate::config::Target;
use crate::error::TaskError;

/// Fan-out discipline for running one task across multiple targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fanout {
    /// One invocation at a time; the first failure aborts the rest.
    #[default]
    Sequential,
    /// All invocations dispatched concurrently and awaited together; a
    /// failure never interrupts already-running siblings.
    Parallel,
}

/// # One pipeline task (adapter).
///
/// A `Task` is invoked once per eligible [`Target`] by the runner. The
/// [`is_allowed`](Task::is_allowed) predicate must be pure (no I/O) over the
/// config fields it cares about; all side effects live in
/// [`run`](Task::run).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use wpeg::{Fanout, Target, Task, TaskError, TaskId};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn id(&self) -> TaskId { TaskId::Copy }
///
///     fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
///         !target.copy_files_src.is_empty() && !target.copy_files_dist.is_empty()
///     }
///
///     async fn run(&self, _target: &Target, _is_dev: bool) -> Result<(), TaskError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns the stable task identity.
    fn id(&self) -> TaskId;

    /// Returns the human-readable label used in status lines.
    fn label(&self) -> &'static str {
        self.id().label()
    }

    /// Declares how invocations across targets are dispatched.
    fn fanout(&self) -> Fanout {
        Fanout::default()
    }

    /// Returns `true` if this task applies to `target`.
    ///
    /// Must be a pure predicate: absent/empty source or destination fields
    /// mean "feature disabled" and the runner skips the invocation entirely.
    fn is_allowed(&self, target: &Target, is_dev: bool) -> bool;

    /// Executes the task for one target.
    ///
    /// Structural failures return `Err`; per-file transform errors are
    /// reported through the adapter error handler and the run continues.
    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError>;
}

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;
