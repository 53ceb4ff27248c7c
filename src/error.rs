//! Error types used by the wpeg pipeline and task adapters.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — failures while loading/parsing the user configuration.
//! - [`TaskError`] — errors raised by individual task adapter invocations.
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself.
//!
//! Propagation policy:
//! - `ConfigError` and `RuntimeError::UnknownTask` are fatal at startup.
//! - A `TaskError` fails its own invocation; sibling invocations in a parallel
//!   stage still run to completion, and per-file transform errors inside an
//!   adapter are reported as `AdapterError` events instead of being raised.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving the user configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A user-specified config file exists but could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON.
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The config parsed, but its top level is neither an object nor an array
    /// of objects.
    #[error("config {path:?} must be an object or an array of objects")]
    Shape {
        /// Offending path.
        path: PathBuf,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::Shape { .. } => "config_shape",
        }
    }
}

/// Errors produced by a single task adapter invocation.
///
/// These are structural failures (a bad pattern, an unreachable destination,
/// a missing external tool). Per-file transform errors are routed through the
/// non-fatal adapter handler instead and never surface as `TaskError`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Filesystem operation failed.
    #[error("io error on {path:?}: {source}")]
    Io {
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A source glob pattern is malformed.
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying pattern error.
        source: glob::PatternError,
    },

    /// A remote fetch failed.
    #[error("remote fetch failed for {url}: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// Writing a zip archive failed.
    #[error("archive error for {archive:?}: {source}")]
    Archive {
        /// Destination archive path.
        archive: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },

    /// An external compiler/tool could not be spawned or exited non-zero.
    #[error("external tool `{program}` failed: {detail}")]
    Tool {
        /// Program name (e.g. `sass`, `esbuild`).
        program: String,
        /// Spawn error or captured stderr summary.
        detail: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Io { .. } => "task_io",
            TaskError::Pattern { .. } => "task_pattern",
            TaskError::Http { .. } => "task_http",
            TaskError::Archive { .. } => "task_archive",
            TaskError::Tool { .. } => "task_tool",
        }
    }
}

/// Errors produced by the orchestration runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A task id was requested that the registry does not contain.
    ///
    /// With the built-in registry this cannot happen (every [`TaskId`] is
    /// mapped); it guards registries assembled through the test constructor.
    ///
    /// [`TaskId`]: crate::tasks::TaskId
    #[error("unknown task: {name}")]
    UnknownTask {
        /// Requested task name.
        name: String,
    },

    /// A stage reported failure: one or more fan-out invocations failed.
    #[error("task `{task}` failed: {}", failures.join("; "))]
    TaskFailed {
        /// Task name.
        task: String,
        /// Failure messages, one per failed invocation.
        failures: Vec<String>,
    },

    /// The filesystem watcher could not be initialized.
    #[error("watch init failed: {0}")]
    WatchInit(#[from] notify::Error),

    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::UnknownTask { .. } => "runtime_unknown_task",
            RuntimeError::TaskFailed { .. } => "runtime_task_failed",
            RuntimeError::WatchInit(_) => "runtime_watch_init",
            RuntimeError::Config(e) => e.as_label(),
        }
    }
}
