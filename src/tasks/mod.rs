//! # Tasks: identities, the adapter trait and the registry.
//!
//! ## Contents
//! - [`TaskId`] — exhaustive enum of the pipeline's task names
//! - [`Task`], [`TaskRef`], [`Fanout`] — the adapter contract
//! - [`Registry`] — id → adapter mapping, built once at startup
//!
//! The twelve adapter modules are thin transforms around external
//! capabilities (glob + fs, external compilers, http, zip); the orchestration
//! engine in [`core`](crate::core) never knows what a task does, only whether
//! it applies and whether it succeeded.

use std::collections::HashMap;

use crate::error::RuntimeError;
use crate::events::Bus;

mod fsops;
mod task;

mod clean;
mod compile_js;
mod compile_jsx;
mod compile_scss;
mod compile_scss_rtl;
mod copy;
mod correct_line_endings;
mod prefix_scss;
mod remote_copy;
mod template_files;
mod translate_php;
mod zip;

pub use task::{Fanout, Task, TaskRef};

pub(crate) use fsops::glob_base;

/// Identity of a pipeline task.
///
/// The set is closed: every variant is mapped to an adapter by
/// [`Registry::builtin`], so a task name can never dangle at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    Clean,
    Copy,
    RemoteCopy,
    CompileScss,
    CompileScssRtl,
    CompileJs,
    CompileJsx,
    PrefixScss,
    TemplateFiles,
    CorrectLineEndings,
    TranslatePhp,
    Zip,
}

impl TaskId {
    /// All task identities, in no particular order.
    pub const ALL: [TaskId; 12] = [
        TaskId::Clean,
        TaskId::Copy,
        TaskId::RemoteCopy,
        TaskId::CompileScss,
        TaskId::CompileScssRtl,
        TaskId::CompileJs,
        TaskId::CompileJsx,
        TaskId::PrefixScss,
        TaskId::TemplateFiles,
        TaskId::CorrectLineEndings,
        TaskId::TranslatePhp,
        TaskId::Zip,
    ];

    /// Stable snake_case name, used as the event/timing key.
    pub fn name(self) -> &'static str {
        match self {
            TaskId::Clean => "clean",
            TaskId::Copy => "copy",
            TaskId::RemoteCopy => "remote_copy",
            TaskId::CompileScss => "compile_scss",
            TaskId::CompileScssRtl => "compile_scss_rtl",
            TaskId::CompileJs => "compile_js",
            TaskId::CompileJsx => "compile_jsx",
            TaskId::PrefixScss => "prefix_scss",
            TaskId::TemplateFiles => "template_files",
            TaskId::CorrectLineEndings => "correct_line_endings",
            TaskId::TranslatePhp => "translate_php",
            TaskId::Zip => "zip",
        }
    }

    /// Human-readable label used in status lines.
    pub fn label(self) -> &'static str {
        match self {
            TaskId::Clean => "Clean Dist",
            TaskId::Copy => "Copy Files",
            TaskId::RemoteCopy => "Copy Remote Files",
            TaskId::CompileScss => "SCSS Compiler",
            TaskId::CompileScssRtl => "SCSS RTL Compiler",
            TaskId::CompileJs => "JS Compiler",
            TaskId::CompileJsx => "JSX Compiler",
            TaskId::PrefixScss => "Prefix SCSS",
            TaskId::TemplateFiles => "Template Files",
            TaskId::CorrectLineEndings => "Correct line endings for non UNIX systems",
            TaskId::TranslatePhp => "Translate PHP Files",
            TaskId::Zip => "ZIP Files",
        }
    }

    /// Parses a snake_case task name.
    pub fn from_name(name: &str) -> Result<Self, RuntimeError> {
        TaskId::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| RuntimeError::UnknownTask {
                name: name.to_string(),
            })
    }
}

/// Mapping from [`TaskId`] to its adapter.
///
/// Built once at startup and never mutated afterwards. The built-in
/// constructor maps every id; [`Registry::with_tasks`] exists so tests can
/// run the engine against stub tasks.
pub struct Registry {
    tasks: HashMap<TaskId, TaskRef>,
}

impl Registry {
    /// Builds the full built-in registry.
    ///
    /// Adapters publish their non-fatal per-file errors to `bus`.
    pub fn builtin(bus: Bus) -> Self {
        let tasks: Vec<TaskRef> = vec![
            std::sync::Arc::new(clean::Clean::new(bus.clone())),
            std::sync::Arc::new(copy::Copy::new(bus.clone())),
            std::sync::Arc::new(remote_copy::RemoteCopy::new(bus.clone())),
            std::sync::Arc::new(compile_scss::CompileScss::new(bus.clone())),
            std::sync::Arc::new(compile_scss_rtl::CompileScssRtl::new(bus.clone())),
            std::sync::Arc::new(compile_js::CompileJs::new(bus.clone())),
            std::sync::Arc::new(compile_jsx::CompileJsx::new(bus.clone())),
            std::sync::Arc::new(prefix_scss::PrefixScss::new(bus.clone())),
            std::sync::Arc::new(template_files::TemplateFiles::new(bus.clone())),
            std::sync::Arc::new(correct_line_endings::CorrectLineEndings::new(bus.clone())),
            std::sync::Arc::new(translate_php::TranslatePhp::new(bus.clone())),
            std::sync::Arc::new(zip::Zip::new(bus)),
        ];
        debug_assert_eq!(tasks.len(), TaskId::ALL.len());
        Self::with_tasks(tasks)
    }

    /// Builds a registry from an arbitrary task set (tests, embedding).
    pub fn with_tasks(tasks: Vec<TaskRef>) -> Self {
        let tasks = tasks.into_iter().map(|t| (t.id(), t)).collect();
        Self { tasks }
    }

    /// Looks up the adapter for `id`.
    pub fn get(&self, id: TaskId) -> Result<&TaskRef, RuntimeError> {
        self.tasks.get(&id).ok_or_else(|| RuntimeError::UnknownTask {
            name: id.name().to_string(),
        })
    }
}
