//! Shared plumbing for task adapters: glob expansion, destination mapping,
//! freshness checks, external tool invocation and the uniform non-fatal
//! error handler.
//!
//! Destination mapping preserves the path relative to the glob base (the
//! pattern prefix before the first meta character), so `src/**/*.txt`
//! matched against `src/a/b.txt` lands at `<dist>/a/b.txt`.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use tokio::process::Command;

use super::TaskId;
use crate::config::Target;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};

/// Expands glob patterns into matching file paths (files only, deduplicated,
/// order of patterns preserved).
pub fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>, TaskError> {
    expand(patterns, true)
}

/// Expands glob patterns into matching paths, including directories.
pub fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>, TaskError> {
    expand(patterns, false)
}

fn expand(patterns: &[String], files_only: bool) -> Result<Vec<PathBuf>, TaskError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|source| TaskError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in matches.flatten() {
            if files_only && !entry.is_file() {
                continue;
            }
            if seen.insert(entry.clone()) {
                out.push(entry);
            }
        }
    }
    Ok(out)
}

/// Returns the literal prefix of a glob pattern (components before the first
/// one containing a meta character).
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        match component {
            Component::Normal(part) => {
                let part_str = part.to_string_lossy();
                if part_str.contains(['*', '?', '[', '{']) {
                    break;
                }
                base.push(part);
            }
            other => base.push(other.as_os_str()),
        }
    }
    base
}

/// Maps a matched source file to its destination-relative path.
///
/// Uses the base of the first pattern that matches the file; falls back to
/// the bare file name when no pattern base applies.
pub fn relative_dest(file: &Path, patterns: &[String]) -> PathBuf {
    for pattern in patterns {
        let matches = Pattern::new(pattern)
            .map(|p| p.matches_path(file))
            .unwrap_or(false);
        if matches {
            if let Ok(rel) = file.strip_prefix(glob_base(pattern)) {
                return rel.to_path_buf();
            }
        }
    }
    file.file_name().map(PathBuf::from).unwrap_or_default()
}

/// Returns `true` when `dest` exists and is at least as new as `src`.
///
/// Used in dev/watch mode to skip unchanged files on rebuild.
pub fn is_up_to_date(src: &Path, dest: &Path) -> bool {
    let (Ok(src_meta), Ok(dest_meta)) = (src.metadata(), dest.metadata()) else {
        return false;
    };
    match (src_meta.modified(), dest_meta.modified()) {
        (Ok(s), Ok(d)) => d >= s,
        _ => false,
    }
}

/// Creates the parent directory of `path` if needed.
pub async fn ensure_parent(path: &Path) -> Result<(), TaskError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| TaskError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}

/// Uniform non-fatal adapter error handler.
///
/// Publishes an [`EventKind::AdapterError`] so the failure is visible, and
/// lets the caller continue past the file instead of aborting the task.
pub fn report_adapter_error(bus: &Bus, id: TaskId, target: &Target, detail: impl std::fmt::Display) {
    let mut ev = Event::now(EventKind::AdapterError)
        .with_task(id.name())
        .with_reason(detail.to_string());
    if let Some(name) = &target.name {
        ev = ev.with_target(name.as_str());
    }
    bus.publish(ev);
}

/// Runs an external tool to completion.
///
/// Fails with [`TaskError::Tool`] when the program cannot be spawned or exits
/// non-zero; the tail of stderr is included in the error detail.
pub async fn run_tool(program: &str, args: &[String]) -> Result<(), TaskError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| TaskError::Tool {
            program: program.to_string(),
            detail: e.to_string(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: String = stderr
        .lines()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n");
    Err(TaskError::Tool {
        program: program.to_string(),
        detail: format!("exit {}: {tail}", output.status),
    })
}
