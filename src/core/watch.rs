//! # Watch mode: filesystem bindings driving incremental sub-pipelines.
//!
//! Each [`WatchBinding`] couples one glob category from the configuration
//! (`watch_files`, `watch_js_files`, `watch_jsx_files`, `watch_scss_files`)
//! to the ordered task list that reacts to it. Bindings run as independent
//! tokio tasks: a slow SCSS rebuild never delays a JS rebuild.
//!
//! Per binding, the loop is:
//!
//! 1. wait for a filesystem event under the binding's glob base directories;
//! 2. debounce briefly and drain the queue (editors fire bursts);
//! 3. keep only paths matching the binding's globs;
//! 4. publish `WatchTriggered`, run the sub-pipeline sequentially;
//! 5. broadcast a live-reload signal (dropped when reload never armed).
//!
//! ## Rules
//! - A failing sub-pipeline run is reported and the binding keeps watching;
//!   watch mode only ends on cancellation.
//! - Triggers arriving while a run is in flight are picked up by the next
//!   drain, not dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::pipeline::Pipeline;
use crate::config::Target;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{glob_base, TaskId};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// One watch category: globs plus the tasks that react to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    /// Binding name used in `WatchTriggered` events (`files`, `js`, ...).
    pub name: &'static str,
    /// Union of the category's globs across all targets.
    pub globs: Vec<String>,
    /// Tasks run sequentially on each trigger.
    pub pipeline: Vec<TaskId>,
}

/// Builds the bindings for the resolved targets.
///
/// Categories with no globs in any target produce no binding.
pub fn bindings(targets: &[Target]) -> Vec<WatchBinding> {
    let union = |pick: fn(&Target) -> &Vec<String>| -> Vec<String> {
        let mut globs: Vec<String> = Vec::new();
        for target in targets {
            for g in pick(target) {
                if !globs.contains(g) {
                    globs.push(g.clone());
                }
            }
        }
        globs
    };

    let specs: [(&'static str, Vec<String>, Vec<TaskId>); 4] = [
        (
            "files",
            union(|t| &t.watch_files),
            vec![
                TaskId::Copy,
                TaskId::TemplateFiles,
                TaskId::CorrectLineEndings,
                TaskId::PrefixScss,
            ],
        ),
        ("js", union(|t| &t.watch_js_files), vec![TaskId::CompileJs]),
        (
            "jsx",
            union(|t| &t.watch_jsx_files),
            vec![TaskId::CompileJsx],
        ),
        (
            "scss",
            union(|t| &t.watch_scss_files),
            vec![TaskId::CompileScss, TaskId::CompileScssRtl],
        ),
    ];

    specs
        .into_iter()
        .filter(|(_, globs, _)| !globs.is_empty())
        .map(|(name, globs, pipeline)| WatchBinding {
            name,
            globs,
            pipeline,
        })
        .collect()
}

/// Returns `true` when `path` matches any of the binding's globs.
///
/// Tries the path as-is and relative to the current directory, since notify
/// reports absolute paths while configurations use relative globs.
fn matches_any(path: &Path, globs: &[String]) -> bool {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    globs.iter().any(|g| {
        glob::Pattern::new(g)
            .map(|p| {
                p.matches_path(path)
                    || relative.as_deref().is_some_and(|r| p.matches_path(r))
            })
            .unwrap_or(false)
    })
}

/// Drops repeated paths from a drained burst, keeping first-seen order.
///
/// Editors report the same file several times per save; the trigger reason
/// should list it once.
fn dedupe_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = std::collections::HashSet::new();
    paths.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

/// Deduplicated literal base directories for a set of globs.
fn watch_roots(globs: &[String]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for glob in globs {
        let mut base = glob_base(glob);
        if base.as_os_str().is_empty() {
            base = PathBuf::from(".");
        }
        if !roots.contains(&base) {
            roots.push(base);
        }
    }
    roots
}

/// Runs watch mode until `cancel` fires.
///
/// Arms live reload first, then spawns one binding loop per category. With
/// no bindings configured this waits for cancellation and returns.
pub async fn run(pipeline: Arc<Pipeline>, cancel: CancellationToken) -> Result<(), RuntimeError> {
    pipeline.reload().arm_from(pipeline.targets()).await;

    let mut set = JoinSet::new();
    for binding in bindings(pipeline.targets()) {
        set.spawn(binding_loop(
            binding,
            pipeline.clone(),
            cancel.child_token(),
        ));
    }

    if set.is_empty() {
        cancel.cancelled().await;
        return Ok(());
    }

    // Bindings only end on cancellation; a setup failure in any of them
    // takes watch mode down.
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => result?,
            Err(_) => continue,
        }
    }
    Ok(())
}

async fn binding_loop(
    binding: WatchBinding,
    pipeline: Arc<Pipeline>,
    cancel: CancellationToken,
) -> Result<(), RuntimeError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();

    // notify runs its own threads; forward raw paths into the async loop.
    let mut watcher =
        notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        })?;
    for root in watch_roots(&binding.globs) {
        watcher.watch(&root, RecursiveMode::Recursive)?;
    }

    let bus: Bus = pipeline.bus().clone();
    loop {
        let first = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            path = rx.recv() => match path {
                Some(p) => p,
                None => return Ok(()),
            },
        };

        // Editors save in bursts; collect everything from the burst.
        tokio::time::sleep(DEBOUNCE).await;
        let mut changed = vec![first];
        while let Ok(path) = rx.try_recv() {
            changed.push(path);
        }
        changed.retain(|p| matches_any(p, &binding.globs));
        let changed = dedupe_paths(changed);
        if changed.is_empty() {
            continue;
        }

        let shown = changed
            .iter()
            .take(3)
            .map(|p| format!("{:?}", p.display()))
            .collect::<Vec<_>>()
            .join(", ");
        bus.publish(
            Event::now(EventKind::WatchTriggered)
                .with_task(binding.name)
                .with_reason(shown),
        );

        // Failures are already reported through task events; keep watching.
        let _ = pipeline.run_sequence(&binding.pipeline).await;
        pipeline.reload().broadcast().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_with(scss: &[&str], js: &[&str]) -> Target {
        Target {
            watch_scss_files: scss.iter().map(|s| s.to_string()).collect(),
            watch_js_files: js.iter().map(|s| s.to_string()).collect(),
            ..Target::default()
        }
    }

    #[test]
    fn test_bindings_skip_empty_categories() {
        let targets = vec![target_with(&["assets/scss/**/*.scss"], &[])];
        let bindings = bindings(&targets);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, "scss");
        assert_eq!(
            bindings[0].pipeline,
            vec![TaskId::CompileScss, TaskId::CompileScssRtl]
        );
    }

    #[test]
    fn test_bindings_union_globs_across_targets() {
        let targets = vec![
            target_with(&["a/**/*.scss"], &["a/**/*.js"]),
            target_with(&["b/**/*.scss", "a/**/*.scss"], &[]),
        ];
        let bindings = bindings(&targets);
        let scss = bindings.iter().find(|b| b.name == "scss").unwrap();
        assert_eq!(scss.globs, vec!["a/**/*.scss", "b/**/*.scss"]);
        let js = bindings.iter().find(|b| b.name == "js").unwrap();
        assert_eq!(js.pipeline, vec![TaskId::CompileJs]);
    }

    #[test]
    fn test_matches_any_against_globs() {
        let globs = vec!["assets/scss/**/*.scss".to_string()];
        assert!(matches_any(Path::new("assets/scss/base/_reset.scss"), &globs));
        assert!(!matches_any(Path::new("assets/js/app.js"), &globs));
    }

    #[test]
    fn test_burst_paths_dedupe_non_adjacent_repeats() {
        let paths = vec![
            PathBuf::from("a/style.scss"),
            PathBuf::from("a/other.scss"),
            PathBuf::from("a/style.scss"),
            PathBuf::from("a/style.scss"),
        ];
        assert_eq!(
            dedupe_paths(paths),
            vec![PathBuf::from("a/style.scss"), PathBuf::from("a/other.scss")]
        );
    }

    #[test]
    fn test_watch_roots_dedupe_and_default() {
        let globs = vec![
            "assets/scss/**/*.scss".to_string(),
            "assets/scss/*.scss".to_string(),
            "*.php".to_string(),
        ];
        assert_eq!(
            watch_roots(&globs),
            vec![PathBuf::from("assets/scss"), PathBuf::from(".")]
        );
    }
}
