//! # Pipeline composer: the stage graph and the top-level entry points.
//!
//! A [`Stage`] is a task, a sequential list of stages, or a parallel set of
//! stages. The `build` pipeline is the fixed graph
//!
//! ```text
//! clean
//!   → { copy ∥ remote_copy }
//!   → { compile_scss ∥ compile_scss_rtl }
//!   → { compile_js ∥ compile_jsx }
//!   → prefix_scss
//!   → template_files
//!   → correct_line_endings
//!   → translate_php
//! ```
//!
//! Stages with no destination-path overlap run in parallel; stages with a
//! destination dependency (clean before any writes, prefixing after
//! compilation) run sequentially. `zip` is not part of `build`: it reads
//! from dist after any build has completed and is invoked as its own CLI
//! task.
//!
//! ## Rules
//! - A parallel set's members must have no ordering dependency on each
//!   other's side effects (they share only the append-only event bus).
//! - Stage exit never happens before the slowest member finished; a member
//!   failure fails the whole stage, after every member completed.
//! - In a series, the first failing stage aborts the not-yet-started rest.

use std::sync::Arc;
use std::time::Instant;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use super::reload::ReloadCoordinator;
use super::runner::Runner;
use crate::config::Target;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskId;

/// One unit of the pipeline graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A single task, fanned out over all eligible targets.
    Task(TaskId),
    /// Stages executed strictly in order; first failure aborts the rest.
    Series(Vec<Stage>),
    /// Stages dispatched concurrently and awaited together.
    Parallel(Vec<Stage>),
}

/// The fixed `build` stage graph.
pub fn build_graph() -> Stage {
    Stage::Series(vec![
        Stage::Task(TaskId::Clean),
        Stage::Parallel(vec![
            Stage::Task(TaskId::Copy),
            Stage::Task(TaskId::RemoteCopy),
        ]),
        Stage::Parallel(vec![
            Stage::Task(TaskId::CompileScss),
            Stage::Task(TaskId::CompileScssRtl),
        ]),
        Stage::Parallel(vec![
            Stage::Task(TaskId::CompileJs),
            Stage::Task(TaskId::CompileJsx),
        ]),
        Stage::Task(TaskId::PrefixScss),
        Stage::Task(TaskId::TemplateFiles),
        Stage::Task(TaskId::CorrectLineEndings),
        Stage::Task(TaskId::TranslatePhp),
    ])
}

/// Owns the wired-together engine: runner, resolved targets, reload
/// coordinator and the bus.
///
/// Everything is injected at construction (no process-wide singletons), so
/// multiple pipelines can coexist in one process — tests rely on that.
pub struct Pipeline {
    runner: Runner,
    bus: Bus,
    reload: Arc<ReloadCoordinator>,
    targets: Vec<Target>,
    is_dev: bool,
}

impl Pipeline {
    pub fn new(
        runner: Runner,
        bus: Bus,
        reload: Arc<ReloadCoordinator>,
        targets: Vec<Target>,
        is_dev: bool,
    ) -> Self {
        Self {
            runner,
            bus,
            reload,
            targets,
            is_dev,
        }
    }

    /// Resolved targets, in resolution order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The live-reload coordinator shared with watch bindings.
    pub fn reload(&self) -> &Arc<ReloadCoordinator> {
        &self.reload
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// True when running in dev/watch mode.
    pub fn is_dev(&self) -> bool {
        self.is_dev
    }

    /// Executes a stage tree.
    pub fn run_stage<'a>(&'a self, stage: &'a Stage) -> BoxFuture<'a, Result<(), RuntimeError>> {
        async move {
            match stage {
                Stage::Task(id) => self.runner.run_task(*id, &self.targets, self.is_dev).await,
                Stage::Series(stages) => {
                    for stage in stages {
                        self.run_stage(stage).await?;
                    }
                    Ok(())
                }
                Stage::Parallel(stages) => {
                    let results = join_all(stages.iter().map(|s| self.run_stage(s))).await;
                    // All members finished; surface the first failure.
                    results.into_iter().collect::<Result<Vec<_>, _>>()?;
                    Ok(())
                }
            }
        }
        .boxed()
    }

    /// Runs an ordered list of tasks strictly sequentially (watch
    /// sub-pipelines).
    pub async fn run_sequence(&self, ids: &[TaskId]) -> Result<(), RuntimeError> {
        for id in ids {
            self.runner.run_task(*id, &self.targets, self.is_dev).await?;
        }
        Ok(())
    }

    /// Runs the full `build` graph, wrapped in its own timing record.
    pub async fn run_build(&self) -> Result<(), RuntimeError> {
        self.bus
            .publish(Event::now(EventKind::TaskStarting).with_task("build"));
        let started = Instant::now();

        match self.run_stage(&build_graph()).await {
            Ok(()) => {
                self.bus.publish(
                    Event::now(EventKind::TaskFinished)
                        .with_task("build")
                        .with_elapsed(started.elapsed()),
                );
                Ok(())
            }
            Err(e) => {
                self.bus.publish(
                    Event::now(EventKind::TaskFailed)
                        .with_task("build")
                        .with_reason(e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// Runs the standalone `clean` task.
    pub async fn run_clean(&self) -> Result<(), RuntimeError> {
        self.runner
            .run_task(TaskId::Clean, &self.targets, self.is_dev)
            .await
    }

    /// Runs the standalone `zip` task.
    pub async fn run_zip(&self) -> Result<(), RuntimeError> {
        self.runner
            .run_task(TaskId::Zip, &self.targets, self.is_dev)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::super::reload::LogReload;
    use crate::error::TaskError;
    use crate::tasks::{Fanout, Registry, Task, TaskRef};

    /// Stub that appends its id to a shared trace, optionally failing.
    struct TraceTask {
        id: TaskId,
        fail: bool,
        trace: Arc<Mutex<Vec<TaskId>>>,
    }

    #[async_trait]
    impl Task for TraceTask {
        fn id(&self) -> TaskId {
            self.id
        }

        fn fanout(&self) -> Fanout {
            Fanout::Sequential
        }

        fn is_allowed(&self, _target: &Target, _is_dev: bool) -> bool {
            true
        }

        async fn run(&self, _target: &Target, _is_dev: bool) -> Result<(), TaskError> {
            self.trace.lock().unwrap().push(self.id);
            if self.fail {
                return Err(TaskError::Tool {
                    program: "stub".into(),
                    detail: "boom".into(),
                });
            }
            Ok(())
        }
    }

    fn pipeline_with(
        ids: &[(TaskId, bool)],
    ) -> (Pipeline, Arc<Mutex<Vec<TaskId>>>) {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<TaskRef> = ids
            .iter()
            .map(|&(id, fail)| {
                Arc::new(TraceTask {
                    id,
                    fail,
                    trace: trace.clone(),
                }) as TaskRef
            })
            .collect();

        let bus = Bus::default();
        let runner = Runner::new(Arc::new(Registry::with_tasks(tasks)), bus.clone());
        let reload = Arc::new(ReloadCoordinator::new(bus.clone(), Arc::new(LogReload)));
        let pipeline = Pipeline::new(runner, bus, reload, vec![Target::default()], false);
        (pipeline, trace)
    }

    #[tokio::test]
    async fn test_series_aborts_after_failure() {
        let (pipeline, trace) = pipeline_with(&[
            (TaskId::Clean, false),
            (TaskId::Copy, true),
            (TaskId::TemplateFiles, false),
        ]);

        let stage = Stage::Series(vec![
            Stage::Task(TaskId::Clean),
            Stage::Task(TaskId::Copy),
            Stage::Task(TaskId::TemplateFiles),
        ]);
        pipeline.run_stage(&stage).await.unwrap_err();

        // The third stage never starts.
        assert_eq!(*trace.lock().unwrap(), vec![TaskId::Clean, TaskId::Copy]);
    }

    #[tokio::test]
    async fn test_parallel_members_all_finish_despite_failure() {
        let (pipeline, trace) = pipeline_with(&[
            (TaskId::CompileScss, true),
            (TaskId::CompileScssRtl, false),
        ]);

        let stage = Stage::Parallel(vec![
            Stage::Task(TaskId::CompileScss),
            Stage::Task(TaskId::CompileScssRtl),
        ]);
        pipeline.run_stage(&stage).await.unwrap_err();

        let trace = trace.lock().unwrap();
        assert!(trace.contains(&TaskId::CompileScss));
        assert!(trace.contains(&TaskId::CompileScssRtl));
    }

    #[tokio::test]
    async fn test_build_graph_order() {
        // Every task succeeds; the series order must match the fixed graph.
        let ids = [
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
        ];
        let plan: Vec<(TaskId, bool)> = ids.iter().map(|&id| (id, false)).collect();
        let (pipeline, trace) = pipeline_with(&plan);

        pipeline.run_build().await.unwrap();

        let trace = trace.lock().unwrap();
        assert_eq!(trace.len(), ids.len());
        // Clean strictly first, prefix/template/line-endings/translate
        // strictly in that order at the tail.
        assert_eq!(trace[0], TaskId::Clean);
        let pos = |id| trace.iter().position(|&t| t == id).unwrap();
        assert!(pos(TaskId::Copy) < pos(TaskId::CompileScss));
        assert!(pos(TaskId::CompileScss) < pos(TaskId::CompileJs));
        assert!(pos(TaskId::CompileJs) < pos(TaskId::PrefixScss));
        assert!(pos(TaskId::PrefixScss) < pos(TaskId::TemplateFiles));
        assert!(pos(TaskId::TemplateFiles) < pos(TaskId::CorrectLineEndings));
        assert!(pos(TaskId::CorrectLineEndings) < pos(TaskId::TranslatePhp));
    }
}
