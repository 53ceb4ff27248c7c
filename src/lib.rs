//! # wpeg
//!
//! **wpeg** is a configurable asset build pipeline for WordPress themes and
//! plugins: copy, compile (SCSS/JS/JSX), prefix, template, normalize,
//! translate and package — driven by a declarative JSON configuration, with
//! a one-shot `build` mode and a persistent `watch` mode with live reload.
//!
//! ## Architecture
//! ```text
//!  wpeg.config.json ──► config::resolve ──► Vec<Target>
//!                                              │
//!            ┌─────────────────────────────────┤
//!            ▼                                 ▼
//!  ┌──────────────────┐  run_task   ┌──────────────────────┐
//!  │     Pipeline     │────────────►│        Runner        │
//!  │  (stage graph,   │             │ (is_allowed filter,  │
//!  │   watch loops)   │             │  per-task fan-out)   │
//!  └────────┬─────────┘             └──────────┬───────────┘
//!           │                                  ▼
//!           │                       ┌──────────────────────┐
//!           │                       │   Registry: 12 task  │
//!           │                       │   adapters (glob+fs, │
//!           │                       │   sass/esbuild/..,   │
//!           │                       │   http, zip)         │
//!           │                       └──────────┬───────────┘
//!           │  Publishes:                      │ Publishes:
//!           │  - WatchTriggered                │ - TaskStarting/Finished
//!           │  - ReloadArmed/Broadcast         │ - TaskFailed
//!           ▼                                  ▼ - AdapterError
//!  ┌──────────────────────────────────────────────────────┐
//!  │                Bus (broadcast channel)               │
//!  └──────────────────────────┬───────────────────────────┘
//!                             ▼
//!                      spawn_listener
//!                             │
//!                             ▼
//!                      TimingReporter
//!                 (per-task timing + status lines)
//! ```
//!
//! ## Lifecycle
//! ```text
//! build: clean → {copy ∥ remote_copy} → {scss ∥ scss_rtl} → {js ∥ jsx}
//!        → prefix_scss → template_files → correct_line_endings
//!        → translate_php
//!
//! watch: arm live reload, then per binding {files, js, jsx, scss}:
//!   loop {
//!     ├─► await filesystem change under the binding's glob bases
//!     ├─► debounce, drain burst, filter by globs
//!     ├─► publish WatchTriggered
//!     ├─► run the binding's sub-pipeline sequentially
//!     └─► broadcast live reload (dropped unless armed)
//!   }
//! ```
//!
//! ## Features
//! | Area            | Description                                            | Key types / traits                   |
//! |-----------------|--------------------------------------------------------|--------------------------------------|
//! | **Config**      | JSON targets merged over defaults, `{key}` expansion.  | [`Target`], [`resolve`]              |
//! | **Tasks**       | Adapter contract and the built-in task set.            | [`Task`], [`TaskId`], [`Registry`]   |
//! | **Engine**      | Fan-out, stage graph, watch loop, live reload.         | [`Runner`], [`Pipeline`], [`watch`]  |
//! | **Subscribers** | Hook into pipeline events (timing, status lines).      | [`Subscribe`], [`TimingReporter`]    |
//! | **Errors**      | Typed errors for config, tasks and orchestration.      | [`ConfigError`], [`TaskError`], [`RuntimeError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use wpeg::{
//!     resolve, Bus, LogReload, Pipeline, Registry, ReloadCoordinator, Runner,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let targets = resolve("wpeg.config.json".as_ref())?;
//!
//!     let bus = Bus::default();
//!     let registry = Arc::new(Registry::builtin(bus.clone()));
//!     let runner = Runner::new(registry, bus.clone());
//!     let reload = Arc::new(ReloadCoordinator::new(bus.clone(), Arc::new(LogReload)));
//!
//!     let pipeline = Pipeline::new(runner, bus, reload, targets, false);
//!     pipeline.run_build().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::{
    resolve, LiveReloadOptions, Target, TranslateOptions, ZipEntry, DEFAULT_CONFIG_PATH,
};
pub use core::{build_graph, watch, LogReload, Pipeline, ReloadBackend, ReloadCoordinator, Runner, Stage};
pub use error::{ConfigError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{spawn_listener, Subscribe, TimingReporter};
pub use tasks::{Fanout, Registry, Task, TaskId, TaskRef};
