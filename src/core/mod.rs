//! # Core engine: fan-out, stage composition, watch loop, live reload.
//!
//! ```text
//!              ┌────────────┐     run_task      ┌──────────┐
//!  CLI ───────►│  Pipeline  │──────────────────►│  Runner  │──► adapters
//!              └─────┬──────┘                   └──────────┘
//!        build graph │  watch bindings
//!                    ▼
//!              ┌────────────┐    broadcast   ┌───────────────────┐
//!              │   watch    │───────────────►│ ReloadCoordinator │
//!              └────────────┘                └───────────────────┘
//! ```
//!
//! ## Contents
//! - [`Runner`] — runs one task across all eligible targets
//! - [`Stage`], [`build_graph`], [`Pipeline`] — stage composition
//! - [`watch`] — filesystem bindings and the watch loop
//! - [`ReloadBackend`], [`ReloadCoordinator`], [`LogReload`] — live reload

mod pipeline;
mod reload;
mod runner;
pub mod watch;

pub use pipeline::{build_graph, Pipeline, Stage};
pub use reload::{LogReload, ReloadBackend, ReloadCoordinator};
pub use runner::Runner;
