//! Pipeline events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the runner, pipeline
//! composer, watcher, reload coordinator and task adapters.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Runner`, `Pipeline`, `Watcher`, `ReloadCoordinator`,
//!   adapters (via the non-fatal error handler).
//! - **Consumer**: the listener task from
//!   [`spawn_listener`](crate::subscribers::spawn_listener), which fans
//!   events out to [`Subscribe`](crate::subscribers::Subscribe) impls
//!   (most notably the timing reporter).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
