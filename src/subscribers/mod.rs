//! # Event subscribers: the consumer side of the bus.
//!
//! ```text
//! Runner/Watcher/Adapters ── publish(Event) ──► Bus ──► spawn_listener
//!                                                          │
//!                                                 ┌────────┴───────┐
//!                                                 ▼                ▼
//!                                           TimingReporter   custom subs
//! ```
//!
//! ## Contents
//! - [`Subscribe`] — the subscriber trait
//! - [`spawn_listener`] — attaches subscribers to a bus
//! - [`TimingReporter`], [`TimingTable`] — per-task timing + status lines

mod reporter;
mod subscribe;

pub use reporter::{format_duration, StartOutcome, TimingReporter, TimingTable};
pub use subscribe::{spawn_listener, Subscribe};
