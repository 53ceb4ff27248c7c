//! # Subscriber contract and the bus listener.
//!
//! [`Subscribe`] is the hook for consuming pipeline [`Event`]s (logging,
//! timing, test probes). [`spawn_listener`] attaches a set of subscribers to
//! a [`Bus`]: one background task receives every event and forwards it to
//! each subscriber in order.
//!
//! A single consumer task means subscriber state (like the timing table) is
//! only ever mutated from one place — no locking discipline beyond interior
//! mutability is needed.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};

/// Hook into pipeline lifecycle events.
///
/// ## Implementing custom subscribers
/// ```no_run
/// use async_trait::async_trait;
/// use wpeg::{Event, EventKind, Subscribe};
///
/// struct FailureCounter;
///
/// #[async_trait]
/// impl Subscribe for FailureCounter {
///     async fn on_event(&self, event: &Event) {
///         if event.kind == EventKind::TaskFailed {
///             // increment a counter
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync {
    /// Called for every event, in publish order.
    async fn on_event(&self, event: &Event);

    /// Returns a stable subscriber name (diagnostics).
    fn name(&self) -> &'static str {
        "subscriber"
    }
}

/// Spawns the listener task that fans bus events out to `subscribers`.
///
/// The task exits when the bus closes (all senders dropped). Lagged
/// receivers skip missed events and keep going.
pub fn spawn_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    for sub in &subscribers {
                        sub.on_event(&ev).await;
                    }
                }
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    })
}
