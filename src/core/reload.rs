//! # Live-reload coordinator.
//!
//! State machine: `Uninitialized → Armed`, at most one transition per
//! process. [`ReloadCoordinator::arm_from`] arms on the first target (in
//! resolution order) with a truthy live-reload field, by invoking the
//! backend's init operation with that target's options. Until armed, every
//! [`broadcast`](ReloadCoordinator::broadcast) is dropped silently; once
//! armed, each broadcast invokes the backend's reload operation and publishes
//! a [`EventKind::ReloadBroadcast`] event.
//!
//! The actual reload transport (a browser-sync equivalent) is an external
//! capability behind [`ReloadBackend`]; the shipped [`LogReload`] backend
//! does nothing besides letting the coordinator's events make reloads
//! visible in the status lines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LiveReloadOptions, Target};
use crate::events::{Bus, Event, EventKind};

/// External live-reload capability.
#[async_trait]
pub trait ReloadBackend: Send + Sync {
    /// Starts the reload server/transport with the given options.
    async fn init(&self, options: &LiveReloadOptions);

    /// Notifies connected clients to reload.
    async fn reload(&self);
}

/// Backend that performs no external notification.
///
/// Reload visibility comes from the coordinator's bus events.
#[derive(Default)]
pub struct LogReload;

#[async_trait]
impl ReloadBackend for LogReload {
    async fn init(&self, _options: &LiveReloadOptions) {}

    async fn reload(&self) {}
}

/// Arms once, then forwards reload signals to the backend.
pub struct ReloadCoordinator {
    bus: Bus,
    backend: Arc<dyn ReloadBackend>,
    armed: AtomicBool,
}

impl ReloadCoordinator {
    pub fn new(bus: Bus, backend: Arc<dyn ReloadBackend>) -> Self {
        Self {
            bus,
            backend,
            armed: AtomicBool::new(false),
        }
    }

    /// Arms the coordinator from the first target that enables live reload.
    ///
    /// Idempotent: later calls (and later eligible targets) are ignored once
    /// armed. With no eligible target this is a no-op and reloads stay
    /// disabled for the process lifetime.
    pub async fn arm_from(&self, targets: &[Target]) {
        if self.armed.load(Ordering::Acquire) {
            return;
        }
        let Some((target, options)) = targets
            .iter()
            .find_map(|t| t.live_reload.as_ref().map(|o| (t, o)))
        else {
            return;
        };
        self.backend.init(options).await;
        self.armed.store(true, Ordering::Release);

        let mut ev = Event::now(EventKind::ReloadArmed);
        if let Some(name) = &target.name {
            ev = ev.with_target(name.as_str());
        }
        self.bus.publish(ev);
    }

    /// Broadcasts a reload signal; silently dropped before arming.
    pub async fn broadcast(&self) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        self.backend.reload().await;
        self.bus.publish(Event::now(EventKind::ReloadBroadcast));
    }

    /// Returns `true` once armed.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}
