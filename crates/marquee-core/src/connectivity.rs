//! Connectivity monitoring
//!
//! Adapter over the platform's "network became available" signal stream. The
//! stream is live device state: possibly infinite and not restartable.
//! Signals only have an effect while auto-quality is enabled; otherwise they
//! are observed and dropped. Safe to receive at any time, including before
//! any constraint has ever been resolved.

use crate::types::ConnectivityClass;
use std::sync::Arc;
use tracing::debug;

/// Query side of the platform connectivity service
pub trait ConnectivitySource: Send + Sync {
    /// Current connectivity class; `None` when no active network can be read
    fn current_class(&self) -> Option<ConnectivityClass>;
}

/// Decides whether a network-available signal should trigger constraint
/// recomputation
pub struct ConnectivityMonitor {
    source: Arc<dyn ConnectivitySource>,
}

impl ConnectivityMonitor {
    pub fn new(source: Arc<dyn ConnectivitySource>) -> Self {
        Self { source }
    }

    pub fn current_class(&self) -> Option<ConnectivityClass> {
        self.source.current_class()
    }

    /// Handle one signal. Returns whether the resolver should run.
    pub fn on_network_available(&self, auto_quality: bool) -> bool {
        if auto_quality {
            debug!(class = ?self.current_class(), "Network available; re-evaluating quality ceiling");
            true
        } else {
            debug!("Network available; auto-quality off, no effect");
            false
        }
    }
}

/// In-memory connectivity source, settable from tests and demos
#[derive(Default)]
pub struct StaticConnectivity {
    class: std::sync::Mutex<Option<ConnectivityClass>>,
}

impl StaticConnectivity {
    pub fn new(class: Option<ConnectivityClass>) -> Self {
        Self {
            class: std::sync::Mutex::new(class),
        }
    }

    pub fn set(&self, class: Option<ConnectivityClass>) {
        *self.class.lock().expect("connectivity lock poisoned") = class;
    }
}

impl ConnectivitySource for StaticConnectivity {
    fn current_class(&self) -> Option<ConnectivityClass> {
        *self.class.lock().expect("connectivity lock poisoned")
    }
}
