//! Player events and observer bus
//!
//! Translates state-machine and inventory transitions into at-most-once
//! notifications per logical event. Observers are invoked synchronously on
//! the surface control task, in subscription order, which is what gives the
//! `AvailableQualities`-before-`QualityChanged` ordering guarantee.

use crate::types::{PlaybackState, RenditionDescriptor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Host-visible playback notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Buffering flag flipped (edge-triggered, never repeated)
    Buffering { is_buffering: bool },
    /// Engine progress tick; non-decreasing within one playback session
    Progress { current_time_ms: u64 },
    /// Asset duration became known or changed
    DurationChanged { duration_ms: u64 },
    /// Inventory refreshed with at least one video rendition
    AvailableQualities { qualities: Vec<RenditionDescriptor> },
    /// The format in effect on the video renderer changed
    QualityChanged { quality: RenditionDescriptor },
    /// Canonical state transition outside the buffering/error kinds
    StateChanged { state: PlaybackState },
    /// Transition into the terminal error state
    Error { message: String },
}

impl PlayerEvent {
    /// Event name on the host bridge
    pub fn host_event_name(&self) -> &'static str {
        match self {
            PlayerEvent::Buffering { .. } => "onBuffering",
            PlayerEvent::Progress { .. } => "onProgress",
            PlayerEvent::DurationChanged { .. } => "onDurationChange",
            PlayerEvent::AvailableQualities { .. } => "onAvailableQualities",
            PlayerEvent::QualityChanged { .. } => "onQualityChanged",
            PlayerEvent::StateChanged { .. } => "onStateChanged",
            PlayerEvent::Error { .. } => "onError",
        }
    }
}

/// Observer callback, invoked on the control task
pub type Observer = Box<dyn Fn(&PlayerEvent) + Send>;

/// Handle for removing a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(u64);

/// Synchronous fan-out of player events to registered observers
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<(ObserverId, Observer)>,
    next_id: u64,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Deliver one event to every observer, in subscription order
    pub fn notify(&self, event: &PlayerEvent) {
        debug!(event = event.host_event_name(), observers = self.observers.len(), "Notify");
        for (_, observer) in &self.observers {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
