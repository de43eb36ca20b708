//! Marquee Core - Embeddable Adaptive Playback Surface
//!
//! This crate provides the playback core behind a host-embedded video view:
//! - Catalog asset resolution over the playback REST edge
//! - Rendition inventory captured from the engine's track report
//! - Quality constraint resolution (user preset / network-adaptive / default)
//! - Canonical playback state machine with edge-triggered buffering
//! - Observer bus with at-most-once notifications per logical event
//! - Id-addressed surface registry for command routing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Marquee Core                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │   Catalog    │  │  Rendition   │  │   Quality    │          │
//! │  │   Client     │  │  Inventory   │  │   Resolver   │          │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘          │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Player    │                              │
//! │                    │   Surface   │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐           │
//! │  │ Connectivity │  │  Observer   │  │   Surface    │           │
//! │  │   Monitor    │  │     Bus     │  │   Registry   │           │
//! │  └──────────────┘  └─────────────┘  └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All mutable playback state lives on one control task per surface; the
//! [`surface::PlayerHandle`] and [`registry::SurfaceRegistry`] marshal host
//! commands onto it and complete them asynchronously.

pub mod error;
pub mod types;
pub mod engine;
pub mod catalog;
pub mod inventory;
pub mod quality;
pub mod connectivity;
pub mod state;
pub mod events;
pub mod surface;
pub mod registry;

pub use error::{CommandKind, Error, Result};
pub use types::*;
pub use engine::{EngineEvent, EngineFormat, EngineTrackInfo, PlaybackEngine};
pub use catalog::{Catalog, EdgeCatalog, Video, VideoSource};
pub use inventory::{InventorySnapshot, RenditionInventory};
pub use quality::{ceiling_for_class, preset_for_label, QualityResolver, DEFAULT_CEILING};
pub use connectivity::{ConnectivityMonitor, ConnectivitySource, StaticConnectivity};
pub use state::PlaybackStateMachine;
pub use events::{Observer, ObserverBus, ObserverId, PlayerEvent};
pub use surface::{PlayerHandle, PlayerSurface};
pub use registry::SurfaceRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Marquee Core initialized");
}
