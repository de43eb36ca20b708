//! Playback engine abstraction
//!
//! The decode/render pipeline (demux, decode, surface composition) is an
//! external collaborator. This module pins down the seam the core drives it
//! through: transport primitives, a raw per-renderer track enumeration, a
//! selection-parameters sink, and an event stream delivered over a channel.
//! Engine callbacks arrive on system threads; the surface marshals them onto
//! its control task before any shared state is touched.

use crate::catalog::Video;
use crate::types::QualityConstraint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renderer kinds the engine enumerates. Only video and text are surfaced to
/// the inventory; audio and metadata renderers are passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererKind {
    Video,
    Audio,
    Text,
    Metadata,
}

/// One encoded format inside a track group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFormat {
    pub width: u32,
    pub height: u32,
    pub bitrate_bps: u64,
    pub language: Option<String>,
    pub label: Option<String>,
}

/// Group of alternative formats for one logical track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTrackGroup {
    pub formats: Vec<EngineFormat>,
}

/// One renderer with its track groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRenderer {
    pub kind: RendererKind,
    pub groups: Vec<EngineTrackGroup>,
}

/// Raw track enumeration as the engine reports it, renderer by renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTrackInfo {
    pub renderers: Vec<EngineRenderer>,
}

/// Asynchronous engine callbacks, marshaled onto the surface control task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Prepared; playback can start
    Ready,
    /// Stalled waiting for media data
    BufferStart,
    /// Enough media data buffered again
    BufferEnd,
    /// Periodic position tick
    Progress { current_time_ms: u64 },
    /// Asset duration became known or changed
    DurationChanged { duration_ms: u64 },
    /// The per-renderer track enumeration changed
    TracksChanged,
    /// Reached the end of the asset
    PlaybackEnded,
    /// Terminal playback fault
    Error { message: String },
}

/// Failure raised by the engine while executing a command
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Transport and introspection seam of the decode/render pipeline.
///
/// All methods are called on the surface control task only; implementations
/// never need internal locking for the core's sake. Events are delivered
/// separately through the `EngineEvent` channel handed to
/// [`PlayerSurface::spawn`](crate::surface::PlayerSurface::spawn).
pub trait PlaybackEngine: Send {
    /// Bind a resolved catalog asset to the pipeline
    fn load(&mut self, video: &Video) -> std::result::Result<(), EngineError>;

    fn play(&mut self) -> std::result::Result<(), EngineError>;

    fn pause(&mut self) -> std::result::Result<(), EngineError>;

    fn seek_to(&mut self, position_ms: u64) -> std::result::Result<(), EngineError>;

    /// Volume in [0.0, 1.0]
    fn set_volume(&mut self, volume: f32) -> std::result::Result<(), EngineError>;

    fn current_position(&self) -> u64;

    /// `None` until the asset duration is known
    fn duration(&self) -> Option<u64>;

    /// Raw track enumeration; `None` until the engine has mapped tracks
    fn track_info(&self) -> Option<EngineTrackInfo>;

    /// Push a resolved quality constraint into the selection parameters.
    /// May briefly interrupt playback, which is why the resolver never pushes
    /// an unchanged constraint.
    fn apply_selection(&mut self, constraint: &QualityConstraint)
        -> std::result::Result<(), EngineError>;

    /// The video format currently in effect on the renderer, if any
    fn selected_video_format(&self) -> Option<EngineFormat>;

    /// Preferred language for the text renderer's selection
    fn set_preferred_text_language(&mut self, language: &str)
        -> std::result::Result<(), EngineError>;

    /// Release decoder resources. Called exactly once, on surface teardown.
    fn release(&mut self);
}
