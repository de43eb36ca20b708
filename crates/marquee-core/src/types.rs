//! Core types for the Marquee playback surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an attached playback surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renderer kind a rendition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenditionKind {
    Video,
    Text,
}

impl std::fmt::Display for RenditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenditionKind::Video => write!(f, "video"),
            RenditionKind::Text => write!(f, "text"),
        }
    }
}

/// One encoded variant of a track, as reported by the playback engine.
///
/// Immutable once produced from an inventory snapshot. Ordering within one
/// snapshot follows the engine's own enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenditionDescriptor {
    /// Renderer kind this rendition belongs to
    pub kind: RenditionKind,
    /// Frame width in pixels (0 for text tracks)
    pub width: u32,
    /// Frame height in pixels (0 for text tracks)
    pub height: u32,
    /// Peak bitrate in bits per second (0 for text tracks)
    pub bitrate_bps: u64,
    /// BCP-47 language code, when the engine reports one
    pub language: Option<String>,
    /// Human-readable label, when the engine reports one
    pub label: Option<String>,
}

impl RenditionDescriptor {
    /// Video rendition from its resolution and bitrate
    pub fn video(width: u32, height: u32, bitrate_bps: u64) -> Self {
        Self {
            kind: RenditionKind::Video,
            width,
            height,
            bitrate_bps,
            language: None,
            label: None,
        }
    }

    /// Text (caption/subtitle) rendition from its language and label
    pub fn text(language: Option<String>, label: Option<String>) -> Self {
        Self {
            kind: RenditionKind::Text,
            width: 0,
            height: 0,
            bitrate_bps: 0,
            language,
            label,
        }
    }
}

/// Upper bound applied to automatic rendition selection.
///
/// Only the most-recently-resolved constraint is active. Owned by the
/// [`QualityResolver`](crate::quality::QualityResolver); the engine only ever
/// receives a read-only view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityConstraint {
    pub max_width: u32,
    pub max_height: u32,
    pub max_bitrate_bps: u64,
}

impl QualityConstraint {
    pub const fn new(max_width: u32, max_height: u32, max_bitrate_bps: u64) -> Self {
        Self {
            max_width,
            max_height,
            max_bitrate_bps,
        }
    }
}

impl std::fmt::Display for QualityConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}@{}bps",
            self.max_width, self.max_height, self.max_bitrate_bps
        )
    }
}

/// Which ranked source produced the active quality constraint.
///
/// Exactly one source is active at any time: a fixed user selection overrides
/// the network-adaptive policy, which only applies while auto-quality is on;
/// the default ceiling covers everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitySource {
    /// Explicit user selection by preset label ("720p", ...)
    UserFixed(String),
    /// Auto-quality policy driven by the last observed connectivity class
    NetworkAdaptive(ConnectivityClass),
    /// Built-in default ceiling
    Default,
}

/// Discrete connectivity class reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectivityClass {
    /// Wifi, ethernet, or equivalent high-bandwidth link
    HighBandwidth,
    /// Cellular or otherwise metered link
    Metered,
    /// Anything else, including unknown link types
    Other,
}

impl std::fmt::Display for ConnectivityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityClass::HighBandwidth => write!(f, "high-bandwidth"),
            ConnectivityClass::Metered => write!(f, "metered"),
            ConnectivityClass::Other => write!(f, "other"),
        }
    }
}

/// Canonical playback state, mutated only by the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No asset bound yet
    Idle,
    /// Catalog lookup and engine preparation in flight
    Loading,
    /// Stalled waiting for media data
    Buffering,
    /// Prepared and ready to play
    Ready,
    /// Actively rendering
    Playing,
    /// Paused by command or scrub
    Paused,
    /// Reached the end of the asset
    Ended,
    /// Terminal playback fault; a new load is required to leave it
    Error(String),
}

impl PlaybackState {
    /// Terminal for the current asset: only a new load command leaves it
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Error(_))
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Buffering => write!(f, "buffering"),
            PlaybackState::Ready => write!(f, "ready"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Ended => write!(f, "ended"),
            PlaybackState::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Last video format actually in effect on the renderer.
///
/// The engine may pick a rendition below the constraint ceiling, so quality
/// changes are detected against this snapshot rather than the constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedQuality {
    pub width: u32,
    pub height: u32,
    pub bitrate_bps: u64,
}

impl SelectedQuality {
    pub fn descriptor(&self) -> RenditionDescriptor {
        RenditionDescriptor::video(self.width, self.height, self.bitrate_bps)
    }
}

/// Host-settable configuration for one playback surface.
///
/// Every field can change at any time; each setter triggers the documented
/// recomputation (load attempt, constraint resolution, or engine
/// reconfiguration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerOptions {
    /// Catalog account the asset lives under
    pub account_id: Option<String>,
    /// Opaque video identifier to resolve through the catalog
    pub video_id: Option<String>,
    /// Catalog policy key authorizing the lookup
    pub policy_key: Option<String>,
    /// Fixed quality preset label; `None` means no user override
    pub initial_quality: Option<String>,
    /// Track the network-adaptive ceiling instead of a fixed one
    pub auto_quality: bool,
    /// Render caption cues
    pub captions_enabled: bool,
    /// Preferred caption language (BCP-47)
    pub captions_language: String,
    /// Transport controls visible on the surface
    pub show_controls: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            account_id: None,
            video_id: None,
            policy_key: None,
            initial_quality: None,
            auto_quality: true,
            captions_enabled: true,
            captions_language: "en".to_string(),
            show_controls: true,
        }
    }
}
