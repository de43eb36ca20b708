//! Error types for Marquee Core

use crate::types::SurfaceId;
use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Transport/configuration command kinds, used to attribute engine failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Play,
    Pause,
    Seek,
    Volume,
    Load,
    Quality,
    Captions,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::Play => write!(f, "play"),
            CommandKind::Pause => write!(f, "pause"),
            CommandKind::Seek => write!(f, "seek"),
            CommandKind::Volume => write!(f, "volume"),
            CommandKind::Load => write!(f, "load"),
            CommandKind::Quality => write!(f, "quality"),
            CommandKind::Captions => write!(f, "captions"),
        }
    }
}

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    /// Command addressed to an unknown or unattached surface
    #[error("no player surface with id {0}")]
    TargetNotFound(SurfaceId),

    /// The engine rejected a transport or configuration command
    #[error("{kind} command failed: {message}")]
    CommandFailed { kind: CommandKind, message: String },

    /// Query issued before the required data exists (engine not ready)
    #[error("track information not available yet")]
    Unavailable,

    /// Catalog lookup found no asset for the identifier
    #[error("video {video_id} not found in catalog")]
    VideoNotFound { video_id: String },

    /// Catalog lookup failed at the transport level
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The surface has been torn down; the engine is released
    #[error("player surface detached")]
    Detached,

    /// Terminal playback fault reported by the engine
    #[error("playback error: {0}")]
    Playback(String),

    /// Rejected configuration input
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Stable code for host-bridge rejection payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Error::CommandFailed { .. } => "COMMAND_FAILED",
            Error::Unavailable => "UNAVAILABLE",
            Error::VideoNotFound { .. } => "VIDEO_NOT_FOUND",
            Error::Network(_) => "NETWORK",
            Error::Detached => "DETACHED",
            Error::Playback(_) => "PLAYBACK",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
