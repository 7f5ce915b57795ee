//! Client error types.
//!
//! `ShareError` is what view operations return. Views do not show these
//! messages directly; they set a fixed banner and log the cause.

use thiserror::Error;

/// Failure reported by the media transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Credential rejected: {0}")]
    Unauthorized(String),

    #[error("Not connected to the room")]
    NotConnected,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),
}

/// Failure acquiring screen-capture tracks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user denied permission or cancelled the picker.
    #[error("Screen capture denied: {0}")]
    PermissionDenied(String),

    #[error("Screen capture returned no tracks")]
    NoTracks,

    #[error("Screen capture unavailable: {0}")]
    Unavailable(String),
}

/// Failure starting video playback on a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Playback failed: {0}")]
pub struct PlaybackError(pub String);

/// Failure of a room session operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A connection attempt is already in progress")]
    ConnectInProgress,

    #[error("Connection attempt aborted by disconnect")]
    Aborted,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Error returned by view operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// Credential service unreachable or answered non-2xx.
    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Another operation on the same view is still running.
    #[error("Operation already in progress")]
    Busy,
}

impl ShareError {
    /// Bounded label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ShareError::Network(_) => "network",
            ShareError::Capture(_) => "capture",
            ShareError::Transport(_) => "transport",
            ShareError::Session(_) => "session",
            ShareError::Busy => "busy",
        }
    }
}
