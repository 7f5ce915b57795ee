//! Video output seam.

use crate::errors::PlaybackError;
use crate::transport::RemoteTrack;
use async_trait::async_trait;

/// Element a remote video track is rendered into (enables mocking).
#[async_trait]
pub trait VideoSurface: Send + Sync {
    /// Bind `track` as the surface's source, replacing any previous one.
    fn attach(&self, track: &RemoteTrack);

    /// Start playback of the attached track.
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Detach the source and blank the surface.
    fn clear(&self);
}
