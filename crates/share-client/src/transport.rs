//! Media transport seam.
//!
//! The real-time transport (signaling, WebRTC negotiation, SFU forwarding)
//! lives in the media server and its client SDK. This module defines the
//! slice of that SDK the views use, so a binding or an in-memory fake can be
//! plugged in.
//!
//! Roster and track notifications are delivered as typed [`RoomEvent`]s on a
//! `tokio::sync::broadcast` channel; each subscriber gets every event sent
//! after it subscribed.

use crate::errors::TransportError;
use async_trait::async_trait;
use common::secret::SecretString;
use tokio::sync::broadcast;

/// What a track carries, as reported by the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackSource {
    Camera,
    Microphone,
    ScreenShare,
    ScreenShareAudio,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
}

/// A captured track that has not been published yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: String,
    pub kind: TrackKind,
    pub source: TrackSource,
}

/// A track published by the local participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPublication {
    /// Server-assigned track id.
    pub sid: String,
    /// Id of the [`LocalTrack`] that was published.
    pub track_id: String,
    pub kind: TrackKind,
    pub source: TrackSource,
}

/// A subscribed track of a remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub sid: String,
    pub participant_identity: String,
    pub kind: TrackKind,
    pub source: TrackSource,
}

/// A remote publication; `track` is set once it is subscribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrackPublication {
    pub sid: String,
    pub kind: TrackKind,
    pub source: TrackSource,
    pub track: Option<RemoteTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParticipant {
    pub identity: String,
    pub name: String,
    pub publications: Vec<RemoteTrackPublication>,
}

impl RemoteParticipant {
    /// First subscribed screen-share track of this participant.
    pub fn screen_share_track(&self) -> Option<&RemoteTrack> {
        self.publications
            .iter()
            .filter(|publication| publication.source == TrackSource::ScreenShare)
            .find_map(|publication| publication.track.as_ref())
    }
}

/// Room notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ParticipantJoined { identity: String },
    ParticipantLeft { identity: String },
    /// A remote track was subscribed.
    TrackAdded(RemoteTrack),
    /// A remote track was unsubscribed.
    TrackRemoved(RemoteTrack),
}

/// Connection to the media room (enables mocking).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Join the room at `url` using `credential` as bearer proof.
    async fn connect(&self, url: &str, credential: &SecretString) -> Result<(), TransportError>;

    /// Leave the room. No-op when not connected.
    async fn disconnect(&self);

    /// Participants in the room other than the local one.
    fn remote_participants(&self) -> Vec<RemoteParticipant>;

    /// Tracks the local participant currently publishes.
    fn local_publications(&self) -> Vec<TrackPublication>;

    async fn publish_track(&self, track: LocalTrack) -> Result<TrackPublication, TransportError>;

    async fn unpublish_track(&self, sid: &str) -> Result<(), TransportError>;

    /// Subscribe to room notifications.
    fn events(&self) -> broadcast::Receiver<RoomEvent>;
}
