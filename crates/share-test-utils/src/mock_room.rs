//! In-memory media room.
//!
//! `RoomHub` plays the media server: every [`HubTransport`] created from the
//! same hub joins the same room. The hub verifies join credentials with the
//! test API secret, enforces the publish grant, and forwards publications
//! and roster changes to the other participants as [`RoomEvent`]s. Remote
//! tracks are auto-subscribed.

use async_trait::async_trait;
use common::grants::JoinClaims;
use common::secret::{ExposeSecret, SecretString};
use cs_test_utils::{TEST_API_SECRET, TEST_ROOM_NAME};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use share_client::errors::TransportError;
use share_client::transport::{
    LocalTrack, RemoteParticipant, RemoteTrack, RemoteTrackPublication, RoomEvent,
    TrackPublication, Transport,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct Member {
    name: String,
    events: broadcast::Sender<RoomEvent>,
    publications: Vec<TrackPublication>,
}

struct HubInner {
    api_secret: String,
    room: String,
    members: Mutex<HashMap<String, Member>>,
}

impl HubInner {
    /// Send `event` to every member except `from`.
    fn broadcast_from(&self, from: &str, event: RoomEvent) {
        let members = self.members.lock().unwrap();
        for (identity, member) in members.iter() {
            if identity != from {
                let _ = member.events.send(event.clone());
            }
        }
    }
}

/// Shared in-memory room.
#[derive(Clone)]
pub struct RoomHub {
    inner: Arc<HubInner>,
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomHub {
    /// Room accepting credentials signed by the test credential server.
    pub fn new() -> Self {
        Self::with_credentials(TEST_API_SECRET, TEST_ROOM_NAME)
    }

    pub fn with_credentials(api_secret: &str, room: &str) -> Self {
        Self {
            inner: Arc::new(HubInner {
                api_secret: api_secret.to_string(),
                room: room.to_string(),
                members: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// A new, not yet connected participant handle.
    pub fn transport(&self) -> Arc<HubTransport> {
        self.transport_with_connect_delay(Duration::ZERO)
    }

    /// Participant handle whose `connect` waits `delay` before joining.
    pub fn transport_with_connect_delay(&self, delay: Duration) -> Arc<HubTransport> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(HubTransport {
            hub: Arc::clone(&self.inner),
            events,
            joined: Mutex::new(None),
            connect_delay: delay,
        })
    }

    /// Identities of everyone in the room, sorted.
    pub fn participant_identities(&self) -> Vec<String> {
        let mut identities: Vec<String> =
            self.inner.members.lock().unwrap().keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Publications of every participant.
    pub fn publication_count(&self) -> usize {
        self.inner
            .members
            .lock()
            .unwrap()
            .values()
            .map(|member| member.publications.len())
            .sum()
    }
}

#[derive(Debug, Clone)]
struct Joined {
    identity: String,
    can_publish: bool,
}

/// One participant's connection to a [`RoomHub`].
pub struct HubTransport {
    hub: Arc<HubInner>,
    events: broadcast::Sender<RoomEvent>,
    joined: Mutex<Option<Joined>>,
    connect_delay: Duration,
}

impl HubTransport {
    /// Identity this transport joined with.
    pub fn identity(&self) -> Option<String> {
        self.joined
            .lock()
            .unwrap()
            .as_ref()
            .map(|joined| joined.identity.clone())
    }

    fn joined(&self) -> Result<Joined, TransportError> {
        self.joined
            .lock()
            .unwrap()
            .clone()
            .ok_or(TransportError::NotConnected)
    }

    fn verify(&self, credential: &SecretString) -> Result<JoinClaims, TransportError> {
        let claims = decode::<JoinClaims>(
            credential.expose_secret(),
            &DecodingKey::from_secret(self.hub.api_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| TransportError::Unauthorized(e.to_string()))?
        .claims;

        if !claims.video.room_join || claims.video.room != self.hub.room {
            return Err(TransportError::Unauthorized(format!(
                "credential does not grant room '{}'",
                self.hub.room
            )));
        }
        Ok(claims)
    }
}

#[async_trait]
impl Transport for HubTransport {
    async fn connect(&self, _url: &str, credential: &SecretString) -> Result<(), TransportError> {
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }

        let claims = self.verify(credential)?;

        if self.joined.lock().unwrap().is_some() {
            return Ok(());
        }

        {
            let mut members = self.hub.members.lock().unwrap();
            if members.contains_key(&claims.sub) {
                return Err(TransportError::ConnectFailed(format!(
                    "identity '{}' already in room",
                    claims.sub
                )));
            }
            members.insert(
                claims.sub.clone(),
                Member {
                    name: claims.name.clone(),
                    events: self.events.clone(),
                    publications: Vec::new(),
                },
            );
        }

        *self.joined.lock().unwrap() = Some(Joined {
            identity: claims.sub.clone(),
            can_publish: claims.video.can_publish,
        });

        self.hub.broadcast_from(
            &claims.sub,
            RoomEvent::ParticipantJoined {
                identity: claims.sub.clone(),
            },
        );
        Ok(())
    }

    async fn disconnect(&self) {
        let Some(joined) = self.joined.lock().unwrap().take() else {
            return;
        };

        let removed = self.hub.members.lock().unwrap().remove(&joined.identity);
        if let Some(member) = removed {
            for publication in member.publications {
                self.hub.broadcast_from(
                    &joined.identity,
                    RoomEvent::TrackRemoved(remote_track(&joined.identity, &publication)),
                );
            }
        }

        self.hub.broadcast_from(
            &joined.identity,
            RoomEvent::ParticipantLeft {
                identity: joined.identity.clone(),
            },
        );
    }

    fn remote_participants(&self) -> Vec<RemoteParticipant> {
        let Some(own) = self.identity() else {
            return Vec::new();
        };

        let members = self.hub.members.lock().unwrap();
        let mut participants: Vec<RemoteParticipant> = members
            .iter()
            .filter(|(identity, _)| **identity != own)
            .map(|(identity, member)| RemoteParticipant {
                identity: identity.clone(),
                name: member.name.clone(),
                publications: member
                    .publications
                    .iter()
                    .map(|publication| RemoteTrackPublication {
                        sid: publication.sid.clone(),
                        kind: publication.kind,
                        source: publication.source,
                        track: Some(remote_track(identity, publication)),
                    })
                    .collect(),
            })
            .collect();
        participants.sort_by(|a, b| a.identity.cmp(&b.identity));
        participants
    }

    fn local_publications(&self) -> Vec<TrackPublication> {
        let Some(own) = self.identity() else {
            return Vec::new();
        };
        self.hub
            .members
            .lock()
            .unwrap()
            .get(&own)
            .map(|member| member.publications.clone())
            .unwrap_or_default()
    }

    async fn publish_track(&self, track: LocalTrack) -> Result<TrackPublication, TransportError> {
        let joined = self.joined()?;
        if !joined.can_publish {
            return Err(TransportError::PermissionDenied(
                "credential does not grant publish".to_string(),
            ));
        }

        let publication = TrackPublication {
            sid: format!("TR_{}", uuid::Uuid::new_v4().simple()),
            track_id: track.id,
            kind: track.kind,
            source: track.source,
        };

        self.hub
            .members
            .lock()
            .unwrap()
            .get_mut(&joined.identity)
            .ok_or(TransportError::NotConnected)?
            .publications
            .push(publication.clone());

        self.hub.broadcast_from(
            &joined.identity,
            RoomEvent::TrackAdded(remote_track(&joined.identity, &publication)),
        );
        Ok(publication)
    }

    async fn unpublish_track(&self, sid: &str) -> Result<(), TransportError> {
        let joined = self.joined()?;

        let publication = {
            let mut members = self.hub.members.lock().unwrap();
            let member = members
                .get_mut(&joined.identity)
                .ok_or(TransportError::NotConnected)?;
            let index = member
                .publications
                .iter()
                .position(|publication| publication.sid == sid)
                .ok_or_else(|| TransportError::TrackNotFound(sid.to_string()))?;
            member.publications.remove(index)
        };

        self.hub.broadcast_from(
            &joined.identity,
            RoomEvent::TrackRemoved(remote_track(&joined.identity, &publication)),
        );
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }
}

fn remote_track(publisher: &str, publication: &TrackPublication) -> RemoteTrack {
    RemoteTrack {
        sid: publication.sid.clone(),
        participant_identity: publisher.to_string(),
        kind: publication.kind,
        source: publication.source,
    }
}
