//! `RoomSession` - the per-application room connection.
//!
//! One `RoomSession` is built per application instance and shared with the
//! views through [`crate::context::AppContext`]. It owns the transport
//! handle for its whole lifetime; `connect`/`disconnect` open and close the
//! room session on that handle.
//!
//! # State
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!       ^                       |                  |
//!       +-------- error --------+                  |
//!       +------------------ disconnect ------------+
//! ```
//!
//! A second `connect` while one is in flight fails with
//! [`SessionError::ConnectInProgress`]; `connect` while connected is a
//! no-op.
//!
//! # Participant count
//!
//! While connected, a roster task recomputes the count from
//! [`Transport::remote_participants`] on every join/leave event and
//! publishes it on a `watch` channel. The local participant is never
//! counted.

use crate::errors::SessionError;
use crate::transport::{RoomEvent, Transport};
use common::secret::SecretString;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

struct RosterTask {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Room connection shared by the views of one application instance.
pub struct RoomSession {
    transport: Arc<dyn Transport>,
    signaling_url: String,
    state: watch::Sender<ConnectionState>,
    participant_count: Arc<watch::Sender<usize>>,
    roster_task: Mutex<Option<RosterTask>>,
}

impl RoomSession {
    pub fn new(transport: Arc<dyn Transport>, signaling_url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (participant_count, _) = watch::channel(0);
        Self {
            transport,
            signaling_url: signaling_url.into(),
            state,
            participant_count: Arc::new(participant_count),
            roster_task: Mutex::new(None),
        }
    }

    /// Join the room with `credential`.
    ///
    /// On transport failure the state returns to `Disconnected` and the
    /// error is returned.
    #[instrument(skip_all, name = "share.session.connect")]
    pub async fn connect(&self, credential: &SecretString) -> Result<(), SessionError> {
        let mut observed = ConnectionState::Disconnected;
        self.state.send_if_modified(|state| {
            observed = *state;
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });

        match observed {
            ConnectionState::Connected => {
                debug!(target: "share.session", "Already connected");
                return Ok(());
            }
            ConnectionState::Connecting => {
                warn!(target: "share.session", "Rejected concurrent connect");
                return Err(SessionError::ConnectInProgress);
            }
            ConnectionState::Disconnected => {}
        }

        // Subscribe before connecting so no roster event is missed.
        let events = self.transport.events();

        if let Err(e) = self.transport.connect(&self.signaling_url, credential).await {
            warn!(target: "share.session", error = %e, "Failed to connect to room");
            self.state.send_replace(ConnectionState::Disconnected);
            return Err(e.into());
        }

        // The roster slot lock is held across the transition so a racing
        // `disconnect` sees either no session or the installed task.
        let completed = {
            let mut roster_task = self.roster_task.lock().await;
            let mut completed = false;
            self.state.send_if_modified(|state| {
                if *state == ConnectionState::Connecting {
                    *state = ConnectionState::Connected;
                    completed = true;
                    true
                } else {
                    false
                }
            });
            if completed {
                self.start_roster_task(&mut roster_task, events);
            }
            completed
        };

        if !completed {
            debug!(target: "share.session", "Disconnected while connecting, leaving room");
            self.transport.disconnect().await;
            return Err(SessionError::Aborted);
        }

        info!(
            target: "share.session",
            url = %self.signaling_url,
            participants = self.participant_count(),
            "Connected to room"
        );
        Ok(())
    }

    /// Leave the room. Safe to call in any state.
    #[instrument(skip_all, name = "share.session.disconnect")]
    pub async fn disconnect(&self) {
        let (previous, task) = {
            let mut roster_task = self.roster_task.lock().await;
            let previous = self.state.send_replace(ConnectionState::Disconnected);
            self.participant_count.send_replace(0);
            (previous, roster_task.take())
        };

        if let Some(task) = task {
            task.cancel_token.cancel();
            task.handle.abort();
        }

        if previous == ConnectionState::Disconnected {
            debug!(target: "share.session", "Disconnect with no active session");
            return;
        }

        self.transport.disconnect().await;
        info!(target: "share.session", "Disconnected from room");
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Remote participants currently in the room.
    pub fn participant_count(&self) -> usize {
        *self.participant_count.borrow()
    }

    pub fn watch_participant_count(&self) -> watch::Receiver<usize> {
        self.participant_count.subscribe()
    }

    /// Subscribe to room notifications.
    pub fn events(&self) -> broadcast::Receiver<RoomEvent> {
        self.transport.events()
    }

    /// The underlying transport, for publish/subscribe calls.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    fn start_roster_task(
        &self,
        slot: &mut Option<RosterTask>,
        events: broadcast::Receiver<RoomEvent>,
    ) {
        self.participant_count
            .send_replace(self.transport.remote_participants().len());

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_roster_task(
            Arc::clone(&self.transport),
            events,
            Arc::clone(&self.participant_count),
            cancel_token.clone(),
        ));

        let previous = slot.replace(RosterTask {
            cancel_token,
            handle,
        });
        if let Some(task) = previous {
            task.cancel_token.cancel();
        }
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        if let Some(task) = self.roster_task.get_mut().take() {
            task.cancel_token.cancel();
            task.handle.abort();
        }
    }
}

async fn run_roster_task(
    transport: Arc<dyn Transport>,
    mut events: broadcast::Receiver<RoomEvent>,
    participant_count: Arc<watch::Sender<usize>>,
    cancel_token: CancellationToken,
) {
    let recount = || {
        let count = transport.remote_participants().len();
        participant_count.send_replace(count);
        debug!(target: "share.session", participants = count, "Participant count updated");
    };

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,

            event = events.recv() => match event {
                Ok(RoomEvent::ParticipantJoined { .. } | RoomEvent::ParticipantLeft { .. }) => {
                    recount();
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "share.session", skipped, "Roster task lagged behind room events");
                    recount();
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    debug!(target: "share.session", "Roster task stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use crate::transport::{LocalTrack, RemoteParticipant, TrackPublication};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Transport whose connect blocks until released.
    struct GatedTransport {
        gate: Notify,
        fail: bool,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
        events: broadcast::Sender<RoomEvent>,
        participants: std::sync::Mutex<Vec<RemoteParticipant>>,
    }

    impl GatedTransport {
        fn new(fail: bool) -> Arc<Self> {
            let (events, _) = broadcast::channel(16);
            Arc::new(Self {
                gate: Notify::new(),
                fail,
                connects: AtomicUsize::new(0),
                disconnects: AtomicUsize::new(0),
                events,
                participants: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn add_participant(&self, identity: &str) {
            self.participants.lock().unwrap().push(RemoteParticipant {
                identity: identity.to_string(),
                name: "Viewer".to_string(),
                publications: Vec::new(),
            });
            let _ = self.events.send(RoomEvent::ParticipantJoined {
                identity: identity.to_string(),
            });
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn connect(&self, _url: &str, _credential: &SecretString) -> Result<(), TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail {
                Err(TransportError::ConnectFailed("refused".to_string()))
            } else {
                Ok(())
            }
        }

        async fn disconnect(&self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }

        fn remote_participants(&self) -> Vec<RemoteParticipant> {
            self.participants.lock().unwrap().clone()
        }

        fn local_publications(&self) -> Vec<TrackPublication> {
            Vec::new()
        }

        async fn publish_track(&self, _track: LocalTrack) -> Result<TrackPublication, TransportError> {
            Err(TransportError::NotConnected)
        }

        async fn unpublish_track(&self, sid: &str) -> Result<(), TransportError> {
            Err(TransportError::TrackNotFound(sid.to_string()))
        }

        fn events(&self) -> broadcast::Receiver<RoomEvent> {
            self.events.subscribe()
        }
    }

    fn credential() -> SecretString {
        SecretString::from("test-credential")
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let transport = GatedTransport::new(false);
        let session = Arc::new(RoomSession::new(transport.clone(), "ws://localhost:7880"));

        let connecting = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.connect(&credential()).await })
        };

        let mut state = session.watch_state();
        state
            .wait_for(|s| *s == ConnectionState::Connecting)
            .await
            .unwrap();
        transport.gate.notify_one();

        connecting.await.unwrap().unwrap();
        assert!(session.is_connected());

        session.disconnect().await;
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(transport.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_connect_rejected() {
        let transport = GatedTransport::new(false);
        let session = Arc::new(RoomSession::new(transport.clone(), "ws://localhost:7880"));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.connect(&credential()).await })
        };
        session
            .watch_state()
            .wait_for(|s| *s == ConnectionState::Connecting)
            .await
            .unwrap();

        let second = session.connect(&credential()).await;
        assert_eq!(second, Err(SessionError::ConnectInProgress));

        transport.gate.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(transport.connects.load(Ordering::SeqCst), 1);

        // Connecting again while connected is a no-op.
        session.connect(&credential()).await.unwrap();
        assert_eq!(transport.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_connect_returns_to_disconnected() {
        let transport = GatedTransport::new(true);
        let session = RoomSession::new(transport.clone(), "ws://localhost:7880");
        transport.gate.notify_one();

        let result = session.connect(&credential()).await;

        assert_eq!(
            result,
            Err(SessionError::Transport(TransportError::ConnectFailed(
                "refused".to_string()
            )))
        );
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let transport = GatedTransport::new(false);
        let session = RoomSession::new(transport.clone(), "ws://localhost:7880");

        session.disconnect().await;
        session.disconnect().await;

        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(transport.disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnect_while_connecting_aborts() {
        let transport = GatedTransport::new(false);
        let session = Arc::new(RoomSession::new(transport.clone(), "ws://localhost:7880"));

        let connecting = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.connect(&credential()).await })
        };
        session
            .watch_state()
            .wait_for(|s| *s == ConnectionState::Connecting)
            .await
            .unwrap();

        session.disconnect().await;
        transport.gate.notify_one();

        assert_eq!(connecting.await.unwrap(), Err(SessionError::Aborted));
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_disconnect_right_after_connected_stops_roster() {
        for _ in 0..25 {
            let transport = GatedTransport::new(false);
            transport.add_participant("viewer-1");
            transport.gate.notify_one();
            let session = Arc::new(RoomSession::new(transport.clone(), "ws://localhost:7880"));

            let mut state = session.watch_state();
            let disconnecting = {
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    state
                        .wait_for(|s| *s == ConnectionState::Connected)
                        .await
                        .unwrap();
                    session.disconnect().await;
                })
            };

            session.connect(&credential()).await.unwrap();
            disconnecting.await.unwrap();

            assert_eq!(session.state(), ConnectionState::Disconnected);
            assert_eq!(session.participant_count(), 0);

            // No roster task survives to recount on later events.
            transport.add_participant("viewer-2");
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(session.participant_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_participant_count_follows_roster() {
        let transport = GatedTransport::new(false);
        let session = RoomSession::new(transport.clone(), "ws://localhost:7880");
        transport.gate.notify_one();
        session.connect(&credential()).await.unwrap();
        assert_eq!(session.participant_count(), 0);

        let mut count = session.watch_participant_count();
        transport.add_participant("viewer-1");
        transport.add_participant("viewer-2");

        tokio::time::timeout(Duration::from_secs(5), count.wait_for(|c| *c == 2))
            .await
            .expect("participant count should reach 2")
            .unwrap();

        session.disconnect().await;
        assert_eq!(session.participant_count(), 0);
    }
}
