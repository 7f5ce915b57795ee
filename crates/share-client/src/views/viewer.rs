//! Viewer view: render the host's screen-share track.
//!
//! On mount the view joins the room (if needed), subscribes to room events,
//! then scans participants already present for a screen-share track. The
//! event subscription is taken before the scan so a track published in
//! between is still seen.
//!
//! A removed track clears the surface only when it is the track currently
//! rendered; removals of unrelated tracks are ignored.

use crate::context::AppContext;
use crate::errors::ShareError;
use crate::surface::VideoSurface;
use crate::transport::{RemoteTrack, RoomEvent, TrackSource, Transport};
use common::types::Role;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Banner shown when joining the stream fails.
pub const CONNECT_ERROR_MESSAGE: &str = "Failed to connect to the stream. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    Connecting,
    /// Connected, no screen-share track yet.
    Waiting,
    Rendering { track_sid: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerStatus {
    pub state: ViewerState,
    pub error: Option<String>,
}

struct EventTask {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct ViewerView {
    ctx: Arc<AppContext>,
    surface: Arc<dyn VideoSurface>,
    status: Arc<watch::Sender<ViewerStatus>>,
    event_task: Mutex<Option<EventTask>>,
}

impl ViewerView {
    pub fn new(ctx: Arc<AppContext>, surface: Arc<dyn VideoSurface>) -> Self {
        let (status, _) = watch::channel(ViewerStatus {
            state: ViewerState::Connecting,
            error: None,
        });
        Self {
            ctx,
            surface,
            status: Arc::new(status),
            event_task: Mutex::new(None),
        }
    }

    /// Join the room as a viewer and start rendering.
    ///
    /// Mounting an already mounted view is a no-op.
    #[instrument(skip_all, name = "share.viewer.mount")]
    pub async fn mount(&self) -> Result<(), ShareError> {
        let mut event_task = self.event_task.lock().await;
        if event_task.is_some() {
            debug!(target: "share.views.viewer", "Already mounted");
            return Ok(());
        }

        self.status.send_replace(ViewerStatus {
            state: ViewerState::Connecting,
            error: None,
        });

        if let Err(e) = self.ctx.ensure_connected(Role::Viewer).await {
            warn!(
                target: "share.views.viewer",
                error = %e,
                kind = e.kind(),
                "Failed to connect to the stream"
            );
            self.status
                .send_modify(|status| status.error = Some(CONNECT_ERROR_MESSAGE.to_string()));
            return Err(e);
        }

        let events = self.ctx.session().events();
        self.status
            .send_modify(|status| status.state = ViewerState::Waiting);

        let renderer = Renderer {
            transport: Arc::clone(self.ctx.session().transport()),
            surface: Arc::clone(&self.surface),
            status: Arc::clone(&self.status),
        };
        renderer.scan_existing().await;

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(renderer.run(events, cancel_token.clone()));
        *event_task = Some(EventTask {
            cancel_token,
            handle,
        });

        info!(target: "share.views.viewer", state = ?self.state(), "Viewer mounted");
        Ok(())
    }

    /// Stop reacting to room events and blank the surface.
    ///
    /// The room session stays open for a later remount.
    #[instrument(skip_all, name = "share.viewer.unmount")]
    pub async fn unmount(&self) {
        if let Some(task) = self.event_task.lock().await.take() {
            task.cancel_token.cancel();
            if let Err(e) = task.handle.await {
                warn!(target: "share.views.viewer", error = %e, "Event task ended abnormally");
            }
        }

        self.surface.clear();
        self.status.send_replace(ViewerStatus {
            state: ViewerState::Connecting,
            error: None,
        });
        debug!(target: "share.views.viewer", "Viewer unmounted");
    }

    pub fn state(&self) -> ViewerState {
        self.status.borrow().state.clone()
    }

    /// Current banner text, if any.
    pub fn error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }

    pub fn watch(&self) -> watch::Receiver<ViewerStatus> {
        self.status.subscribe()
    }
}

impl Drop for ViewerView {
    fn drop(&mut self) {
        if let Some(task) = self.event_task.get_mut().take() {
            task.cancel_token.cancel();
            task.handle.abort();
        }
    }
}

/// State shared between the mount path and the event task.
struct Renderer {
    transport: Arc<dyn Transport>,
    surface: Arc<dyn VideoSurface>,
    status: Arc<watch::Sender<ViewerStatus>>,
}

impl Renderer {
    async fn run(self, mut events: broadcast::Receiver<RoomEvent>, cancel_token: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel_token.cancelled() => break,

                event = events.recv() => match event {
                    Ok(RoomEvent::TrackAdded(track)) => self.on_track_added(track).await,
                    Ok(RoomEvent::TrackRemoved(track)) => self.on_track_removed(&track).await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "share.views.viewer", skipped, "Viewer lagged behind room events");
                        if !self.is_rendering() {
                            self.scan_existing().await;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }

        debug!(target: "share.views.viewer", "Event task stopped");
    }

    /// Attach the first screen-share track of a participant already present.
    async fn scan_existing(&self) {
        let existing = self
            .transport
            .remote_participants()
            .iter()
            .find_map(|participant| participant.screen_share_track().cloned());

        match existing {
            Some(track) => {
                debug!(
                    target: "share.views.viewer",
                    sid = %track.sid,
                    "Found screen share already in progress"
                );
                self.render(track).await;
            }
            None => debug!(target: "share.views.viewer", "No screen share yet"),
        }
    }

    async fn on_track_added(&self, track: RemoteTrack) {
        if track.source != TrackSource::ScreenShare {
            debug!(
                target: "share.views.viewer",
                sid = %track.sid,
                source = ?track.source,
                "Ignoring non screen-share track"
            );
            return;
        }
        self.render(track).await;
    }

    /// Clear the rendered track when it goes away, then pick up any other
    /// screen share still in the room.
    async fn on_track_removed(&self, track: &RemoteTrack) {
        let attached = matches!(
            &self.status.borrow().state,
            ViewerState::Rendering { track_sid } if *track_sid == track.sid
        );

        if !attached {
            debug!(
                target: "share.views.viewer",
                sid = %track.sid,
                "Ignoring removal of a track that is not rendered"
            );
            return;
        }

        self.surface.clear();
        self.status
            .send_modify(|status| status.state = ViewerState::Waiting);
        info!(target: "share.views.viewer", sid = %track.sid, "Screen share ended");

        self.scan_existing().await;
    }

    async fn render(&self, track: RemoteTrack) {
        self.surface.attach(&track);
        self.status.send_modify(|status| {
            status.state = ViewerState::Rendering {
                track_sid: track.sid.clone(),
            }
        });

        // Playback failures are not fatal; the track stays attached.
        if let Err(e) = self.surface.play().await {
            warn!(target: "share.views.viewer", error = %e, sid = %track.sid, "Failed to start playback");
        }

        info!(
            target: "share.views.viewer",
            sid = %track.sid,
            publisher = %track.participant_identity,
            "Rendering screen share"
        );
    }

    fn is_rendering(&self) -> bool {
        matches!(self.status.borrow().state, ViewerState::Rendering { .. })
    }
}
