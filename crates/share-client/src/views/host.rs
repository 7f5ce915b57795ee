//! Host view: capture the screen and publish it to the room.
//!
//! ```text
//! Idle --start_sharing--> Connecting --published >= 1--> Sharing --stop_sharing--> Idle
//!                             |
//!                             +--- any failure (banner set) ---> Idle
//! ```
//!
//! Failures never leave the view stuck: the banner is set, the state goes
//! back to `Idle`, and the user can retry.

use crate::capture::{CaptureOptions, ScreenCapture};
use crate::context::AppContext;
use crate::errors::{CaptureError, ShareError};
use crate::transport::TrackSource;
use common::types::Role;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Banner shown when starting a share fails.
pub const SHARE_ERROR_MESSAGE: &str = "Failed to start screen sharing. Please try again.";

/// Banner shown when the LAN address cannot be fetched.
pub const LOCAL_IP_ERROR_MESSAGE: &str =
    "Failed to get local IP address. Make sure the server is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Connecting,
    Sharing,
}

/// Everything the host UI renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    pub state: HostState,
    pub error: Option<String>,
    pub share_link: Option<String>,
}

pub struct HostView {
    ctx: Arc<AppContext>,
    capture: Arc<dyn ScreenCapture>,
    status: watch::Sender<HostStatus>,
}

impl HostView {
    pub fn new(ctx: Arc<AppContext>, capture: Arc<dyn ScreenCapture>) -> Self {
        let (status, _) = watch::channel(HostStatus {
            state: HostState::Idle,
            error: None,
            share_link: None,
        });
        Self {
            ctx,
            capture,
            status,
        }
    }

    /// Fetch the LAN address and build the link viewers open.
    #[instrument(skip_all, name = "share.host.load_share_link")]
    pub async fn load_share_link(&self) -> Result<String, ShareError> {
        match self.ctx.credentials().fetch_local_ip().await {
            Ok(ip) => {
                let link = self.ctx.config().share_link(&ip);
                info!(target: "share.views.host", link = %link, "Share link ready");
                self.status
                    .send_modify(|status| status.share_link = Some(link.clone()));
                Ok(link)
            }
            Err(e) => {
                warn!(target: "share.views.host", error = %e, "Failed to get local IP");
                self.status
                    .send_modify(|status| status.error = Some(LOCAL_IP_ERROR_MESSAGE.to_string()));
                Err(e)
            }
        }
    }

    /// Connect if needed, capture the screen and publish every track.
    ///
    /// Returns `Ok` immediately when already sharing, and
    /// [`ShareError::Busy`] while another start is in flight.
    #[instrument(skip_all, name = "share.host.start_sharing")]
    pub async fn start_sharing(&self) -> Result<(), ShareError> {
        let mut observed = HostState::Idle;
        self.status.send_if_modified(|status| {
            observed = status.state;
            if status.state == HostState::Idle {
                status.state = HostState::Connecting;
                status.error = None;
                true
            } else {
                false
            }
        });

        match observed {
            HostState::Sharing => return Ok(()),
            HostState::Connecting => return Err(ShareError::Busy),
            HostState::Idle => {}
        }

        match self.publish_screen().await {
            Ok(published) => {
                info!(target: "share.views.host", tracks = published, "Screen sharing started");
                self.status
                    .send_modify(|status| status.state = HostState::Sharing);
                Ok(())
            }
            Err(e) => {
                warn!(
                    target: "share.views.host",
                    error = %e,
                    kind = e.kind(),
                    "Failed to start screen sharing"
                );
                self.status.send_modify(|status| {
                    status.state = HostState::Idle;
                    status.error = Some(SHARE_ERROR_MESSAGE.to_string());
                });
                Err(e)
            }
        }
    }

    /// Unpublish every local screen-share track and return to `Idle`.
    ///
    /// Safe with no session or no publications. Returns the number of
    /// tracks unpublished.
    #[instrument(skip_all, name = "share.host.stop_sharing")]
    pub async fn stop_sharing(&self) -> Result<usize, ShareError> {
        if self.state() == HostState::Connecting {
            return Err(ShareError::Busy);
        }

        let transport = self.ctx.session().transport();
        let mut unpublished = 0;

        for publication in transport
            .local_publications()
            .into_iter()
            .filter(|publication| publication.source == TrackSource::ScreenShare)
        {
            match transport.unpublish_track(&publication.sid).await {
                Ok(()) => unpublished += 1,
                Err(e) => {
                    warn!(
                        target: "share.views.host",
                        error = %e,
                        sid = %publication.sid,
                        "Failed to unpublish track"
                    );
                }
            }
        }

        self.status
            .send_modify(|status| status.state = HostState::Idle);
        info!(target: "share.views.host", tracks = unpublished, "Screen sharing stopped");
        Ok(unpublished)
    }

    pub fn state(&self) -> HostState {
        self.status.borrow().state
    }

    /// Current banner text, if any.
    pub fn error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }

    pub fn share_link(&self) -> Option<String> {
        self.status.borrow().share_link.clone()
    }

    /// Number of other participants in the room.
    pub fn viewer_count(&self) -> usize {
        self.ctx.session().participant_count()
    }

    pub fn watch(&self) -> watch::Receiver<HostStatus> {
        self.status.subscribe()
    }

    async fn publish_screen(&self) -> Result<usize, ShareError> {
        self.ctx.ensure_connected(Role::Host).await?;

        let tracks = self.capture.capture(CaptureOptions::screen_only()).await?;
        if tracks.is_empty() {
            return Err(CaptureError::NoTracks.into());
        }

        let transport = self.ctx.session().transport();
        let mut published = 0;
        let mut last_error = None;

        for track in tracks {
            let track_id = track.id.clone();
            match transport.publish_track(track).await {
                Ok(publication) => {
                    debug!(
                        target: "share.views.host",
                        sid = %publication.sid,
                        track_id = %track_id,
                        "Published track"
                    );
                    published += 1;
                }
                Err(e) => {
                    warn!(target: "share.views.host", error = %e, track_id = %track_id, "Failed to publish track");
                    last_error = Some(e);
                }
            }
        }

        match (published, last_error) {
            (0, Some(e)) => Err(e.into()),
            (0, None) => Err(CaptureError::NoTracks.into()),
            (n, _) => Ok(n),
        }
    }
}
