//! Recording video surface.

use async_trait::async_trait;
use share_client::errors::PlaybackError;
use share_client::surface::VideoSurface;
use share_client::transport::RemoteTrack;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Attach(String),
    Play,
    Clear,
}

/// Surface that records every call and tracks the attached track sid.
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    attached: watch::Sender<Option<String>>,
    fail_playback: AtomicBool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        let (attached, _) = watch::channel(None);
        Self {
            calls: Mutex::new(Vec::new()),
            attached,
            fail_playback: AtomicBool::new(false),
        }
    }

    /// Surface whose `play` always fails, like a blocked autoplay.
    pub fn failing_playback() -> Self {
        let surface = Self::new();
        surface.fail_playback.store(true, Ordering::SeqCst);
        surface
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Sid of the attached track, if any.
    pub fn attached(&self) -> Option<String> {
        self.attached.borrow().clone()
    }

    /// Wait until some track is attached; `None` on timeout.
    pub async fn wait_for_attached(&self, timeout: Duration) -> Option<String> {
        let mut rx = self.attached.subscribe();
        let result = tokio::time::timeout(timeout, rx.wait_for(|sid| sid.is_some())).await;
        match result {
            Ok(Ok(sid)) => sid.clone(),
            _ => None,
        }
    }

    /// Wait until the track `sid` is attached; `false` on timeout.
    pub async fn wait_for_track(&self, sid: &str, timeout: Duration) -> bool {
        let mut rx = self.attached.subscribe();
        let result = tokio::time::timeout(
            timeout,
            rx.wait_for(|attached| attached.as_deref() == Some(sid)),
        )
        .await;
        matches!(result, Ok(Ok(_)))
    }

    /// Wait until the surface is blank; `false` on timeout.
    pub async fn wait_for_cleared(&self, timeout: Duration) -> bool {
        let mut rx = self.attached.subscribe();
        let result = tokio::time::timeout(timeout, rx.wait_for(|sid| sid.is_none())).await;
        matches!(result, Ok(Ok(_)))
    }
}

#[async_trait]
impl VideoSurface for RecordingSurface {
    fn attach(&self, track: &RemoteTrack) {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Attach(track.sid.clone()));
        self.attached.send_replace(Some(track.sid.clone()));
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        self.calls.lock().unwrap().push(SurfaceCall::Play);
        if self.fail_playback.load(Ordering::SeqCst) {
            return Err(PlaybackError("autoplay blocked".to_string()));
        }
        Ok(())
    }

    fn clear(&self) {
        self.calls.lock().unwrap().push(SurfaceCall::Clear);
        self.attached.send_replace(None);
    }
}
