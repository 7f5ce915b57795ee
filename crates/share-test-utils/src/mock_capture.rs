//! Scripted screen capture.

use async_trait::async_trait;
use share_client::capture::{CaptureOptions, ScreenCapture};
use share_client::errors::CaptureError;
use share_client::transport::{LocalTrack, TrackKind, TrackSource};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Screen-share video track with the given id.
pub fn screen_track(id: &str) -> LocalTrack {
    LocalTrack {
        id: id.to_string(),
        kind: TrackKind::Video,
        source: TrackSource::ScreenShare,
    }
}

/// Camera video track with the given id.
pub fn camera_track(id: &str) -> LocalTrack {
    LocalTrack {
        id: id.to_string(),
        kind: TrackKind::Video,
        source: TrackSource::Camera,
    }
}

/// Capture that plays back queued results, then a fallback result.
///
/// # Example
/// ```rust,ignore
/// // Denied once, then succeeds with one track.
/// let capture = ScriptedCapture::returning(vec![screen_track("s1")])
///     .then(Err(CaptureError::PermissionDenied("NotAllowedError".into())));
/// ```
pub struct ScriptedCapture {
    queued: Mutex<VecDeque<Result<Vec<LocalTrack>, CaptureError>>>,
    fallback: Result<Vec<LocalTrack>, CaptureError>,
    requests: Mutex<Vec<CaptureOptions>>,
}

impl ScriptedCapture {
    /// Always return `tracks` unless a queued result is pending.
    pub fn returning(tracks: Vec<LocalTrack>) -> Self {
        Self::with_fallback(Ok(tracks))
    }

    /// Always deny, as if the user dismissed the permission prompt.
    pub fn denied() -> Self {
        Self::with_fallback(Err(CaptureError::PermissionDenied(
            "Permission denied by user".to_string(),
        )))
    }

    fn with_fallback(fallback: Result<Vec<LocalTrack>, CaptureError>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-shot result served before the fallback.
    pub fn then(self, result: Result<Vec<LocalTrack>, CaptureError>) -> Self {
        self.queued.lock().unwrap().push_back(result);
        self
    }

    /// Options of every capture request so far.
    pub fn requests(&self) -> Vec<CaptureOptions> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScreenCapture for ScriptedCapture {
    async fn capture(&self, options: CaptureOptions) -> Result<Vec<LocalTrack>, CaptureError> {
        self.requests.lock().unwrap().push(options);
        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_results_come_first() {
        let capture = ScriptedCapture::returning(vec![screen_track("s1")])
            .then(Err(CaptureError::NoTracks));

        let first = capture.capture(CaptureOptions::screen_only()).await;
        let second = capture.capture(CaptureOptions::screen_only()).await;

        assert_eq!(first, Err(CaptureError::NoTracks));
        assert_eq!(second, Ok(vec![screen_track("s1")]));
        assert_eq!(capture.requests().len(), 2);
    }
}
