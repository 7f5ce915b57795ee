//! Screen-capture seam.

use crate::errors::CaptureError;
use crate::transport::LocalTrack;
use async_trait::async_trait;

/// What to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub video: bool,
    pub audio: bool,
}

impl CaptureOptions {
    /// Screen video without system audio.
    pub fn screen_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// Platform screen capture (enables mocking).
///
/// `capture` may wait indefinitely on a permission prompt.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture(&self, options: CaptureOptions) -> Result<Vec<LocalTrack>, CaptureError>;
}
