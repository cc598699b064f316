use crate::config::FacingMode;
use crate::error::CameraError;
use crate::frame::Frame;
use async_trait::async_trait;

/// Parameters for a stream request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    pub resolution: (u32, u32),
    pub fps: u32,
}

/// A live video stream handed out by a [`CameraSource`]
///
/// The stream is owned by exactly one scan session. `stop_tracks` must release
/// the underlying device and is called once when the session ends.
pub trait VideoStream: Send + Sync {
    /// Human-readable label for logs
    fn label(&self) -> String;

    /// Whether the stream is producing frames yet
    fn has_enough_data(&self) -> bool;

    /// Latest frame, if one is available
    fn current_frame(&self) -> Option<Frame>;

    /// Release all tracks held by this stream
    fn stop_tracks(&mut self);
}

/// Camera acquisition capability
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Request a stream, failing on permission or hardware problems
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError>;
}
