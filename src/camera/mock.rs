use super::interface::{CameraSource, StreamRequest, VideoStream};
use crate::error::CameraError;
use crate::frame::{Frame, FrameFormat};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

#[derive(Default)]
struct MockCameraState {
    open_requests: AtomicU64,
    streams_opened: AtomicU64,
    tracks_stopped: AtomicU64,
    ready: AtomicBool,
    last_request: Mutex<Option<StreamRequest>>,
    failure: Mutex<Option<CameraError>>,
}

/// Camera source for testing without real hardware
///
/// Produces small blank luma frames and counts every acquisition and release.
pub struct MockCamera {
    state: Arc<MockCameraState>,
}

/// Observer for a [`MockCamera`] after it has been handed to a controller
#[derive(Clone)]
pub struct MockCameraHandle {
    state: Arc<MockCameraState>,
}

impl MockCamera {
    /// Create a mock camera whose streams are immediately ready
    pub fn new() -> (Self, MockCameraHandle) {
        let state = Arc::new(MockCameraState::default());
        state.ready.store(true, Ordering::SeqCst);
        (
            Self {
                state: Arc::clone(&state),
            },
            MockCameraHandle { state },
        )
    }
}

impl MockCameraHandle {
    /// Make the next `open` fail with the given error
    pub fn fail_next_open(&self, error: CameraError) {
        *self.state.failure.lock() = Some(error);
    }

    /// Control whether streams report enough data to sample
    pub fn set_ready(&self, ready: bool) {
        self.state.ready.store(ready, Ordering::SeqCst);
    }

    pub fn open_requests(&self) -> u64 {
        self.state.open_requests.load(Ordering::SeqCst)
    }

    pub fn streams_opened(&self) -> u64 {
        self.state.streams_opened.load(Ordering::SeqCst)
    }

    pub fn tracks_stopped(&self) -> u64 {
        self.state.tracks_stopped.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<StreamRequest> {
        self.state.last_request.lock().clone()
    }
}

#[async_trait]
impl CameraSource for MockCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        self.state.open_requests.fetch_add(1, Ordering::SeqCst);
        *self.state.last_request.lock() = Some(request.clone());

        if let Some(error) = self.state.failure.lock().take() {
            debug!("Mock camera refusing stream: {}", error);
            return Err(error);
        }

        let id = self.state.streams_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            label: format!("mock-{}", id),
            state: Arc::clone(&self.state),
            frame_counter: AtomicU64::new(0),
            stopped: false,
        }))
    }
}

struct MockStream {
    label: String,
    state: Arc<MockCameraState>,
    frame_counter: AtomicU64,
    stopped: bool,
}

impl VideoStream for MockStream {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn has_enough_data(&self) -> bool {
        !self.stopped && self.state.ready.load(Ordering::SeqCst)
    }

    fn current_frame(&self) -> Option<Frame> {
        if !self.has_enough_data() {
            return None;
        }

        let id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        Some(Frame::new(
            id,
            SystemTime::now(),
            vec![0x80; 16 * 16],
            16,
            16,
            FrameFormat::Gray8,
        ))
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.state.tracks_stopped.fetch_add(1, Ordering::SeqCst);
        }
    }
}
