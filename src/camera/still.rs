use super::interface::{CameraSource, StreamRequest, VideoStream};
use crate::error::CameraError;
use crate::frame::Frame;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, info};

/// Camera source that presents one image file as a live stream
///
/// Useful for bench-testing a station without camera hardware: point it at a
/// printed label photo and every tick sees the same frame.
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CameraSource for StillImageCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        let device = self.path.display().to_string();

        if !self.path.exists() {
            return Err(CameraError::DeviceNotFound { device });
        }

        debug!(
            "Opening still image {} (requested {:?} {}x{})",
            device, request.facing, request.resolution.0, request.resolution.1
        );

        let path = self.path.clone();
        let image = tokio::task::spawn_blocking(move || image::open(path))
            .await
            .map_err(|e| CameraError::DeviceOpen {
                device: device.clone(),
                details: e.to_string(),
            })?
            .map_err(|e| CameraError::DeviceOpen {
                device: device.clone(),
                details: e.to_string(),
            })?;

        let frame = Frame::from_image(0, &image);
        info!(
            "Still image stream ready: {} ({}x{})",
            device, frame.width, frame.height
        );

        Ok(Box::new(StillImageStream {
            label: device,
            frame,
            frame_counter: AtomicU64::new(0),
            stopped: false,
        }))
    }
}

struct StillImageStream {
    label: String,
    frame: Frame,
    frame_counter: AtomicU64,
    stopped: bool,
}

impl VideoStream for StillImageStream {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn has_enough_data(&self) -> bool {
        !self.stopped
    }

    fn current_frame(&self) -> Option<Frame> {
        if self.stopped {
            return None;
        }

        let mut frame = self.frame.clone();
        frame.id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        frame.timestamp = SystemTime::now();
        Some(frame)
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            debug!("Still image stream {} stopped", self.label);
            self.stopped = true;
        }
    }
}
