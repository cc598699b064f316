use super::interface::{CameraSource, StreamRequest, VideoStream};
use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::frame::{unpad_rows, Frame, FrameFormat};
use async_trait::async_trait;
use gstreamer::prelude::*;
use gstreamer::Pipeline;
use gstreamer_app::AppSink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

/// GStreamer V4L2 camera source producing luma frames
pub struct V4l2Camera {
    config: CameraConfig,
}

impl V4l2Camera {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        gstreamer::init().map_err(|e| CameraError::Configuration {
            details: format!("Failed to initialize GStreamer: {}", e),
        })?;

        Ok(Self { config })
    }

    /// Build GStreamer pipeline string for GRAY8 capture
    fn build_pipeline_string(device_index: u32, request: &StreamRequest) -> String {
        let (width, height) = request.resolution;

        format!(
            "v4l2src device=/dev/video{} io-mode=mmap do-timestamp=true ! \
             videoconvert ! videoscale ! \
             video/x-raw,format=GRAY8,width={},height={},framerate={}/1 ! \
             appsink name=sink sync=false max-buffers=1 drop=true emit-signals=false",
            device_index, width, height, request.fps
        )
    }
}

#[async_trait]
impl CameraSource for V4l2Camera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        let device_index = self.config.device_for(request.facing);
        let device = format!("/dev/video{}", device_index);

        if !std::path::Path::new(&device).exists() {
            return Err(CameraError::DeviceNotFound { device });
        }

        let pipeline_desc = Self::build_pipeline_string(device_index, request);
        info!("Creating GStreamer pipeline: {}", pipeline_desc);

        let pipeline = gstreamer::parse::launch(&pipeline_desc)
            .map_err(|e| CameraError::Configuration {
                details: format!("Failed to create pipeline: {}", e),
            })?
            .downcast::<Pipeline>()
            .map_err(|_| CameraError::Configuration {
                details: "Failed to downcast to Pipeline".to_string(),
            })?;

        let appsink = pipeline
            .by_name("sink")
            .and_then(|element| element.downcast::<AppSink>().ok())
            .ok_or_else(|| CameraError::Configuration {
                details: "Pipeline has no appsink".to_string(),
            })?;

        let start_pipeline = pipeline.clone();
        let started = tokio::task::spawn_blocking(move || {
            start_pipeline.set_state(gstreamer::State::Playing)?;
            let (result, _, _) = start_pipeline.state(gstreamer::ClockTime::from_seconds(5));
            result.map(|_| ())
        })
        .await
        .map_err(|e| CameraError::DeviceOpen {
            device: device.clone(),
            details: e.to_string(),
        })?;

        if let Err(e) = started {
            let _ = pipeline.set_state(gstreamer::State::Null);
            let details = e.to_string();
            return Err(if details.to_lowercase().contains("permission") {
                CameraError::PermissionDenied { device }
            } else {
                CameraError::DeviceOpen { device, details }
            });
        }

        info!("GStreamer pipeline started on {}", device);

        Ok(Box::new(V4l2Stream {
            label: device,
            pipeline: Some(pipeline),
            appsink,
            last_frame: Mutex::new(None),
            frame_counter: AtomicU64::new(0),
        }))
    }
}

struct V4l2Stream {
    label: String,
    pipeline: Option<Pipeline>,
    appsink: AppSink,
    last_frame: Mutex<Option<Frame>>,
    frame_counter: AtomicU64,
}

impl V4l2Stream {
    fn pull_frame(&self) -> Option<Frame> {
        let sample = self.appsink.try_pull_sample(gstreamer::ClockTime::ZERO)?;
        let buffer = sample.buffer()?;
        let structure = sample.caps()?.structure(0)?;
        let width = structure.get::<i32>("width").ok()? as u32;
        let height = structure.get::<i32>("height").ok()? as u32;
        let map = buffer.map_readable().ok()?;

        // Rows may be padded to a 4-byte stride
        let stride = map.len() / height.max(1) as usize;
        let Some(data) = unpad_rows(map.as_slice(), width as usize, height as usize, stride) else {
            debug!(
                "Dropping {}x{} sample with {} byte buffer",
                width,
                height,
                map.len()
            );
            return None;
        };

        let id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        trace!("Pulled GRAY8 frame {} ({}x{})", id, width, height);

        Some(Frame::new(
            id,
            SystemTime::now(),
            data,
            width,
            height,
            FrameFormat::Gray8,
        ))
    }
}

impl VideoStream for V4l2Stream {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn has_enough_data(&self) -> bool {
        match &self.pipeline {
            Some(pipeline) => pipeline.current_state() == gstreamer::State::Playing,
            None => false,
        }
    }

    fn current_frame(&self) -> Option<Frame> {
        self.pipeline.as_ref()?;

        let mut last_frame = self.last_frame.lock();
        if let Some(frame) = self.pull_frame() {
            *last_frame = Some(frame);
        }
        last_frame.clone()
    }

    fn stop_tracks(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            if let Err(e) = pipeline.set_state(gstreamer::State::Null) {
                warn!("Failed to stop GStreamer pipeline {}: {}", self.label, e);
            } else {
                debug!("GStreamer pipeline {} stopped", self.label);
            }
        }
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
