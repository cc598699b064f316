use super::interface::CameraSource;
use super::still::StillImageCamera;
use crate::config::{CameraBackend, CameraConfig};
use crate::error::{Result, ScanLoopError};
use std::sync::Arc;

/// Builder that selects a camera source from configuration
pub struct CameraSourceBuilder {
    config: Option<CameraConfig>,
}

impl CameraSourceBuilder {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Arc<dyn CameraSource>> {
        let config = self
            .config
            .ok_or_else(|| ScanLoopError::system("Camera configuration must be specified"))?;

        match config.backend {
            CameraBackend::Still => {
                let path = config.still_image.clone().ok_or_else(|| {
                    ScanLoopError::system("Still camera backend requires an image path")
                })?;
                Ok(Arc::new(StillImageCamera::new(path)))
            }
            CameraBackend::V4l2 => Self::build_v4l2(config),
        }
    }

    #[cfg(all(target_os = "linux", feature = "camera"))]
    fn build_v4l2(config: CameraConfig) -> Result<Arc<dyn CameraSource>> {
        Ok(Arc::new(super::v4l2::V4l2Camera::new(config)?))
    }

    #[cfg(not(all(target_os = "linux", feature = "camera")))]
    fn build_v4l2(_config: CameraConfig) -> Result<Arc<dyn CameraSource>> {
        Err(ScanLoopError::component(
            "camera",
            "V4L2 capture requires Linux and the `camera` feature",
        ))
    }
}

impl Default for CameraSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
