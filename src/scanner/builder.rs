use super::controller::{ControllerSettings, ScanLoopController};
use crate::camera::CameraSource;
use crate::config::ScanLoopConfig;
use crate::detector::BarcodeDetector;
use crate::display::ScanDisplay;
use crate::error::{Result, ScanLoopError};
use crate::events::EventBus;
use crate::remote::{RemoteStateUpdater, ScanClient};
use std::sync::Arc;

/// Builder for [`ScanLoopController`]
///
/// A controller built without a detector reports scanning as unsupported.
#[derive(Default)]
pub struct ScanLoopControllerBuilder {
    config: Option<ScanLoopConfig>,
    camera: Option<Arc<dyn CameraSource>>,
    detector: Option<Arc<dyn BarcodeDetector>>,
    client: Option<Arc<dyn ScanClient>>,
    display: Option<Arc<dyn ScanDisplay>>,
    event_bus: Option<Arc<EventBus>>,
}

impl ScanLoopControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ScanLoopConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn camera(mut self, camera: Arc<dyn CameraSource>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn detector(mut self, detector: Arc<dyn BarcodeDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Set the detector when one is available
    pub fn maybe_detector(mut self, detector: Option<Arc<dyn BarcodeDetector>>) -> Self {
        self.detector = detector;
        self
    }

    pub fn client(mut self, client: Arc<dyn ScanClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn display(mut self, display: Arc<dyn ScanDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<ScanLoopController> {
        let config = self
            .config
            .ok_or_else(|| ScanLoopError::system("Scan loop configuration must be specified"))?;
        config.validate()?;

        let camera = self
            .camera
            .ok_or_else(|| ScanLoopError::system("Camera source must be specified"))?;
        let client = self
            .client
            .ok_or_else(|| ScanLoopError::system("Scan client must be specified"))?;
        let display = self
            .display
            .ok_or_else(|| ScanLoopError::system("Display must be specified"))?;
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| Arc::new(EventBus::new(config.system.event_bus_capacity)));

        let updater = RemoteStateUpdater::new(client, Arc::clone(&display));

        Ok(ScanLoopController::new(
            ControllerSettings::from_config(&config),
            camera,
            self.detector,
            updater,
            display,
            event_bus,
        ))
    }
}
