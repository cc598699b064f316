use super::types::{ComponentState, ShutdownReason};
use crate::camera::CameraSourceBuilder;
use crate::config::ScanLoopConfig;
use crate::detector::{BarcodeDetector, ImageBarcodeDetector};
use crate::display::TerminalDisplay;
use crate::error::Result;
use crate::events::EventBus;
use crate::keyboard_input::KeyboardInputHandler;
use crate::remote::HttpScanClient;
use crate::scanner::{ScanLoopController, ScanLoopControllerBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Scan station coordinator: owns the controller and routes operator commands to it
pub struct ScanLoopApp {
    pub(super) config: ScanLoopConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) controller: Arc<ScanLoopController>,

    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) keyboard_enabled: bool,
    pub(super) autostart: bool,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl ScanLoopApp {
    /// Build the station from configuration with the real camera, detector and HTTP client
    pub async fn new(config: ScanLoopConfig) -> Result<Self> {
        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));

        let camera = CameraSourceBuilder::new()
            .config(config.camera.clone())
            .build()?;

        let detector: Option<Arc<dyn BarcodeDetector>> =
            match ImageBarcodeDetector::new(&config.scanner.formats) {
                Ok(detector) => Some(Arc::new(detector)),
                Err(e) => {
                    warn!("Barcode detector unavailable: {}", e);
                    None
                }
            };

        let client = HttpScanClient::from_config(&config)?;
        info!("Submitting scans to {}", client.endpoint());

        let controller = ScanLoopControllerBuilder::new()
            .config(config.clone())
            .camera(camera)
            .maybe_detector(detector)
            .client(Arc::new(client))
            .display(Arc::new(TerminalDisplay::new()))
            .event_bus(Arc::clone(&event_bus))
            .build()?;

        Ok(Self::with_controller(config, controller, event_bus))
    }

    /// Wrap an already built controller
    pub fn with_controller(
        config: ScanLoopConfig,
        controller: ScanLoopController,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();
        let keyboard_handler = Some(KeyboardInputHandler::new(Arc::clone(&event_bus)));

        Self {
            config,
            event_bus,
            controller: Arc::new(controller),
            keyboard_handler,
            keyboard_enabled: false,
            autostart: false,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Enable or disable the keyboard input handler
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    /// Start the camera as soon as the station is up
    pub fn set_autostart(&mut self, autostart: bool) {
        self.autostart = autostart;
    }

    pub fn controller(&self) -> Arc<ScanLoopController> {
        Arc::clone(&self.controller)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn config(&self) -> &ScanLoopConfig {
        &self.config
    }
}
