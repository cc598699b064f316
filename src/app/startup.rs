use super::{ComponentState, ScanLoopApp};
use crate::error::Result;
use tracing::{error, info, warn};

impl ScanLoopApp {
    /// Register components and run the detector capability check
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing scan station components");

        {
            let mut states = self.component_states.lock().await;
            states.insert("scanner".to_string(), ComponentState::Stopped);
            if self.keyboard_enabled {
                states.insert("keyboard".to_string(), ComponentState::Stopped);
            }
        }

        if self.controller.initialize().await {
            info!("Barcode scanning available");
        } else {
            warn!("Barcode scanning unavailable, start is disabled");
        }

        Ok(())
    }

    /// Start keyboard input and, if requested, the camera
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting scan station");

        if self.keyboard_enabled {
            if let Some(keyboard_handler) = &self.keyboard_handler {
                self.set_component_state("keyboard", ComponentState::Starting)
                    .await;
                keyboard_handler.start().await?;
                self.set_component_state("keyboard", ComponentState::Running)
                    .await;
            }
        }

        if self.autostart {
            self.start_scanner().await;
        }

        info!("Scan station started");
        Ok(())
    }

    /// Start the camera; failures stay on the display and are not fatal
    pub(super) async fn start_scanner(&self) {
        self.set_component_state("scanner", ComponentState::Starting)
            .await;

        match self.controller.start().await {
            Ok(()) if self.controller.is_camera_active() => {
                self.set_component_state("scanner", ComponentState::Running)
                    .await;
            }
            Ok(()) => {
                self.set_component_state("scanner", ComponentState::Stopped)
                    .await;
            }
            Err(e) => {
                error!("Failed to start scanner: {}", e);
                self.set_component_state("scanner", ComponentState::Failed)
                    .await;
            }
        }
    }

    pub(super) async fn stop_scanner(&self) {
        self.set_component_state("scanner", ComponentState::Stopping)
            .await;
        self.controller.stop().await;
        self.set_component_state("scanner", ComponentState::Stopped)
            .await;
    }
}
