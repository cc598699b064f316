use super::{ComponentState, ScanLoopApp};
use crate::error::{Result, ScanLoopError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

const COMPONENT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

impl ScanLoopApp {
    /// Perform graceful shutdown of all components
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        self.cancellation_token.cancel();

        let mut exit_code = 0;

        if self.keyboard_enabled {
            if let Err(e) = self.stop_component("keyboard").await {
                error!("Error stopping keyboard: {}", e);
                exit_code = 1;
            }
        }

        if let Err(e) = self.stop_component("scanner").await {
            error!("Error stopping scanner: {}", e);
            exit_code = 1;
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    /// Stop a specific component
    async fn stop_component(&self, component: &str) -> Result<()> {
        info!("Stopping {} component", component);
        self.set_component_state(component, ComponentState::Stopping)
            .await;

        let stopped = match component {
            "scanner" => timeout(COMPONENT_STOP_TIMEOUT, self.controller.stop())
                .await
                .map(|()| Ok(())),
            "keyboard" => match &self.keyboard_handler {
                Some(keyboard_handler) => {
                    timeout(COMPONENT_STOP_TIMEOUT, keyboard_handler.stop()).await
                }
                None => Ok(Ok(())),
            },
            _ => Ok(Ok(())),
        };

        match stopped {
            Ok(Ok(())) => {
                self.set_component_state(component, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", component);
                Ok(())
            }
            Ok(Err(e)) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("Error stopping {} component: {}", component, e);
                Err(e)
            }
            Err(_) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("{} component stop timeout", component);
                Err(ScanLoopError::system(format!(
                    "{} component stop timeout",
                    component
                )))
            }
        }
    }
}
