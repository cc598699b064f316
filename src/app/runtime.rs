use super::{ScanLoopApp, ShutdownReason};
use crate::error::{EventBusError, Result, ScanLoopError};
use crate::events::{EventFilter, ScanEvent};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info, warn};

type SharedShutdownSender = Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>;

impl ScanLoopApp {
    /// Run the main application loop with signal handling
    pub async fn run(&mut self) -> Result<i32> {
        info!("Scan station is running");

        let shutdown_sender = self
            .shutdown_sender
            .take()
            .ok_or_else(|| ScanLoopError::system("Shutdown sender already taken"))?;

        let mut shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| ScanLoopError::system("Shutdown receiver already taken"))?;

        self.setup_signal_handlers(Arc::new(Mutex::new(Some(shutdown_sender))));

        let mut commands = self.event_bus.subscribe_filtered(
            EventFilter::EventTypes(vec![
                "start_requested",
                "stop_requested",
                "shutdown_requested",
            ]),
            "station",
        );

        let shutdown_reason = loop {
            tokio::select! {
                reason = &mut shutdown_receiver => {
                    break reason.map_err(|_| {
                        ScanLoopError::system("Shutdown channel closed unexpectedly")
                    })?;
                }
                event = commands.recv() => match event {
                    Ok(ScanEvent::StartRequested { .. }) => self.start_scanner().await,
                    Ok(ScanEvent::StopRequested { .. }) => self.stop_scanner().await,
                    Ok(ScanEvent::ShutdownRequested { reason, .. }) => {
                        break ShutdownReason::UserRequest(reason);
                    }
                    Ok(_) => {}
                    Err(EventBusError::Lagged { skipped }) => {
                        warn!("Dropped {} operator commands", skipped);
                    }
                    Err(e) => {
                        error!("Command channel failed: {}", e);
                        break ShutdownReason::Error(e.to_string());
                    }
                },
            }
        };

        info!("Shutdown initiated: {:?}", shutdown_reason);

        let exit_code = self.shutdown().await?;

        info!("Scan station shutdown complete");
        Ok(exit_code)
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(&self, shutdown_sender: SharedShutdownSender) {
        // SIGTERM (systemd stop)
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };

                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        // SIGINT (Ctrl+C)
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}
