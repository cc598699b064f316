use crate::error::EventBusError;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Events that can occur at a scan station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Operator asked to start the camera
    StartRequested { timestamp: SystemTime },
    /// Operator asked to stop the camera
    StopRequested { timestamp: SystemTime },
    /// Camera stream acquired and polling started
    CameraStarted {
        session_id: String,
        stream: String,
        timestamp: SystemTime,
    },
    /// Camera stream released and polling stopped
    CameraStopped {
        session_id: Option<String>,
        timestamp: SystemTime,
    },
    /// Camera could not be acquired
    CameraFailed { error: String, timestamp: SystemTime },
    /// A code passed the debounce filter and is being submitted
    CodeAccepted { code: String, timestamp: SystemTime },
    /// A repeated code was dropped inside the debounce window
    CodeDebounced { code: String, timestamp: SystemTime },
    /// The server answered a submission
    SubmissionCompleted { code: String, success: bool },
    /// A submission failed before a usable reply arrived
    SubmissionFailed { code: String, error: String },
    /// Station shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl ScanEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            ScanEvent::StartRequested { .. } => "Camera start requested".to_string(),
            ScanEvent::StopRequested { .. } => "Camera stop requested".to_string(),
            ScanEvent::CameraStarted {
                session_id, stream, ..
            } => format!("Camera started on {} (session {})", stream, session_id),
            ScanEvent::CameraStopped { session_id, .. } => match session_id {
                Some(id) => format!("Camera stopped (session {})", id),
                None => "Camera stopped".to_string(),
            },
            ScanEvent::CameraFailed { error, .. } => format!("Camera failed: {}", error),
            ScanEvent::CodeAccepted { code, .. } => format!("Code accepted: {}", code),
            ScanEvent::CodeDebounced { code, .. } => format!("Code debounced: {}", code),
            ScanEvent::SubmissionCompleted { code, success } => {
                format!(
                    "Submission of {} completed ({})",
                    code,
                    if *success { "success" } else { "rejected" }
                )
            }
            ScanEvent::SubmissionFailed { code, error } => {
                format!("Submission of {} failed: {}", code, error)
            }
            ScanEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            ScanEvent::StartRequested { .. } => "start_requested",
            ScanEvent::StopRequested { .. } => "stop_requested",
            ScanEvent::CameraStarted { .. } => "camera_started",
            ScanEvent::CameraStopped { .. } => "camera_stopped",
            ScanEvent::CameraFailed { .. } => "camera_failed",
            ScanEvent::CodeAccepted { .. } => "code_accepted",
            ScanEvent::CodeDebounced { .. } => "code_debounced",
            ScanEvent::SubmissionCompleted { .. } => "submission_completed",
            ScanEvent::SubmissionFailed { .. } => "submission_failed",
            ScanEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Event bus for component coordination using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ScanEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter
    pub fn subscribe_filtered<S: Into<String>>(&self, filter: EventFilter, name: S) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), filter, name.into())
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ScanEvent) -> Result<usize, EventBusError> {
        match &event {
            ScanEvent::CameraFailed { error, .. } => warn!("Camera failed: {}", error),
            ScanEvent::ShutdownRequested { reason, .. } => info!("Shutdown requested: {}", reason),
            _ => debug!("Publishing event: {}", event.description()),
        }

        self.sender
            .send(event)
            .map_err(|_| EventBusError::NoSubscribers)
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &ScanEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<ScanEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(receiver: broadcast::Receiver<ScanEvent>, filter: EventFilter, name: String) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<ScanEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!("Receiver '{}' received event: {}", self.name, event.description());
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, skipped);
                    return Err(EventBusError::Lagged { skipped });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::Closed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();

        let delivered = bus
            .publish(ScanEvent::CodeAccepted {
                code: "ITEM-1".to_string(),
                timestamp: SystemTime::now(),
            })
            .unwrap();
        assert_eq!(delivered, 1);

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "code_accepted");
        assert_eq!(event.description(), "Code accepted: ITEM-1");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(10);
        let result = bus.publish(ScanEvent::StartRequested {
            timestamp: SystemTime::now(),
        });
        assert!(matches!(result, Err(EventBusError::NoSubscribers)));
    }

    #[tokio::test]
    async fn test_filtered_receiver_skips_other_events() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe_filtered(
            EventFilter::EventTypes(vec!["stop_requested"]),
            "test",
        );

        bus.publish(ScanEvent::StartRequested {
            timestamp: SystemTime::now(),
        })
        .unwrap();
        bus.publish(ScanEvent::StopRequested {
            timestamp: SystemTime::now(),
        })
        .unwrap();

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "stop_requested");
    }

    #[tokio::test]
    async fn test_lagged_receiver_reports_skipped_events() {
        let bus = EventBus::new(2);
        let mut receiver = bus.subscribe_filtered(EventFilter::All, "slow");

        for i in 0..5 {
            bus.publish(ScanEvent::CodeDebounced {
                code: format!("ITEM-{}", i),
                timestamp: SystemTime::now(),
            })
            .unwrap();
        }

        assert!(matches!(
            receiver.recv().await,
            Err(EventBusError::Lagged { .. })
        ));
    }

    #[test]
    fn test_event_filter() {
        let event = ScanEvent::SubmissionCompleted {
            code: "ITEM-2".to_string(),
            success: true,
        };

        assert!(EventFilter::All.matches(&event));
        assert!(EventFilter::EventTypes(vec!["submission_completed"]).matches(&event));
        assert!(!EventFilter::EventTypes(vec!["code_accepted"]).matches(&event));
    }
}
