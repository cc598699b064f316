use serde::{Deserialize, Serialize};

/// Lifecycle of the scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    Idle,
    /// Camera request in flight
    Starting,
    /// Polling
    Active,
    Stopping,
}

impl ControllerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ControllerState::Starting | ControllerState::Active)
    }
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ControllerState::Idle => "idle",
            ControllerState::Starting => "starting",
            ControllerState::Active => "active",
            ControllerState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
