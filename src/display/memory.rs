use super::render::{StateFields, StatusLine};
use super::surface::{ControlState, ScanDisplay};
use parking_lot::Mutex;

/// Everything a [`MemoryDisplay`] currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub controls: ControlState,
    pub start_enabled: bool,
    pub camera_error: String,
    pub status: Option<StatusLine>,
    pub fields: StateFields,
    pub preview: Option<String>,
    pub status_updates: u64,
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self {
            controls: ControlState::Inactive,
            start_enabled: true,
            camera_error: String::new(),
            status: None,
            fields: StateFields::default(),
            preview: None,
            status_updates: 0,
        }
    }
}

/// Display that keeps its state in memory
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    state: Mutex<DisplaySnapshot>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.state.lock().clone()
    }
}

impl ScanDisplay for MemoryDisplay {
    fn set_controls(&self, state: ControlState) {
        self.state.lock().controls = state;
    }

    fn set_start_enabled(&self, enabled: bool) {
        self.state.lock().start_enabled = enabled;
    }

    fn set_camera_error(&self, message: &str) {
        self.state.lock().camera_error = message.to_string();
    }

    fn set_status(&self, status: &StatusLine) {
        let mut state = self.state.lock();
        state.status = Some(status.clone());
        state.status_updates += 1;
    }

    fn set_fields(&self, fields: &StateFields) {
        self.state.lock().fields = fields.clone();
    }

    fn attach_preview(&self, label: &str) {
        self.state.lock().preview = Some(label.to_string());
    }

    fn detach_preview(&self) {
        self.state.lock().preview = None;
    }
}
