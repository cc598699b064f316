use super::render::{RenderedResponse, StateFields, StatusLine};

/// Visibility of the start/stop controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Start shown, stop hidden
    Inactive,
    /// Start hidden, stop shown
    Active,
}

/// Operator-facing surface of a scan station
///
/// Implementations only mutate what they are told to; none of these calls may fail.
pub trait ScanDisplay: Send + Sync {
    fn set_controls(&self, state: ControlState);

    fn set_start_enabled(&self, enabled: bool);

    fn set_camera_error(&self, message: &str);

    fn clear_camera_error(&self) {
        self.set_camera_error("");
    }

    fn set_status(&self, status: &StatusLine);

    fn set_fields(&self, fields: &StateFields);

    /// Bind a live stream to the preview surface
    fn attach_preview(&self, label: &str);

    /// Clear the preview surface
    fn detach_preview(&self);

    fn apply(&self, rendered: &RenderedResponse) {
        self.set_status(&rendered.status);
        self.set_fields(&rendered.fields);
    }
}
