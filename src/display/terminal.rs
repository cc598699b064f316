use super::memory::MemoryDisplay;
use super::render::{Severity, StateFields, StatusLine};
use super::surface::{ControlState, ScanDisplay};
use crossterm::style::Stylize;
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Display that prints station updates to the terminal
///
/// Lines end in `\r\n` so output stays aligned while the keyboard handler holds raw mode.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    state: MemoryDisplay,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> super::memory::DisplaySnapshot {
        self.state.snapshot()
    }

    fn print_line(line: String) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{}\r\n", line);
        let _ = stdout.flush();
    }
}

impl ScanDisplay for TerminalDisplay {
    fn set_controls(&self, state: ControlState) {
        self.state.set_controls(state);
        let hint = match state {
            ControlState::Inactive => "[s] start camera   [q] quit",
            ControlState::Active => "[x] stop camera    [q] quit",
        };
        Self::print_line(hint.dim().to_string());
    }

    fn set_start_enabled(&self, enabled: bool) {
        self.state.set_start_enabled(enabled);
        if !enabled {
            warn!("Start control disabled");
        }
    }

    fn set_camera_error(&self, message: &str) {
        self.state.set_camera_error(message);
        if !message.is_empty() {
            Self::print_line(format!("camera: {}", message).red().to_string());
        }
    }

    fn set_status(&self, status: &StatusLine) {
        self.state.set_status(status);
        let line = match status.severity {
            Severity::Success => status.text.clone().green(),
            Severity::Warning => status.text.clone().yellow(),
            Severity::Error => status.text.clone().red(),
        };
        Self::print_line(line.to_string());
    }

    fn set_fields(&self, fields: &StateFields) {
        self.state.set_fields(fields);
        Self::print_line(format!(
            "buyer: {}   item: {}   total: {}",
            fields.buyer.as_str().bold(),
            fields.item.as_str().bold(),
            fields.price.as_str().bold()
        ));
    }

    fn attach_preview(&self, label: &str) {
        self.state.attach_preview(label);
        info!("Preview attached to {}", label);
    }

    fn detach_preview(&self) {
        self.state.detach_preview();
        debug!("Preview detached");
    }
}
