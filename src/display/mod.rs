mod memory;
mod render;
mod surface;
mod terminal;
#[cfg(test)]
mod tests;

pub use memory::{DisplaySnapshot, MemoryDisplay};
pub use render::{
    format_price, render, RenderedResponse, Severity, StateFields, StatusLine,
    DEFAULT_STATUS_MESSAGE, NONE_PLACEHOLDER, ZERO_PRICE,
};
pub use surface::{ControlState, ScanDisplay};
pub use terminal::TerminalDisplay;
