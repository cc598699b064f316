pub mod app;
pub mod camera;
pub mod config;
pub mod detector;
pub mod display;
pub mod error;
pub mod events;
pub mod frame;
pub mod keyboard_input;
pub mod remote;
pub mod scanner;

pub use app::{ComponentState, ScanLoopApp, ShutdownReason};
pub use camera::{CameraSource, CameraSourceBuilder, StreamRequest, VideoStream};
pub use config::ScanLoopConfig;
pub use detector::{
    BarcodeDetector, BarcodeFormat, DetectedBarcode, ImageBarcodeDetector,
};
pub use display::{render, MemoryDisplay, RenderedResponse, ScanDisplay, TerminalDisplay};
pub use error::{Result, ScanLoopError};
pub use events::{EventBus, EventFilter, EventReceiver, ScanEvent};
pub use frame::{Frame, FrameFormat};
pub use keyboard_input::KeyboardInputHandler;
pub use remote::{HttpScanClient, RemoteStateUpdater, ScanClient, ScanResponse};
pub use scanner::{
    ControllerState, DebounceFilter, ScanLoopController, ScanLoopControllerBuilder, ScanStats,
    TickOutcome,
};
