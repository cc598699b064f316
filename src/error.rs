use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanLoopError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Barcode scanning unavailable: {message}")]
    Unsupported { message: String },

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl ScanLoopError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

/// Failures while acquiring or reading a camera stream
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Permission denied for camera {device}")]
    PermissionDenied { device: String },

    #[error("Camera device not found: {device}")]
    DeviceNotFound { device: String },

    #[error("Failed to open camera {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },

    #[error("Camera stream error: {details}")]
    CaptureStream { details: String },
}

impl CameraError {
    /// Short category used in user-facing messages
    pub fn kind(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied { .. } => "permission denied",
            CameraError::DeviceNotFound { .. } => "device not found",
            CameraError::DeviceOpen { .. } => "device unavailable",
            CameraError::Configuration { .. } => "unsupported configuration",
            CameraError::CaptureStream { .. } => "stream failure",
        }
    }
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Barcode detection is not supported")]
    Unsupported,

    #[error("Detector initialization failed: {details}")]
    Initialization { details: String },

    #[error("Invalid frame: {details}")]
    InvalidFrame { details: String },

    #[error("Barcode decode failed: {details}")]
    Decode { details: String },

    #[error("Detection task failed: {details}")]
    Task { details: String },
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid server response: {details}")]
    Decode { details: String },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Event bus has no subscribers")]
    NoSubscribers,

    #[error("Event receiver lagged by {skipped} events")]
    Lagged { skipped: u64 },

    #[error("Event bus closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ScanLoopError>;
