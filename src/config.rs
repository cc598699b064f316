use crate::detector::BarcodeFormat;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanLoopConfig {
    pub camera: CameraConfig,
    pub scanner: ScannerConfig,
    pub server: ServerConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CameraBackend {
    /// Live V4L2 capture through GStreamer
    V4l2,
    /// A single image file presented as a live stream
    Still,
}

/// Which way the requested camera should face
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera, pointing away from the operator
    Environment,
    /// Front camera, pointing at the operator
    User,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Capture backend
    #[serde(default = "default_camera_backend")]
    pub backend: CameraBackend,

    /// Device index used for the rear camera (e.g., 0 for /dev/video0)
    #[serde(default = "default_device_index")]
    pub device_index: u32,

    /// Device index used for the front camera, if the station has one
    #[serde(default)]
    pub front_device_index: Option<u32>,

    /// Preferred facing
    #[serde(default = "default_facing")]
    pub facing: FacingMode,

    /// Capture resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Frames per second
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Image file served by the still backend
    #[serde(default)]
    pub still_image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScannerConfig {
    /// Period between detection ticks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Minimum time before the same code is accepted again
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Barcode formats requested from the detector
    #[serde(default = "default_formats")]
    pub formats: Vec<BarcodeFormat>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Base URL of the point-of-sale server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the scan processing endpoint
    #[serde(default = "default_process_scan_path")]
    pub process_scan_path: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl ScanLoopConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("scanloop.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.backend", "v4l2")?
            .set_default("camera.device_index", default_device_index())?
            .set_default("camera.facing", "environment")?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default(
                "scanner.poll_interval_ms",
                default_poll_interval_ms() as i64,
            )?
            .set_default("scanner.debounce_ms", default_debounce_ms() as i64)?
            .set_default(
                "scanner.formats",
                default_formats()
                    .iter()
                    .map(|format| format.as_str())
                    .collect::<Vec<_>>(),
            )?
            .set_default("server.base_url", default_base_url())?
            .set_default("server.process_scan_path", default_process_scan_path())?
            .set_default(
                "server.request_timeout_ms",
                default_request_timeout_ms() as i64,
            )?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // Keys look like SCANLOOP_SERVER__BASE_URL
            .add_source(
                Environment::with_prefix("SCANLOOP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: ScanLoopConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        if self.camera.backend == CameraBackend::Still
            && self
                .camera
                .still_image
                .as_deref()
                .map_or(true, |path| path.trim().is_empty())
        {
            return Err(ConfigError::Message(
                "Still camera backend requires camera.still_image".to_string(),
            ));
        }

        if self.scanner.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Scanner poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.scanner.formats.is_empty() {
            return Err(ConfigError::Message(
                "At least one barcode format must be configured".to_string(),
            ));
        }

        if self.server.base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "Server base_url must not be empty".to_string(),
            ));
        }

        if !self.server.process_scan_path.starts_with('/') {
            return Err(ConfigError::Message(
                "Server process_scan_path must start with '/'".to_string(),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Server request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the scan processing endpoint
    pub fn process_scan_url(&self) -> String {
        format!(
            "{}{}",
            self.server.base_url.trim_end_matches('/'),
            self.server.process_scan_path
        )
    }
}

impl CameraConfig {
    /// Device index that satisfies the requested facing, falling back to the rear camera
    pub fn device_for(&self, facing: FacingMode) -> u32 {
        match facing {
            FacingMode::User => self.front_device_index.unwrap_or(self.device_index),
            FacingMode::Environment => self.device_index,
        }
    }
}

impl Default for ScanLoopConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                backend: default_camera_backend(),
                device_index: default_device_index(),
                front_device_index: None,
                facing: default_facing(),
                resolution: default_camera_resolution(),
                fps: default_camera_fps(),
                still_image: None,
            },
            scanner: ScannerConfig {
                poll_interval_ms: default_poll_interval_ms(),
                debounce_ms: default_debounce_ms(),
                formats: default_formats(),
            },
            server: ServerConfig {
                base_url: default_base_url(),
                process_scan_path: default_process_scan_path(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_camera_backend() -> CameraBackend {
    CameraBackend::V4l2
}
fn default_device_index() -> u32 {
    0
}
fn default_facing() -> FacingMode {
    FacingMode::Environment
}
fn default_camera_resolution() -> (u32, u32) {
    (1280, 720)
}
fn default_camera_fps() -> u32 {
    30
}

fn default_poll_interval_ms() -> u64 {
    250
}
fn default_debounce_ms() -> u64 {
    1500
}
fn default_formats() -> Vec<BarcodeFormat> {
    vec![
        BarcodeFormat::Code128,
        BarcodeFormat::QrCode,
        BarcodeFormat::Ean13,
    ]
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_process_scan_path() -> String {
    "/scan/process_scan".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_event_bus_capacity() -> usize {
    100
}
