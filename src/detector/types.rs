use crate::error::DetectorError;
use crate::frame::Frame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbologies a detector may be asked to recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    Aztec,
    Code128,
    Code39,
    Code93,
    Codabar,
    DataMatrix,
    Ean13,
    Ean8,
    Itf,
    Pdf417,
    QrCode,
    UpcA,
    UpcE,
}

impl BarcodeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::Aztec => "aztec",
            BarcodeFormat::Code128 => "code_128",
            BarcodeFormat::Code39 => "code_39",
            BarcodeFormat::Code93 => "code_93",
            BarcodeFormat::Codabar => "codabar",
            BarcodeFormat::DataMatrix => "data_matrix",
            BarcodeFormat::Ean13 => "ean_13",
            BarcodeFormat::Ean8 => "ean_8",
            BarcodeFormat::Itf => "itf",
            BarcodeFormat::Pdf417 => "pdf417",
            BarcodeFormat::QrCode => "qr_code",
            BarcodeFormat::UpcA => "upc_a",
            BarcodeFormat::UpcE => "upc_e",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One code found in a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBarcode {
    pub raw_value: String,
    pub format: BarcodeFormat,
}

impl DetectedBarcode {
    pub fn new<S: Into<String>>(raw_value: S, format: BarcodeFormat) -> Self {
        Self {
            raw_value: raw_value.into(),
            format,
        }
    }
}

/// Barcode detection capability
///
/// Implementations return every code they find in a frame, in detection order.
/// Callers use the first one. A failed call is transient; the next frame may succeed.
#[async_trait]
pub trait BarcodeDetector: Send + Sync {
    /// Formats this detector can recognise
    async fn supported_formats(&self) -> Result<Vec<BarcodeFormat>, DetectorError>;

    /// Detect codes in a single frame
    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectorError>;
}
