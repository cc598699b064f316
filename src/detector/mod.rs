mod decoder;
mod mock;
mod types;

pub use decoder::ImageBarcodeDetector;
pub use mock::ScriptedDetector;
pub use types::{BarcodeDetector, BarcodeFormat, DetectedBarcode};
