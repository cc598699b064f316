use crate::error::DetectorError;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Frame format enumeration supporting different video formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// 8-bit luma, one byte per pixel
    Gray8,
    /// RGB24 format - uncompressed RGB data
    Rgb24,
    /// Motion JPEG format - compressed JPEG frames
    Mjpeg,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Gray8 => 1,
            FrameFormat::Rgb24 => 3,
            FrameFormat::Mjpeg => 0, // Variable size, compressed
        }
    }

    /// Check if format is compressed
    pub fn is_compressed(&self) -> bool {
        matches!(self, FrameFormat::Mjpeg)
    }
}

/// A single video frame sampled from a stream
#[derive(Debug, Clone)]
pub struct Frame {
    /// Unique frame identifier within its stream
    pub id: u64,
    /// Timestamp when frame was captured
    pub timestamp: SystemTime,
    /// Raw frame data (shared ownership for efficiency)
    pub data: Arc<Vec<u8>>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame format
    pub format: FrameFormat,
}

impl Frame {
    /// Create a new frame
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Build a luma frame from a decoded image
    pub fn from_image(id: u64, image: &DynamicImage) -> Self {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();
        Self::new(
            id,
            SystemTime::now(),
            luma.into_raw(),
            width,
            height,
            FrameFormat::Gray8,
        )
    }

    /// Get the expected frame size for uncompressed formats
    pub fn expected_size(&self) -> Option<usize> {
        if self.format.is_compressed() {
            None
        } else {
            Some(self.width as usize * self.height as usize * self.format.bytes_per_pixel())
        }
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        match self.expected_size() {
            Some(expected) => self.data.len() == expected,
            None => true,
        }
    }

    /// Get frame age in milliseconds
    pub fn age_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.timestamp)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// Convert the frame into an 8-bit luma image for detection
    pub fn to_luma(&self) -> Result<GrayImage, DetectorError> {
        if !self.validate_size() {
            return Err(DetectorError::InvalidFrame {
                details: format!(
                    "frame {} has {} bytes, expected {:?} for {}x{} {:?}",
                    self.id,
                    self.data.len(),
                    self.expected_size(),
                    self.width,
                    self.height,
                    self.format
                ),
            });
        }

        match self.format {
            FrameFormat::Gray8 => {
                GrayImage::from_raw(self.width, self.height, self.data.as_ref().clone())
                    .ok_or_else(|| DetectorError::InvalidFrame {
                        details: format!("frame {} is not a valid luma buffer", self.id),
                    })
            }
            FrameFormat::Rgb24 => RgbImage::from_raw(self.width, self.height, self.data.as_ref().clone())
                .map(|rgb| DynamicImage::ImageRgb8(rgb).to_luma8())
                .ok_or_else(|| DetectorError::InvalidFrame {
                    details: format!("frame {} is not a valid RGB buffer", self.id),
                }),
            FrameFormat::Mjpeg => image::load_from_memory_with_format(&self.data, ImageFormat::Jpeg)
                .map(|decoded| decoded.to_luma8())
                .map_err(|e| DetectorError::InvalidFrame {
                    details: format!("frame {} failed JPEG decode: {}", self.id, e),
                }),
        }
    }
}

/// Copy `height` rows of `width` bytes out of a buffer whose rows start `stride` bytes apart
///
/// Returns `None` when the buffer does not hold that layout.
pub fn unpad_rows(data: &[u8], width: usize, height: usize, stride: usize) -> Option<Vec<u8>> {
    if stride < width {
        return None;
    }

    let mut rows = Vec::with_capacity(width * height);
    for row in 0..height {
        let start = row * stride;
        rows.extend_from_slice(data.get(start..start + width)?);
    }
    Some(rows)
}
