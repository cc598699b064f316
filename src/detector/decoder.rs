use super::types::{BarcodeDetector, BarcodeFormat, DetectedBarcode};
use crate::error::DetectorError;
use crate::frame::Frame;
use async_trait::async_trait;
use image::GrayImage;
use rxing::Exceptions;
use tracing::{debug, trace};

/// Linear symbologies decoded through `rxing`
const LINEAR_FORMATS: &[BarcodeFormat] = &[
    BarcodeFormat::Code128,
    BarcodeFormat::Code39,
    BarcodeFormat::Code93,
    BarcodeFormat::Codabar,
    BarcodeFormat::Ean13,
    BarcodeFormat::Ean8,
    BarcodeFormat::Itf,
    BarcodeFormat::UpcA,
    BarcodeFormat::UpcE,
];

/// Frame detector for QR codes (`rqrr`) and linear barcodes (`rxing`)
///
/// Decoding runs on the blocking pool. QR results come first, then linear
/// codes in the order `rxing` reports them.
pub struct ImageBarcodeDetector {
    formats: Vec<BarcodeFormat>,
}

impl ImageBarcodeDetector {
    /// Create a detector for the requested formats; fails when none of them can be decoded
    pub fn new(requested: &[BarcodeFormat]) -> Result<Self, DetectorError> {
        let formats: Vec<BarcodeFormat> = requested
            .iter()
            .copied()
            .filter(|format| Self::can_decode(*format))
            .fold(Vec::new(), |mut acc, format| {
                if !acc.contains(&format) {
                    acc.push(format);
                }
                acc
            });

        if formats.is_empty() {
            return Err(DetectorError::Initialization {
                details: format!(
                    "none of the requested formats [{}] are supported",
                    requested
                        .iter()
                        .map(BarcodeFormat::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }

        Ok(Self { formats })
    }

    pub fn can_decode(format: BarcodeFormat) -> bool {
        format == BarcodeFormat::QrCode || LINEAR_FORMATS.contains(&format)
    }

    fn wants_qr(&self) -> bool {
        self.formats.contains(&BarcodeFormat::QrCode)
    }

    fn wants_linear(&self) -> bool {
        self.formats.iter().any(|f| LINEAR_FORMATS.contains(f))
    }

    fn decode_frame(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectorError> {
        let luma = frame.to_luma()?;
        let mut last_error = None;

        let linear = if self.wants_linear() {
            self.decode_linear(frame, &luma).unwrap_or_else(|e| {
                last_error = Some(e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let mut codes = if self.wants_qr() {
            let (found, error) = Self::decode_qr(frame, luma);
            if error.is_some() {
                last_error = error;
            }
            found
        } else {
            Vec::new()
        };
        codes.extend(linear);

        match (codes.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(codes),
        }
    }

    fn decode_qr(frame: &Frame, luma: GrayImage) -> (Vec<DetectedBarcode>, Option<DetectorError>) {
        let mut prepared = rqrr::PreparedImage::prepare(luma);
        let grids = prepared.detect_grids();

        trace!("Frame {} yielded {} candidate grids", frame.id, grids.len());

        let mut codes = Vec::with_capacity(grids.len());
        let mut last_error = None;

        for grid in grids {
            match grid.decode() {
                Ok((meta, content)) => {
                    debug!(
                        "Decoded QR version {:?} from frame {}",
                        meta.version, frame.id
                    );
                    codes.push(DetectedBarcode::new(content, BarcodeFormat::QrCode));
                }
                Err(e) => {
                    debug!("Bad grid decode in frame {}: {:?}", frame.id, e);
                    last_error = Some(DetectorError::Decode {
                        details: format!("{:?}", e),
                    });
                }
            }
        }

        (codes, last_error)
    }

    fn decode_linear(
        &self,
        frame: &Frame,
        luma: &GrayImage,
    ) -> Result<Vec<DetectedBarcode>, DetectorError> {
        let results = match rxing::helpers::detect_multiple_in_luma(
            luma.as_raw().clone(),
            luma.width(),
            luma.height(),
        ) {
            Ok(results) => results,
            Err(Exceptions::NotFoundException(_))
            | Err(Exceptions::FormatException(_))
            | Err(Exceptions::ChecksumException(_)) => return Ok(Vec::new()),
            Err(e) => {
                return Err(DetectorError::Decode {
                    details: e.to_string(),
                })
            }
        };

        trace!("Frame {} yielded {} rxing results", frame.id, results.len());

        Ok(results
            .iter()
            .filter_map(|result| {
                let format = linear_format(result.getBarcodeFormat())?;
                self.formats.contains(&format).then(|| {
                    debug!("Decoded {} from frame {}", format, frame.id);
                    DetectedBarcode::new(result.getText().to_string(), format)
                })
            })
            .collect())
    }
}

fn linear_format(format: &rxing::BarcodeFormat) -> Option<BarcodeFormat> {
    match format {
        rxing::BarcodeFormat::CODE_128 => Some(BarcodeFormat::Code128),
        rxing::BarcodeFormat::CODE_39 => Some(BarcodeFormat::Code39),
        rxing::BarcodeFormat::CODE_93 => Some(BarcodeFormat::Code93),
        rxing::BarcodeFormat::CODABAR => Some(BarcodeFormat::Codabar),
        rxing::BarcodeFormat::EAN_13 => Some(BarcodeFormat::Ean13),
        rxing::BarcodeFormat::EAN_8 => Some(BarcodeFormat::Ean8),
        rxing::BarcodeFormat::ITF => Some(BarcodeFormat::Itf),
        rxing::BarcodeFormat::UPC_A => Some(BarcodeFormat::UpcA),
        rxing::BarcodeFormat::UPC_E => Some(BarcodeFormat::UpcE),
        _ => None,
    }
}

#[async_trait]
impl BarcodeDetector for ImageBarcodeDetector {
    async fn supported_formats(&self) -> Result<Vec<BarcodeFormat>, DetectorError> {
        Ok(self.formats.clone())
    }

    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectorError> {
        let frame = frame.clone();
        let detector = Self {
            formats: self.formats.clone(),
        };
        tokio::task::spawn_blocking(move || detector.decode_frame(&frame))
            .await
            .map_err(|e| DetectorError::Task {
                details: e.to_string(),
            })?
    }
}
