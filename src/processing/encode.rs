//! Raster encoding of the cropped region.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{CaptureError, SnapResult};

/// Single raster encoding produced per capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Lossy, no alpha. Blank areas flatten to black.
    #[default]
    Jpeg,
    /// Lossless with alpha.
    Png,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encode `image` as `format`. `jpeg_quality` is clamped to 1..=100 and ignored for PNG.
pub fn encode(image: &RgbaImage, format: OutputFormat, jpeg_quality: u8) -> SnapResult<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image.clone()).to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
                .map_err(|e| CaptureError::encoding("jpeg", e.to_string()))?;
        }
        OutputFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| CaptureError::encoding("png", e.to_string()))?;
        }
    }
    Ok(bytes)
}
