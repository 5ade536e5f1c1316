//! # Snap Crop Library
//!
//! Still-image capture with a declarative crop. A caller describes the crop in
//! relative terms (fractions, anchors, an aspect ratio); the library shows it as an
//! overlay on a fixed-width preview and cuts the same region out of the source at
//! its native resolution.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `capture`: sources (camera feed, decoded file) behind one capability trait
//! - `processing`: region extraction, device-pixel scaling and encoding
//! - `session`: lifecycle state machine and capture coordination
//! - `overlay`: display-side crop geometry and mask rendering
//! - `config`: configuration with degrade-to-default sanitation
//!
//! Crop resolution and viewport fitting live in the `snap_geom` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use snap_crop::{CaptureOptions, CaptureSession, FileSource, Snap};
//! use snap_geom::crop::CropSpec;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = CaptureSession::builder()
//!     .with_source(FileSource::from_path("photo.jpg"))
//!     .display_width(320)
//!     .crop(CropSpec::new().left("center").top("top").width(0.5).ratio(1.0))
//!     .build()?;
//!
//! session.start().await?;
//! println!("overlay: {:?}", session.current_overlay_rect()?);
//!
//! if let Snap::Taken(result) = session.capture(&CaptureOptions::default())? {
//!     println!("{}x{} crop", result.width, result.height);
//! }
//! session.detach();
//! # Ok(())
//! # }
//! ```

use std::path::Path;

pub mod capture;
pub mod config;
pub mod error;
pub mod overlay;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{
    CaptureError, ErrorSeverity, HasRecoverySuggestion, HasSeverity, Retryable, SnapResult,
};

pub use capture::{CaptureSource, FileSource, LiveFeed, LiveSource, RgbaFrame, SourceKind};
pub use config::SnapConfig;
pub use overlay::Overlay;
pub use processing::OutputFormat;
pub use session::{CaptureResult, CaptureSession, Snap};

/// Per-capture output settings.
///
/// # Examples
///
/// ```rust
/// use snap_crop::{CaptureOptions, OutputFormat};
///
/// let options = CaptureOptions {
///     device_pixel_scale: 2.0,
///     format: OutputFormat::Png,
///     ..CaptureOptions::default()
/// };
/// assert_eq!(options.effective_scale(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Output pixels per native pixel of the crop.
    ///
    /// Matches the display's device pixel ratio so the snapshot stays sharp on
    /// high-density screens. Non-finite or non-positive values count as 1.0.
    pub device_pixel_scale: f64,

    /// Encoding of the captured image.
    pub format: OutputFormat,

    /// JPEG quality, 1-100. Ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            device_pixel_scale: 1.0,
            format: OutputFormat::Jpeg,
            jpeg_quality: config::DEFAULT_JPEG_QUALITY,
        }
    }
}

impl CaptureOptions {
    /// The scale actually applied to the output buffer.
    pub fn effective_scale(&self) -> f64 {
        if self.device_pixel_scale.is_finite() && self.device_pixel_scale > 0.0 {
            self.device_pixel_scale
        } else {
            1.0
        }
    }
}

/// One-shot capture from an image file.
///
/// Opens a session over `path`, captures once with `config`, and closes it again.
/// Returns the capture together with the overlay the crop would show.
pub async fn snap_file(path: impl AsRef<Path>, config: &SnapConfig) -> SnapResult<(Snap, Overlay)> {
    let config = config.sanitized();
    let mut session = CaptureSession::builder()
        .with_source(FileSource::from_path(path.as_ref()))
        .with_config(&config)
        .build()?;

    session.start().await?;
    let overlay = session.overlay()?;
    let snap = session.capture(&config.to_capture_options())?;
    session.detach();
    Ok((snap, overlay))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_scale_counts_as_one() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let options = CaptureOptions {
                device_pixel_scale: scale,
                ..CaptureOptions::default()
            };
            assert_eq!(options.effective_scale(), 1.0);
        }
    }

    #[test]
    fn default_options_encode_jpeg() {
        let options = CaptureOptions::default();
        assert_eq!(options.format, OutputFormat::Jpeg);
        assert_eq!(options.jpeg_quality, 92);
    }
}
