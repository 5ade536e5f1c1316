//! # Configuration Module
//!
//! Settings shared by the `snap` CLI and library callers: the fixed display width,
//! the crop spec, and how captures are encoded.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `display_width` | `u32` | 320 | Width the source is shown at |
//! | `crop` | `CropSpec` | empty | Relative crop declaration |
//! | `device_pixel_scale` | `f64` | 1.0 | Output pixels per unit |
//! | `format` | `OutputFormat` | `Jpeg` | Capture encoding |
//! | `jpeg_quality` | `u8` | 92 | 1-100, ignored for PNG |
//!
//! Values out of range are never rejected at runtime: [`SnapConfig::sanitized`]
//! replaces them with defaults and logs a warning.
//!
//! ## Examples
//!
//! ```rust
//! use snap_crop::config::SnapConfig;
//! use snap_geom::crop::CropSpec;
//!
//! let config = SnapConfig {
//!     crop: CropSpec::new().left("center").top("top").width(0.5).ratio(1.0),
//!     ..SnapConfig::default()
//! };
//! assert!(config.validate().is_ok());
//!
//! let options = config.to_capture_options();
//! assert_eq!(options.jpeg_quality, 92);
//! ```

use log::warn;
use snap_geom::crop::CropSpec;

use crate::CaptureOptions;
use crate::processing::OutputFormat;

/// Display width used when none (or zero) is given.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 320;
/// JPEG quality used when none (or zero) is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Configuration for one capture surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapConfig {
    /// Fixed width the source is displayed at; the viewport height follows the
    /// source aspect ratio.
    pub display_width: u32,

    /// Crop declared relative to whatever space it is resolved in.
    pub crop: CropSpec,

    /// Device pixels per display unit. The encoded image is
    /// `floor(w * scale) × floor(h * scale)` of the native crop.
    pub device_pixel_scale: f64,

    /// Encoding of captured images.
    pub format: OutputFormat,

    /// JPEG quality, 1 (smallest) to 100 (best).
    pub jpeg_quality: u8,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
            crop: CropSpec::default(),
            device_pixel_scale: 1.0,
            format: OutputFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl SnapConfig {
    /// Reports the first unusable parameter.
    pub fn validate(&self) -> Result<(), String> {
        if self.display_width == 0 {
            return Err("Display width must be greater than 0".to_string());
        }
        if !(self.device_pixel_scale.is_finite() && self.device_pixel_scale > 0.0) {
            return Err("Device pixel scale must be a positive number".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        Ok(())
    }

    /// Copy with every unusable parameter replaced by its default.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        let defaults = Self::default();

        if config.display_width == 0 {
            warn!("Display width 0 is unusable, using {}", defaults.display_width);
            config.display_width = defaults.display_width;
        }
        if !(config.device_pixel_scale.is_finite() && config.device_pixel_scale > 0.0) {
            warn!(
                "Device pixel scale {} is unusable, using {}",
                config.device_pixel_scale, defaults.device_pixel_scale
            );
            config.device_pixel_scale = defaults.device_pixel_scale;
        }
        if config.jpeg_quality == 0 {
            warn!("JPEG quality 0 is unusable, using {}", defaults.jpeg_quality);
            config.jpeg_quality = defaults.jpeg_quality;
        } else if config.jpeg_quality > 100 {
            warn!("JPEG quality {} is above 100, clamping", config.jpeg_quality);
            config.jpeg_quality = 100;
        }
        config
    }

    /// Convert to the options `CaptureSession::capture` takes.
    pub fn to_capture_options(&self) -> CaptureOptions {
        let config = self.sanitized();
        CaptureOptions {
            device_pixel_scale: config.device_pixel_scale,
            format: config.format,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnapConfig::default();
        assert_eq!(config.display_width, 320);
        assert_eq!(config.crop, CropSpec::default());
        assert_eq!(config.device_pixel_scale, 1.0);
        assert_eq!(config.format, OutputFormat::Jpeg);
        assert_eq!(config.jpeg_quality, 92);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SnapConfig::default();
        assert!(config.validate().is_ok());

        config.display_width = 0;
        assert!(config.validate().is_err());
        config.display_width = 640;

        config.device_pixel_scale = f64::NAN;
        assert!(config.validate().is_err());
        config.device_pixel_scale = -2.0;
        assert!(config.validate().is_err());
        config.device_pixel_scale = 2.0;

        config.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());
        config.jpeg_quality = 80;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sanitized_degrades_to_defaults() {
        let config = SnapConfig {
            display_width: 0,
            device_pixel_scale: f64::INFINITY,
            jpeg_quality: 0,
            ..SnapConfig::default()
        }
        .sanitized();
        assert_eq!(config, SnapConfig::default());

        let clamped = SnapConfig {
            jpeg_quality: 250,
            ..SnapConfig::default()
        }
        .sanitized();
        assert_eq!(clamped.jpeg_quality, 100);
    }

    #[test]
    fn test_capture_options_are_sanitized() {
        let options = SnapConfig {
            device_pixel_scale: 0.0,
            format: OutputFormat::Png,
            ..SnapConfig::default()
        }
        .to_capture_options();
        assert_eq!(options.device_pixel_scale, 1.0);
        assert_eq!(options.format, OutputFormat::Png);
    }
}
