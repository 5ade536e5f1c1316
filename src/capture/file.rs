//! Static image source for uploaded files.
//!
//! The upload widget itself is out of scope: this source receives either a path or
//! the raw bytes and decodes them with the `image` crate. Decoding completes the
//! acquisition, which is the file equivalent of a camera's first frame.

use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info};
use snap_geom::fit::Size;

use crate::capture::{CaptureSource, RgbaFrame, SourceKind};
use crate::error::{CaptureError, SnapResult};

enum Origin {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Decoded still image acting as a capture source.
pub struct FileSource {
    origin: Origin,
    frame: Option<RgbaFrame>,
}

impl FileSource {
    /// Source that reads and decodes `path` on acquisition.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::Path(path.into()),
            frame: None,
        }
    }

    /// Source that decodes in-memory bytes on acquisition.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            origin: Origin::Bytes(bytes),
            frame: None,
        }
    }

    fn describe(&self) -> String {
        match &self.origin {
            Origin::Path(p) => p.display().to_string(),
            Origin::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

#[async_trait]
impl CaptureSource for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    async fn acquire(&mut self) -> SnapResult<Size> {
        if let Some(frame) = &self.frame {
            return Ok(frame.size());
        }

        let name = self.describe();
        let decoded = match &self.origin {
            Origin::Path(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    CaptureError::source_unavailable(SourceKind::File.as_str(), e.to_string())
                        .with_metadata("path", path.display().to_string())
                })?;
                image::load_from_memory(&bytes)
            }
            Origin::Bytes(bytes) => image::load_from_memory(bytes),
        }
        .map_err(|e| {
            CaptureError::source_unavailable(SourceKind::File.as_str(), e.to_string())
                .with_context(format!("decoding {}", name))
                .with_recovery_suggestion("Choose a readable PNG, JPEG or other supported image")
        })?;

        let frame = RgbaFrame::from_dynamic(decoded);
        info!("Decoded {}: {}", name, frame.size());
        let size = frame.size();
        self.frame = Some(frame);
        Ok(size)
    }

    fn frame(&self) -> SnapResult<RgbaFrame> {
        self.frame
            .clone()
            .ok_or_else(|| CaptureError::not_streaming("read frame"))
    }

    fn release(&mut self) {
        if self.frame.take().is_some() {
            debug!("Released decoded image {}", self.describe());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([1, 2, 3, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    #[tokio::test]
    async fn decodes_bytes_on_acquire() {
        let mut source = FileSource::from_bytes(png_bytes(8, 6));
        assert!(source.frame().is_err());
        assert_eq!(source.acquire().await.unwrap(), Size::new(8, 6));
        assert_eq!(source.frame().unwrap().rgba_at(7, 5), Some([1, 2, 3, 255]));
    }

    #[tokio::test]
    async fn corrupt_bytes_are_unavailable() {
        let mut source = FileSource::from_bytes(b"not an image".to_vec());
        let err = source.acquire().await.unwrap_err();
        assert_eq!(err.category(), "source_unavailable");
    }

    #[tokio::test]
    async fn missing_path_is_unavailable() {
        let mut source = FileSource::from_path("/definitely/not/here.png");
        let err = source.acquire().await.unwrap_err();
        assert_eq!(err.category(), "source_unavailable");
    }

    #[tokio::test]
    async fn release_drops_the_frame() {
        let mut source = FileSource::from_bytes(png_bytes(2, 2));
        source.acquire().await.unwrap();
        source.release();
        source.release();
        assert!(source.frame().is_err());
    }
}
