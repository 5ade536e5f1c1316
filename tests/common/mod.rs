//! Common test utilities and helpers for the snap_crop tests
//!
//! Frame generators with recognisable pixel patterns, and mock capture sources
//! that fail on demand.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use snap_crop::capture::{CaptureSource, LiveFeed, LiveSource, PixelLayout, RgbaFrame, SourceKind};
use snap_crop::{CaptureError, SnapResult};
use snap_geom::fit::Size;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Pixel whose channels encode its own coordinates (mod 256).
pub fn coord_pixel(x: u32, y: u32) -> Rgba<u8> {
    Rgba([(x % 256) as u8, (y % 256) as u8, 77, 255])
}

/// Image where every pixel encodes its coordinates.
pub fn coord_image(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, coord_pixel)
}

pub fn coord_frame(w: u32, h: u32) -> RgbaFrame {
    RgbaFrame::from_rgba_image(coord_image(w, h))
}

pub fn solid_frame(w: u32, h: u32, color: [u8; 4]) -> RgbaFrame {
    RgbaFrame::from_rgba_image(RgbaImage::from_pixel(w, h, Rgba(color)))
}

/// Same pixels as [`coord_frame`], stored BGRA with `pad` bytes after each row.
pub fn padded_bgra_frame(w: u32, h: u32, pad: usize) -> RgbaFrame {
    let stride = w as usize * 4 + pad;
    let mut data = vec![0xAAu8; stride * h as usize];
    for y in 0..h {
        for x in 0..w {
            let [r, g, b, a] = coord_pixel(x, y).0;
            let i = y as usize * stride + x as usize * 4;
            data[i..i + 4].copy_from_slice(&[b, g, r, a]);
        }
    }
    RgbaFrame::new(data, w, h, stride, PixelLayout::Bgra).expect("valid frame")
}

/// Live feed that already holds `frame`, so its source can serve frames at once.
pub fn live_with(frame: RgbaFrame) -> (LiveFeed, LiveSource) {
    let (feed, source) = LiveFeed::channel();
    assert!(feed.publish(frame));
    (feed, source)
}

pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode png");
    out
}

/// Source that fails its first `failures` acquisitions, then serves `frame`.
pub struct FlakySource {
    frame: RgbaFrame,
    failures: usize,
    attempts: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    ready: bool,
}

impl FlakySource {
    pub fn new(frame: RgbaFrame, failures: usize) -> Self {
        Self {
            frame,
            failures,
            attempts: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
            ready: false,
        }
    }

    pub fn attempts(&self) -> Arc<AtomicUsize> {
        self.attempts.clone()
    }

    pub fn releases(&self) -> Arc<AtomicUsize> {
        self.releases.clone()
    }
}

#[async_trait]
impl CaptureSource for FlakySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    async fn acquire(&mut self) -> SnapResult<Size> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(CaptureError::source_unavailable(
                "camera",
                "permission denied",
            ));
        }
        self.ready = true;
        Ok(self.frame.size())
    }

    fn frame(&self) -> SnapResult<RgbaFrame> {
        if self.ready {
            Ok(self.frame.clone())
        } else {
            Err(CaptureError::not_streaming("read frame"))
        }
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.ready = false;
    }
}
