//! # Capture Sources
//!
//! A capture source is the one collaborator that talks to the outside world: it
//! acquires a camera feed or decodes an uploaded file, reports the native
//! resolution once ready, and hands out the current frame on demand.
//!
//! The session depends only on the [`CaptureSource`] capability, never on the
//! concrete kind, so switching between camera and file means building a new
//! session around a different source.

pub mod file;
pub mod frame;
pub mod live;

use async_trait::async_trait;
use snap_geom::fit::Size;

use crate::error::SnapResult;

pub use file::FileSource;
pub use frame::{PixelLayout, RgbaFrame};
pub use live::{LiveFeed, LiveSource};

/// Which kind of collaborator backs a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Live frames from a camera (or any other frame pusher)
    Camera,
    /// A single decoded still image
    File,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Camera => "camera",
            SourceKind::File => "file",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract interface for still-capture sources.
/// Enables pluggable camera and file backends behind one session.
#[async_trait]
pub trait CaptureSource: Send {
    /// The kind of collaborator behind this source.
    fn kind(&self) -> SourceKind;

    /// Acquire the source and wait until it is ready.
    ///
    /// This is the only operation in the core that suspends: it resolves on the
    /// first decodable camera frame or once the file has decoded.
    ///
    /// # Returns
    ///
    /// The native resolution, or `SourceUnavailable` on permission, device or
    /// decode failure.
    async fn acquire(&mut self) -> SnapResult<Size>;

    /// The current frame at native resolution.
    fn frame(&self) -> SnapResult<RgbaFrame>;

    /// Release the underlying resource. Calling it twice is harmless.
    fn release(&mut self);
}
