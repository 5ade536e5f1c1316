//! Live frame source for camera feeds.
//!
//! Acquiring camera hardware is platform specific and stays outside the core. A
//! backend owns a [`LiveFeed`] and publishes every decoded frame into it; the
//! session owns the matching [`LiveSource`]. The latest frame always wins, older
//! frames are never queued.
//!
//! When the session releases its source the receiving half is dropped, and
//! [`LiveFeed::is_released`] turns true so the backend can stop its tracks.

use async_trait::async_trait;
use log::{debug, info};
use snap_geom::fit::Size;
use tokio::sync::watch;

use crate::capture::{CaptureSource, RgbaFrame, SourceKind};
use crate::error::{CaptureError, SnapResult};

/// Publishing half, held by the camera backend.
#[derive(Debug)]
pub struct LiveFeed {
    tx: watch::Sender<Option<RgbaFrame>>,
}

impl LiveFeed {
    /// Create a connected feed/source pair.
    pub fn channel() -> (LiveFeed, LiveSource) {
        let (tx, rx) = watch::channel(None);
        (LiveFeed { tx }, LiveSource { rx: Some(rx) })
    }

    /// Publish the newest frame. Returns `false` once the source has been released.
    pub fn publish(&self, frame: RgbaFrame) -> bool {
        self.tx.send(Some(frame)).is_ok()
    }

    /// True once the consuming session let go of the source.
    pub fn is_released(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming half, owned by a capture session.
#[derive(Debug)]
pub struct LiveSource {
    rx: Option<watch::Receiver<Option<RgbaFrame>>>,
}

#[async_trait]
impl CaptureSource for LiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    async fn acquire(&mut self) -> SnapResult<Size> {
        let rx = self.rx.as_mut().ok_or_else(|| {
            CaptureError::source_unavailable(SourceKind::Camera.as_str(), "source was released")
        })?;

        let size = {
            let first = rx.wait_for(Option::is_some).await.map_err(|_| {
                CaptureError::source_unavailable(
                    SourceKind::Camera.as_str(),
                    "feed closed before the first frame",
                )
                .with_recovery_suggestion("Check camera permission and device, then start again")
            })?;
            first.as_ref().map(RgbaFrame::size).unwrap_or_default()
        };

        info!("Camera feed ready: {}", size);
        Ok(size)
    }

    fn frame(&self) -> SnapResult<RgbaFrame> {
        let rx = self
            .rx
            .as_ref()
            .ok_or_else(|| CaptureError::session_closed("read frame"))?;
        let latest = rx.borrow().clone();
        latest.ok_or_else(|| CaptureError::not_streaming("read frame"))
    }

    fn release(&mut self) {
        if self.rx.take().is_some() {
            debug!("Camera feed released");
        }
    }
}
