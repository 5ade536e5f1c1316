//! # Capture Session Management
//!
//! One session coordinates one capture surface. It tracks three coordinate spaces
//! that change independently: the source's native resolution, the viewport the user
//! sees, and the crop resolved in each of them.
//!
//! ## Architecture
//!
//! 1. **SessionState**: display width, crop spec and the current [`Phase`]
//! 2. **SessionEvent**: every change arrives as one discrete event
//! 3. **reduce**: a pure fold of an event into the next state
//! 4. **CaptureSession**: owns the source, dispatches events, runs captures
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──SourceReady──▶ Streaming ──Detached──▶ Closed
//!   └───────────────────Detached────────────────▶ Closed
//! ```
//!
//! `Idle → Streaming` happens once, on the source's first ready signal. A failed
//! acquisition leaves the session `Idle` until the caller retries. `Closed` is
//! terminal: switching between camera and file builds a new session.
//!
//! ## Stale Ready Signals
//!
//! Acquisition can outlive the session that asked for it. Every acquisition carries
//! an [`AcquisitionTicket`]; `detach` invalidates outstanding tickets so a late
//! ready signal cannot revive a closed session.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{debug, error, info, warn};
use snap_geom::crop::{CropSpec, Rect, resolve};
use snap_geom::fit::{Size, viewport_for};

use crate::CaptureOptions;
use crate::capture::{CaptureSource, SourceKind};
use crate::config::config::{DEFAULT_DISPLAY_WIDTH, SnapConfig};
use crate::error::{CaptureError, SnapResult};
use crate::overlay::Overlay;
use crate::processing::{OutputFormat, crop_frame, encode};

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// No source resolution known yet
    Idle,
    /// Source ready; viewport and overlay are derived from `native`
    Streaming {
        native: Size,
        viewport: Size,
        overlay: Rect,
    },
    /// Source released, terminal
    Closed,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Streaming { .. } => "streaming",
            Phase::Closed => "closed",
        }
    }
}

/// Everything a session knows, folded from events.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub display_width: u32,
    pub crop: CropSpec,
    pub phase: Phase,
}

impl SessionState {
    pub fn new(display_width: u32, crop: CropSpec) -> Self {
        Self {
            display_width,
            crop,
            phase: Phase::Idle,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.phase, Phase::Streaming { .. })
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }
}

/// Discrete changes a session reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The source delivered its first frame or finished decoding
    SourceReady { native: Size },
    /// The source now runs at another resolution (e.g. another camera was granted)
    ResolutionChanged { native: Size },
    /// The caller changed the fixed display width
    DisplayWidthChanged { width: u32 },
    /// The caller changed the crop spec
    CropChanged { crop: CropSpec },
    /// The source was released
    Detached,
}

fn streaming_phase(display_width: u32, crop: &CropSpec, native: Size) -> Phase {
    let viewport = viewport_for(native, display_width);
    let overlay = resolve(viewport.w as f64, viewport.h as f64, crop);
    Phase::Streaming {
        native,
        viewport,
        overlay,
    }
}

/// Fold one event into the next state.
///
/// Total and side-effect free. Events that make no sense in the current phase
/// leave the state as it was; a closed state ignores everything.
pub fn reduce(state: &SessionState, event: SessionEvent) -> SessionState {
    if state.is_closed() {
        return state.clone();
    }

    let mut next = state.clone();
    match event {
        SessionEvent::SourceReady { native } => {
            if state.phase == Phase::Idle {
                next.phase = streaming_phase(next.display_width, &next.crop, native);
            }
        }
        SessionEvent::ResolutionChanged { native } => {
            if state.is_streaming() {
                next.phase = streaming_phase(next.display_width, &next.crop, native);
            }
        }
        SessionEvent::DisplayWidthChanged { width } => {
            next.display_width = width;
            if let Phase::Streaming { native, .. } = state.phase {
                next.phase = streaming_phase(width, &next.crop, native);
            }
        }
        SessionEvent::CropChanged { crop } => {
            next.crop = crop;
            if let Phase::Streaming { native, .. } = state.phase {
                next.phase = streaming_phase(next.display_width, &next.crop, native);
            }
        }
        SessionEvent::Detached => next.phase = Phase::Closed,
    }
    next
}

/// Proof that a ready signal belongs to the current acquisition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquisitionTicket {
    epoch: u64,
}

/// The cropped region of one capture.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureResult {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Encoding of `data`
    pub format: OutputFormat,
    /// Crop width in native pixels
    pub width: f64,
    /// Crop height in native pixels
    pub height: f64,
    /// Width to lay out the preview with, in viewport units
    pub preview_width: f64,
    /// Height to lay out the preview with, in viewport units
    pub preview_height: f64,
    /// Encoded image width (crop width times the device pixel scale)
    pub pixel_width: u32,
    /// Encoded image height (crop height times the device pixel scale)
    pub pixel_height: u32,
}

impl CaptureResult {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:` URL carrying the encoded image.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.data))
    }
}

/// Outcome of a capture request.
#[derive(Clone, Debug, PartialEq)]
pub enum Snap {
    /// A cropped image was produced
    Taken(CaptureResult),
    /// The crop had no usable area; nothing was produced
    Cleared,
}

impl Snap {
    pub fn is_cleared(&self) -> bool {
        matches!(self, Snap::Cleared)
    }

    pub fn taken(&self) -> Option<&CaptureResult> {
        match self {
            Snap::Taken(result) => Some(result),
            Snap::Cleared => None,
        }
    }
}

/// Stateful coordinator for one capture surface.
pub struct CaptureSession {
    source: Box<dyn CaptureSource>,
    state: SessionState,
    epoch: u64,
}

impl CaptureSession {
    /// Create a new capture session using the builder pattern.
    pub fn builder() -> CaptureSessionBuilder {
        CaptureSessionBuilder::new()
    }

    pub fn new(source: Box<dyn CaptureSource>, display_width: u32, crop: CropSpec) -> Self {
        Self {
            source,
            state: SessionState::new(sanitize_width(display_width), crop),
            epoch: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Ticket for an acquisition started now.
    pub fn ticket(&self) -> AcquisitionTicket {
        AcquisitionTicket { epoch: self.epoch }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        self.state = reduce(&self.state, event);
    }

    /// Acquire the source and wait for it to become ready.
    ///
    /// A failure is logged once, returned unchanged and leaves the session `Idle`;
    /// calling `start` again retries. Starting a streaming session is a no-op.
    pub async fn start(&mut self) -> SnapResult<()> {
        match self.state.phase {
            Phase::Closed => return Err(CaptureError::session_closed("start")),
            Phase::Streaming { .. } => return Ok(()),
            Phase::Idle => {}
        }

        let ticket = self.ticket();
        match self.source.acquire().await {
            Ok(native) => self.on_source_ready(ticket, native).map(|_| ()),
            Err(e) => {
                error!("Failed to acquire {} source: {}", self.source.kind(), e);
                Err(e.with_operation("start"))
            }
        }
    }

    /// Record the source's native resolution and start streaming.
    ///
    /// The source must already be able to serve frames; otherwise the error from
    /// [`CaptureSource::frame`] is returned and the session stays `Idle`.
    pub fn attach_source(&mut self, native_width: u32, native_height: u32) -> SnapResult<()> {
        let ticket = self.ticket();
        self.on_source_ready(
            ticket,
            Size {
                w: native_width,
                h: native_height,
            },
        )
        .map(|_| ())
    }

    /// Apply a ready signal from an acquisition identified by `ticket`.
    ///
    /// Returns `Ok(true)` when the session started streaming, `Ok(false)` when the
    /// signal was stale or the session was already streaming. A source that cannot
    /// serve a frame yet keeps the session `Idle` and returns its error.
    pub fn on_source_ready(&mut self, ticket: AcquisitionTicket, native: Size) -> SnapResult<bool> {
        if ticket.epoch != self.epoch {
            debug!(
                "Dropping stale ready signal ({} from epoch {}, now {})",
                native, ticket.epoch, self.epoch
            );
            return Ok(false);
        }
        match self.state.phase {
            Phase::Closed => Err(CaptureError::session_closed("attach source")),
            Phase::Streaming { native: current, .. } => {
                debug!("Source already streaming at {}, ignoring ready {}", current, native);
                Ok(false)
            }
            Phase::Idle => {
                if let Err(e) = self.source.frame() {
                    warn!("{} source signalled ready without a frame: {}", self.source.kind(), e);
                    return Err(e.with_operation("attach source"));
                }
                self.dispatch(SessionEvent::SourceReady { native });
                if let Phase::Streaming { viewport, overlay, .. } = self.state.phase {
                    info!(
                        "Capture session streaming: {} source {}, viewport {}, overlay {:.1}x{:.1}+{:.1}+{:.1}",
                        self.source.kind(),
                        native,
                        viewport,
                        overlay.w,
                        overlay.h,
                        overlay.x,
                        overlay.y
                    );
                }
                Ok(true)
            }
        }
    }

    /// Tell the session its source now runs at `native`.
    pub fn source_resolution_changed(&mut self, native: Size) -> SnapResult<()> {
        self.streaming_geometry("change resolution")?;
        self.dispatch(SessionEvent::ResolutionChanged { native });
        Ok(())
    }

    /// Compare the source's current frame with the known resolution and adopt it
    /// if it differs. Returns whether anything changed.
    pub fn refresh_resolution(&mut self) -> SnapResult<bool> {
        let (native, _, _) = self.streaming_geometry("refresh resolution")?;
        let current = self.source.frame()?.size();
        if current == native {
            return Ok(false);
        }
        info!("Source resolution changed: {} -> {}", native, current);
        self.dispatch(SessionEvent::ResolutionChanged { native: current });
        Ok(true)
    }

    pub fn set_crop(&mut self, crop: CropSpec) -> SnapResult<()> {
        if self.state.is_closed() {
            return Err(CaptureError::session_closed("set crop"));
        }
        self.dispatch(SessionEvent::CropChanged { crop });
        Ok(())
    }

    pub fn set_display_width(&mut self, width: u32) -> SnapResult<()> {
        if self.state.is_closed() {
            return Err(CaptureError::session_closed("set display width"));
        }
        self.dispatch(SessionEvent::DisplayWidthChanged {
            width: sanitize_width(width),
        });
        Ok(())
    }

    fn streaming_geometry(&self, operation: &str) -> SnapResult<(Size, Size, Rect)> {
        match self.state.phase {
            Phase::Streaming {
                native,
                viewport,
                overlay,
            } => Ok((native, viewport, overlay)),
            Phase::Idle => Err(CaptureError::not_streaming(operation)),
            Phase::Closed => Err(CaptureError::session_closed(operation)),
        }
    }

    pub fn native_resolution(&self) -> SnapResult<Size> {
        self.streaming_geometry("read native resolution").map(|(n, _, _)| n)
    }

    pub fn viewport(&self) -> SnapResult<Size> {
        self.streaming_geometry("read viewport").map(|(_, v, _)| v)
    }

    /// Crop rectangle in viewport units, for display only.
    pub fn current_overlay_rect(&self) -> SnapResult<Rect> {
        self.streaming_geometry("compute overlay").map(|(_, _, o)| o)
    }

    /// Overlay geometry ready for drawing.
    pub fn overlay(&self) -> SnapResult<Overlay> {
        let (_, viewport, overlay) = self.streaming_geometry("compute overlay")?;
        Ok(Overlay::new(viewport, overlay))
    }

    /// Crop the current frame at native resolution.
    ///
    /// Never mutates the session: with an unchanged frame and spec, repeated calls
    /// yield the same pixels.
    pub fn capture(&self, options: &CaptureOptions) -> SnapResult<Snap> {
        let (native, _, overlay) = self.streaming_geometry("capture")?;
        let rect = resolve(native.w as f64, native.h as f64, &self.state.crop);
        if rect.is_degenerate() {
            debug!("Crop resolves to {:?} at {}, clearing", rect, native);
            return Ok(Snap::Cleared);
        }

        let frame = self.source.frame()?;
        if frame.size() != native {
            warn!(
                "Frame is {} but session expects {}; call refresh_resolution()",
                frame.size(),
                native
            );
        }

        let scale = options.effective_scale();
        let Some(pixels) = crop_frame(&frame, &rect, scale)? else {
            debug!("Crop {:?} has no pixels at scale {}, clearing", rect, scale);
            return Ok(Snap::Cleared);
        };
        let data = encode(&pixels, options.format, options.jpeg_quality)?;

        info!(
            "Captured {:.0}x{:.0}+{:.0}+{:.0} from {} as {} ({}x{}, {} bytes)",
            rect.w,
            rect.h,
            rect.x,
            rect.y,
            native,
            options.format.mime_type(),
            pixels.width(),
            pixels.height(),
            data.len()
        );

        Ok(Snap::Taken(CaptureResult {
            data,
            format: options.format,
            width: rect.w,
            height: rect.h,
            preview_width: overlay.w,
            preview_height: overlay.h,
            pixel_width: pixels.width(),
            pixel_height: pixels.height(),
        }))
    }

    /// Release the source and close the session. Later calls are no-ops.
    pub fn detach(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.source.release();
        self.epoch += 1;
        self.dispatch(SessionEvent::Detached);
        info!("Capture session closed ({} source released)", self.source.kind());
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if !self.state.is_closed() {
            self.source.release();
        }
    }
}

fn sanitize_width(width: u32) -> u32 {
    if width == 0 {
        warn!("Display width 0 is unusable, using {}", DEFAULT_DISPLAY_WIDTH);
        DEFAULT_DISPLAY_WIDTH
    } else {
        width
    }
}

/// Builder for creating capture sessions with fluent API.
pub struct CaptureSessionBuilder {
    source: Option<Box<dyn CaptureSource>>,
    display_width: u32,
    crop: CropSpec,
}

impl Default for CaptureSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSessionBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            display_width: DEFAULT_DISPLAY_WIDTH,
            crop: CropSpec::default(),
        }
    }

    /// Set the capture source for the session.
    pub fn with_source<S: CaptureSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn display_width(mut self, width: u32) -> Self {
        self.display_width = width;
        self
    }

    pub fn crop(mut self, crop: CropSpec) -> Self {
        self.crop = crop;
        self
    }

    /// Take display width and crop from a config.
    pub fn with_config(self, config: &SnapConfig) -> Self {
        self.display_width(config.display_width).crop(config.crop.clone())
    }

    pub fn build(self) -> SnapResult<CaptureSession> {
        let source = self.source.ok_or_else(|| {
            CaptureError::state("unbuilt", "build", "no capture source specified")
        })?;
        Ok(CaptureSession::new(source, self.display_width, self.crop))
    }
}
