//! # Error Handling
//!
//! Error taxonomy for the capture core, with per-error context and classification
//! traits.
//!
//! ## Taxonomy
//!
//! - `SourceUnavailable`: acquiring the camera feed or decoding the file failed.
//!   The only error that originates outside the core. It is reported once and the
//!   session stays idle until the caller retries.
//! - `NotStreaming`: an operation that needs a known source resolution ran too early.
//! - `SessionClosed`: an operation ran after `detach`.
//! - `State`: a transition the session does not allow.
//! - `Processing` / `Encoding`: the pixel pipeline failed on a well-formed request.
//! - `Io`: reading or writing files.
//!
//! A crop that resolves to zero area is *not* an error; `capture` reports it as
//! [`Snap::Cleared`](crate::session::Snap::Cleared).
//!
//! ## Usage
//!
//! ```rust
//! use snap_crop::error::{CaptureError, HasRecoverySuggestion, Retryable};
//!
//! let error = CaptureError::source_unavailable("camera", "permission denied")
//!     .with_operation("start")
//!     .with_recovery_suggestion("Grant camera access and call start() again");
//!
//! assert!(error.is_retryable());
//! assert_eq!(error.category(), "source_unavailable");
//! assert!(error.recovery_suggestion().is_some());
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Debug-level errors that don't affect operation
    Debug,
    /// Informational errors
    Info,
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that affect operation but can be recovered from
    Error,
    /// Critical errors that require immediate attention
    Critical,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// Base error type for the capture core
#[derive(Debug)]
pub enum CaptureError {
    /// Camera permission, missing device, or undecodable file
    SourceUnavailable {
        source_kind: String,
        reason: String,
        context: ErrorContext,
    },
    /// Operation needs a streaming session
    NotStreaming {
        operation: String,
        context: ErrorContext,
    },
    /// Operation on a detached session
    SessionClosed {
        operation: String,
        context: ErrorContext,
    },
    /// Invalid state transitions
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Pixel pipeline errors
    Processing {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Raster encoding errors
    Encoding {
        format: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
}

impl CaptureError {
    /// Create a source acquisition error
    pub fn source_unavailable(source_kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_kind: source_kind.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a not-yet-streaming error
    pub fn not_streaming(operation: impl Into<String>) -> Self {
        Self::NotStreaming {
            operation: operation.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a closed-session error
    pub fn session_closed(operation: impl Into<String>) -> Self {
        Self::SessionClosed {
            operation: operation.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a state error
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a processing error
    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an encoding error
    pub fn encoding(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            format: format.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error happened on. No effect on other variants.
    pub fn with_path(mut self, p: impl Into<String>) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(p.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::SourceUnavailable { context, .. } => context,
            Self::NotStreaming { context, .. } => context,
            Self::SessionClosed { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Encoding { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::SourceUnavailable { context, .. } => context,
            Self::NotStreaming { context, .. } => context,
            Self::SessionClosed { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Encoding { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::NotStreaming { .. } => "not_streaming",
            Self::SessionClosed { .. } => "session_closed",
            Self::State { .. } => "state",
            Self::Processing { .. } => "processing",
            Self::Encoding { .. } => "encoding",
            Self::Io { .. } => "io",
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SourceUnavailable {
                source_kind,
                reason,
                ..
            } => {
                write!(f, "{} source unavailable: {}", source_kind, reason)
            }
            CaptureError::NotStreaming { operation, .. } => {
                write!(f, "Cannot {}: source has not signalled ready yet", operation)
            }
            CaptureError::SessionClosed { operation, .. } => {
                write!(f, "Cannot {}: session is closed", operation)
            }
            CaptureError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Invalid state transition from '{}' when attempting '{}': {}",
                    current_state, attempted_operation, reason
                )
            }
            CaptureError::Processing {
                operation, reason, ..
            } => {
                write!(f, "Processing failed during {}: {}", operation, reason)
            }
            CaptureError::Encoding { format, reason, .. } => {
                write!(f, "Encoding {} failed: {}", format, reason)
            }
            CaptureError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
        }
    }
}

impl StdError for CaptureError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type SnapResult<T> = Result<T, CaptureError>;

/// Trait for errors that the caller may retry
///
/// The core never retries on its own; this only tells the caller whether a retry
/// can help.
pub trait Retryable {
    /// Check if this error can be retried
    fn is_retryable(&self) -> bool;
}

impl Retryable for CaptureError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::NotStreaming { .. } | Self::Io { .. }
        )
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for CaptureError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for CaptureError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Errors raised by calling an operation in the wrong session phase
    pub fn is_lifecycle(error: &CaptureError) -> bool {
        matches!(
            error,
            CaptureError::NotStreaming { .. }
                | CaptureError::SessionClosed { .. }
                | CaptureError::State { .. }
        )
    }

    /// Errors that originate outside the core
    pub fn is_external(error: &CaptureError) -> bool {
        matches!(error, CaptureError::SourceUnavailable { .. })
    }

    /// Check if an error requires user intervention
    pub fn requires_user_intervention(error: &CaptureError) -> bool {
        is_external(error) || error.severity() >= ErrorSeverity::Critical
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(e) => Self::io("image", e),
            other => Self::processing("image", other.to_string()),
        }
    }
}

impl From<snap_geom::cpu::ScaleError> for CaptureError {
    fn from(error: snap_geom::cpu::ScaleError) -> Self {
        Self::processing("scale", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = CaptureError::not_streaming("capture");
        assert_eq!(error.category(), "not_streaming");
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(classify::is_lifecycle(&error));
        assert!(!classify::is_external(&error));
    }

    #[test]
    fn test_error_with_context() {
        let error = CaptureError::source_unavailable("file", "not a PNG")
            .with_context("decoding upload")
            .with_recovery_suggestion("pick another image")
            .with_metadata("path", "/tmp/x.png");

        assert!(error.is_retryable());
        assert_eq!(error.recovery_suggestion(), Some("pick another image"));
        assert_eq!(error.context().metadata.get("path").map(String::as_str), Some("/tmp/x.png"));
        assert!(classify::requires_user_intervention(&error));
    }

    #[test]
    fn test_display_messages() {
        let closed = CaptureError::session_closed("capture");
        assert_eq!(closed.to_string(), "Cannot capture: session is closed");

        let io = CaptureError::io("read", std::io::Error::from(std::io::ErrorKind::NotFound))
            .with_path("missing.png");
        assert!(io.to_string().contains("'missing.png'"));
        assert!(io.source().is_some());
    }

    #[test]
    fn test_closed_is_not_retryable() {
        let error = CaptureError::session_closed("overlay");
        assert!(!error.is_retryable());
        assert!(classify::is_lifecycle(&error));
    }
}
