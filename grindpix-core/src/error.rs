//! Error types for grindpix-core.

use thiserror::Error;

/// Result type alias for grindpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for grindpix operations.
///
/// Every variant is recoverable: the caller decides whether to retry the
/// capture or the analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Input buffer could not be normalized into a processable grayscale raster.
    #[error("image processing failure: {0}")]
    ImageProcessingFailure(String),

    /// Segmentation completed but no component survived noise filtering.
    #[error("no particles detected")]
    NoParticlesDetected,

    /// Missing or non-positive calibration factor.
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Configuration error (category table, histogram bins, thresholds).
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Reserved for internal inconsistencies; statistics never produce it.
    #[error("internal computation error: {0}")]
    InternalComputation(String),

    /// The analysis was cancelled through its cancellation token.
    #[error("analysis cancelled")]
    Cancelled,
}

impl Error {
    /// Returns true when the failure points at the captured image rather
    /// than at the analysis parameters.
    #[must_use]
    pub fn is_capture_problem(&self) -> bool {
        matches!(self, Self::ImageProcessingFailure(_) | Self::NoParticlesDetected)
    }
}
