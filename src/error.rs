//! Central error handling for the tile pipeline.
//!
//! Provides a unified PipelineError enum with consistent categorization.
//! Every failure is surfaced synchronously to the caller; there are no
//! runtime retries at this layer.

/// Centralized error type for all pipeline operations.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Invalid caller-supplied configuration (over-length scale/sentinel
    /// tables, band cardinality mismatches, bad kernel sizes). Detected at
    /// construction or bind time, never per pixel.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Readback error: {0}")]
    Readback(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Convenience constructors for common error types
    pub fn configuration<T: ToString>(msg: T) -> Self {
        PipelineError::Configuration(msg.to_string())
    }

    pub fn device<T: ToString>(msg: T) -> Self {
        PipelineError::Device(msg.to_string())
    }

    pub fn upload<T: ToString>(msg: T) -> Self {
        PipelineError::Upload(msg.to_string())
    }

    pub fn readback<T: ToString>(msg: T) -> Self {
        PipelineError::Readback(msg.to_string())
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
