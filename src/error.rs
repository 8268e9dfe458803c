//! Error types for the voc-eval library.

use thiserror::Error;

/// Result type for voc-eval operations.
pub type Result<T> = std::result::Result<T, VocEvalError>;

/// Error types that can occur during detection evaluation.
#[derive(Error, Debug)]
pub enum VocEvalError {
    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed detection row (too few columns or non-finite values).
    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    /// Invalid bounding box coordinates.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Threshold outside of its valid range.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Inconsistent ground-truth record.
    #[error("Invalid ground truth: {0}")]
    InvalidGroundTruth(String),

    /// Ground truth has no entry for a class or image.
    #[error("Missing ground truth: {0}")]
    MissingGroundTruth(String),

    /// Detection set and class list disagree.
    #[error("Class mismatch: {0}")]
    ClassMismatch(String),
}
