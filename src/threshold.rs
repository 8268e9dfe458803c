//! Threshold validation and confidence filtering.

use crate::error::{Result, VocEvalError};

/// Check whether a score survives a confidence threshold.
///
/// A threshold of zero or less disables filtering, otherwise the score must
/// be strictly greater than the threshold.
///
/// # Example
///
/// ```
/// use voc_eval::threshold::passes_confidence;
///
/// assert!(passes_confidence(0.9, 0.5));
/// assert!(!passes_confidence(0.5, 0.5));
/// assert!(passes_confidence(0.0, 0.0));
/// ```
pub fn passes_confidence(score: f64, threshold: f64) -> bool {
    threshold <= 0.0 || score > threshold
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(name: &str, threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(VocEvalError::InvalidThreshold(format!(
            "{name} threshold must be between 0.0 and 1.0, got {threshold}"
        )));
    }
    Ok(())
}
