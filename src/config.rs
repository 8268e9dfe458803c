//! Configuration for an evaluation run.

use crate::error::Result;
use crate::nms::NmsConfig;
use crate::threshold::validate_threshold;
use serde::{Deserialize, Serialize};

/// Configuration for [`evaluate_detections`](crate::evaluator::evaluate_detections).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// A detection matches a ground-truth box when their `IoU` exceeds this.
    pub overlap_threshold: f64,

    /// Use the VOC2007 11-point AP instead of the exact area.
    pub use_07_metric: bool,

    /// Run NMS on every `(class, image)` pair before matching.
    pub apply_nms: bool,

    /// Parameters for the NMS stage.
    pub nms: NmsConfig,

    /// Add 1 to every detection coordinate, converting 0-based detector
    /// output to the 1-based ground-truth convention.
    pub shift_detections_to_one_based: bool,

    /// Evaluate classes in parallel (via rayon).
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
            use_07_metric: false,
            apply_nms: true,
            nms: NmsConfig::default(),
            shift_detections_to_one_based: true,
            parallel: true,
        }
    }
}

impl EvaluationConfig {
    /// VOC2007 protocol: 11-point AP, otherwise defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use voc_eval::EvaluationConfig;
    ///
    /// let config = EvaluationConfig::voc2007();
    /// assert!(config.use_07_metric);
    /// ```
    #[must_use]
    pub fn voc2007() -> Self {
        Self {
            use_07_metric: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_overlap_threshold(mut self, overlap_threshold: f64) -> Self {
        self.overlap_threshold = overlap_threshold;
        self
    }

    #[must_use]
    pub fn with_07_metric(mut self, use_07_metric: bool) -> Self {
        self.use_07_metric = use_07_metric;
        self
    }

    /// Enable NMS with the given parameters.
    #[must_use]
    pub fn with_nms(mut self, nms: NmsConfig) -> Self {
        self.apply_nms = true;
        self.nms = nms;
        self
    }

    #[must_use]
    pub fn without_nms(mut self) -> Self {
        self.apply_nms = false;
        self
    }

    #[must_use]
    pub fn with_detection_shift(mut self, shift: bool) -> Self {
        self.shift_detections_to_one_based = shift;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Offset added to detection coordinates before matching.
    pub fn detection_offset(&self) -> f64 {
        if self.shift_detections_to_one_based {
            1.0
        } else {
            0.0
        }
    }

    /// Check every threshold lies in [0.0, 1.0].
    pub fn validate(&self) -> Result<()> {
        validate_threshold("overlap", self.overlap_threshold)?;
        if self.apply_nms {
            self.nms.validate()?;
        }
        Ok(())
    }
}
