//! # voc-eval
//!
//! A Rust library for PASCAL VOC style object detection evaluation with
//! false-positive error analysis.
//!
//! This library provides:
//! - **NMS** (hard and soft Non-Maximum Suppression) per class and image
//! - **IoU** with the inclusive pixel convention used by VOC annotations
//! - **TP/FP matching** that respects difficult boxes and duplicate hits
//! - **AP** with either the VOC2007 11-point method or the exact area
//! - **False-positive analysis**: localization errors, confusion with similar
//!   or unrelated classes, background hits and duplicates
//!
//! ## Quick Start
//!
//! ```rust
//! use voc_eval::{
//!     evaluate_detections, BoundingBox, Detection, DetectionSet, EvaluationConfig,
//!     GroundTruth, GroundTruthRecord,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classes = vec!["__background__".to_string(), "person".to_string()];
//!
//! let mut ground_truth = GroundTruth::new();
//! ground_truth.insert(
//!     "person",
//!     vec![GroundTruthRecord::from_boxes(vec![BoundingBox::new(11.0, 11.0, 60.0, 60.0)])],
//! );
//!
//! // Detector output is 0-based; it is shifted by one before matching
//! let mut detections = DetectionSet::new(classes.len(), 1);
//! detections.push(1, 0, Detection::from_row(&[10.0, 10.0, 59.0, 59.0, 0.92])?)?;
//!
//! let result = evaluate_detections(
//!     &detections,
//!     &ground_truth,
//!     &classes,
//!     None,
//!     &EvaluationConfig::default(),
//! )?;
//! assert!((result.ap_by_class["person"] - 1.0).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Confusion map
//!
//! Passing a [`ConfusionMap`] turns on false-positive analysis. The map is
//! built from lines of colon-separated class names that are easy to mix up:
//!
//! ```text
//! cat:dog
//! car:truck:bus
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod threshold;
pub mod metrics;
pub mod nms;
pub mod confusion;
pub mod stats;
pub mod matching;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{Result, VocEvalError};
pub use types::{
    BoundingBox, ClassEvaluation, Detection, DetectionSet, EvaluationResult, GroundTruth,
    GroundTruthRecord, PrecisionRecallCurve, BACKGROUND_CLASS,
};
pub use config::EvaluationConfig;
pub use confusion::{ConfusionEntry, ConfusionMap};
pub use stats::{FpErrorHistogram, FpErrorKind};
pub use nms::{apply_nms_to_detection_set, non_maximum_suppression, NmsConfig};
pub use matching::evaluate_class;
pub use evaluator::{evaluate_classes, evaluate_detections};
