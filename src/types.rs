//! Core data types for detections, ground truth and evaluation results.

use crate::error::{Result, VocEvalError};
use crate::stats::FpErrorHistogram;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Name of the reserved background class. It is never scored.
pub const BACKGROUND_CLASS: &str = "__background__";

/// Represents a bounding box in VOC format (x1, y1, x2, y2).
///
/// Coordinates follow the inclusive pixel convention: a box spanning
/// columns 10 through 19 has `x1 = 10`, `x2 = 19` and a width of 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from the first four values of a slice.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() < 4 {
            return Err(VocEvalError::InvalidBoundingBox(format!(
                "Expected 4 values, got {}",
                values.len()
            )));
        }
        if values[..4].iter().any(|v| !v.is_finite()) {
            return Err(VocEvalError::InvalidBoundingBox(format!(
                "Non-finite coordinate in {:?}",
                &values[..4]
            )));
        }
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Inclusive width (`x2 - x1 + 1`).
    pub fn width(&self) -> f64 {
        self.x2 - self.x1 + 1.0
    }

    /// Inclusive height (`y2 - y1 + 1`).
    pub fn height(&self) -> f64 {
        self.y2 - self.y1 + 1.0
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check that the corners are ordered (`x2 >= x1`, `y2 >= y1`).
    pub fn is_valid(&self) -> bool {
        self.x2 >= self.x1 && self.y2 >= self.y1
    }

    /// Translate every coordinate by `offset`.
    pub fn shifted(&self, offset: f64) -> Self {
        Self::new(
            self.x1 + offset,
            self.y1 + offset,
            self.x2 + offset,
            self.y2 + offset,
        )
    }
}

/// A single scored detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f64,
}

impl Detection {
    /// Create a new detection.
    pub fn new(bbox: BoundingBox, score: f64) -> Self {
        Self { bbox, score }
    }

    /// True when every coordinate and the score are finite.
    pub fn is_finite(&self) -> bool {
        let BoundingBox { x1, y1, x2, y2 } = self.bbox;
        [x1, y1, x2, y2, self.score].iter().all(|v| v.is_finite())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(VocEvalError::InvalidDetection(format!(
                "Non-finite value in {self:?}"
            )));
        }
        Ok(())
    }

    /// Parse a detector output row: four coordinates followed by anything,
    /// with the confidence score in the last column.
    pub fn from_row(row: &[f64]) -> Result<Self> {
        if row.len() < 5 {
            return Err(VocEvalError::InvalidDetection(format!(
                "Expected at least 5 columns (x1, y1, x2, y2, score), got {}",
                row.len()
            )));
        }
        let bbox = BoundingBox::from_slice(row)?;
        let score = row[row.len() - 1];
        if !score.is_finite() {
            return Err(VocEvalError::InvalidDetection(format!(
                "Non-finite score {score}"
            )));
        }
        Ok(Self::new(bbox, score))
    }
}

/// All detections of an evaluation run, indexed by `[class][image]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    boxes: Vec<Vec<Vec<Detection>>>,
}

impl DetectionSet {
    /// Create an empty set with `num_classes x num_images` slots.
    pub fn new(num_classes: usize, num_images: usize) -> Self {
        Self {
            boxes: vec![vec![Vec::new(); num_images]; num_classes],
        }
    }

    /// Wrap nested detections. Every class must cover the same images.
    pub fn from_nested(boxes: Vec<Vec<Vec<Detection>>>) -> Result<Self> {
        if let Some(first) = boxes.first() {
            let num_images = first.len();
            if let Some((class_index, per_image)) = boxes
                .iter()
                .enumerate()
                .find(|(_, per_image)| per_image.len() != num_images)
            {
                return Err(VocEvalError::InvalidDetection(format!(
                    "Class {} has {} images, expected {}",
                    class_index,
                    per_image.len(),
                    num_images
                )));
            }
        }
        Ok(Self { boxes })
    }

    /// Build a set from raw detector rows indexed by `[class][image][roi]`.
    pub fn from_rows(rows: &[Vec<Vec<Vec<f64>>>]) -> Result<Self> {
        let boxes = rows
            .iter()
            .map(|per_image| {
                per_image
                    .iter()
                    .map(|dets| {
                        dets.iter()
                            .map(|row| Detection::from_row(row))
                            .collect::<Result<Vec<Detection>>>()
                    })
                    .collect::<Result<Vec<Vec<Detection>>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_nested(boxes)
    }

    /// Append a detection to a `(class, image)` slot.
    pub fn push(&mut self, class_index: usize, image_index: usize, detection: Detection) -> Result<()> {
        let slot = self
            .boxes
            .get_mut(class_index)
            .and_then(|per_image| per_image.get_mut(image_index))
            .ok_or_else(|| {
                VocEvalError::InvalidDetection(format!(
                    "No slot for class {class_index}, image {image_index}"
                ))
            })?;
        slot.push(detection);
        Ok(())
    }

    /// Reject the first detection holding a NaN or infinite value.
    ///
    /// The error names the offending `(class, image)` slot.
    pub fn validate(&self) -> Result<()> {
        for (class_index, per_image) in self.boxes.iter().enumerate() {
            for (image_index, dets) in per_image.iter().enumerate() {
                if let Some(det) = dets.iter().find(|det| !det.is_finite()) {
                    return Err(VocEvalError::InvalidDetection(format!(
                        "Class {class_index}, image {image_index}: non-finite value in {det:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.boxes.len()
    }

    pub fn num_images(&self) -> usize {
        self.boxes.first().map_or(0, Vec::len)
    }

    /// Detections of one class, indexed by image.
    pub fn class(&self, class_index: usize) -> &[Vec<Detection>] {
        self.boxes.get(class_index).map_or(&[], Vec::as_slice)
    }

    /// Detections of one `(class, image)` pair.
    pub fn get(&self, class_index: usize, image_index: usize) -> &[Detection] {
        self.class(class_index)
            .get(image_index)
            .map_or(&[], Vec::as_slice)
    }

    /// Total number of detections across all classes and images.
    pub fn len(&self) -> usize {
        self.boxes.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ground-truth boxes of one class in one image.
///
/// `difficult` runs parallel to `boxes`. Which boxes have already been
/// claimed during a run is tracked separately by
/// [`DetectedFlags`](crate::matching::DetectedFlags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    pub boxes: Vec<BoundingBox>,
    pub difficult: Vec<bool>,
}

impl GroundTruthRecord {
    pub fn new(boxes: Vec<BoundingBox>, difficult: Vec<bool>) -> Result<Self> {
        if boxes.len() != difficult.len() {
            return Err(VocEvalError::InvalidGroundTruth(format!(
                "{} boxes but {} difficult flags",
                boxes.len(),
                difficult.len()
            )));
        }
        Ok(Self { boxes, difficult })
    }

    /// Record where no box is marked difficult.
    pub fn from_boxes(boxes: Vec<BoundingBox>) -> Self {
        let difficult = vec![false; boxes.len()];
        Self { boxes, difficult }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Ground truth keyed by class name, then by image index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    classes: HashMap<String, Vec<GroundTruthRecord>>,
}

impl GroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-image records of a class, replacing any previous ones.
    pub fn insert(&mut self, class_name: impl Into<String>, records: Vec<GroundTruthRecord>) {
        self.classes.insert(class_name.into(), records);
    }

    pub fn contains_class(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Per-image records of a class.
    pub fn records(&self, class_name: &str) -> Result<&[GroundTruthRecord]> {
        self.classes
            .get(class_name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                VocEvalError::MissingGroundTruth(format!("No ground truth for class '{class_name}'"))
            })
    }

    /// Record of one `(class, image)` pair.
    pub fn record(&self, class_name: &str, image_index: usize) -> Result<&GroundTruthRecord> {
        self.records(class_name)?.get(image_index).ok_or_else(|| {
            VocEvalError::MissingGroundTruth(format!(
                "No ground truth for class '{class_name}' in image {image_index}"
            ))
        })
    }

    /// Number of boxes of a class across all images, difficult ones included.
    pub fn num_boxes(&self, class_name: &str) -> usize {
        self.classes
            .get(class_name)
            .map_or(0, |records| records.iter().map(GroundTruthRecord::len).sum())
    }
}

/// Precision-recall curve, index-aligned to detections in descending
/// confidence order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallCurve {
    pub recall: Vec<f64>,
    pub precision: Vec<f64>,
}

impl PrecisionRecallCurve {
    pub fn len(&self) -> usize {
        self.recall.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recall.is_empty()
    }
}

/// Evaluation outcome of a single class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassEvaluation {
    pub curve: PrecisionRecallCurve,
    pub ap: f64,
    /// Present only when a confusion map was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FpErrorHistogram>,
}

/// Output of a full evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Average precision per scored class.
    pub ap_by_class: BTreeMap<String, f64>,
    /// False-positive analysis per class, `None` when no class produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fp_errors: Option<BTreeMap<String, FpErrorHistogram>>,
}

impl EvaluationResult {
    /// Mean of the per-class AP values.
    pub fn mean_ap(&self) -> f64 {
        let aps: Vec<f64> = self.ap_by_class.values().copied().collect();
        crate::metrics::ap::calculate_map(&aps)
    }

    /// Error histograms of all classes added together.
    pub fn total_fp_errors(&self) -> Option<FpErrorHistogram> {
        self.fp_errors.as_ref().map(|per_class| {
            let mut total = FpErrorHistogram::new();
            for histogram in per_class.values() {
                total.merge(histogram);
            }
            total
        })
    }

    /// Serialize the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
