//! Detection matching: true/false positive assignment and false-positive
//! cause analysis for one class.

use crate::config::EvaluationConfig;
use crate::confusion::{ConfusionEntry, ConfusionMap};
use crate::error::Result;
use crate::metrics::ap::calculate_ap;
use crate::metrics::iou::{max_overlap, max_overlap_with_classes};
use crate::metrics::precision_recall::build_precision_recall_curve;
use crate::stats::{FpErrorHistogram, FpErrorKind};
use crate::types::{BoundingBox, ClassEvaluation, Detection, GroundTruth, GroundTruthRecord};
use tracing::{debug, warn};

/// Minimum own-class `IoU` for a miss to count as a localization error.
pub const LOCALIZATION_MIN_IOU: f64 = 0.1;

/// Minimum `IoU` with another class's box for a miss to count as confusion.
pub const CONFUSION_MIN_IOU: f64 = 0.1;

/// Which ground-truth boxes of one class have been claimed in this run.
///
/// Created fresh for every class evaluation, so repeated or concurrent runs
/// never see each other's matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedFlags {
    flags: Vec<Vec<bool>>,
}

impl DetectedFlags {
    /// All-false flags shaped like `records`.
    pub fn for_records(records: &[GroundTruthRecord]) -> Self {
        Self {
            flags: records.iter().map(|record| vec![false; record.len()]).collect(),
        }
    }

    pub fn is_detected(&self, image_index: usize, box_index: usize) -> bool {
        self.flags
            .get(image_index)
            .and_then(|flags| flags.get(box_index))
            .copied()
            .unwrap_or(false)
    }

    fn mark(&mut self, image_index: usize, box_index: usize) {
        if let Some(flag) = self
            .flags
            .get_mut(image_index)
            .and_then(|flags| flags.get_mut(box_index))
        {
            *flag = true;
        }
    }

    /// Number of claimed boxes.
    pub fn count(&self) -> usize {
        self.flags.iter().flatten().filter(|&&flag| flag).count()
    }
}

/// A detection of one class together with the image it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDetection {
    pub image_index: usize,
    pub bbox: BoundingBox,
    pub score: f64,
}

/// Result of matching a single detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Claimed a ground-truth box.
    TruePositive,
    /// Did not claim a box. `cause` is set only when classifying errors.
    FalsePositive { cause: Option<FpErrorKind> },
    /// Matched a difficult box; counts as neither TP nor FP.
    Ignored,
}

impl MatchOutcome {
    pub fn is_true_positive(self) -> bool {
        matches!(self, MatchOutcome::TruePositive)
    }

    pub fn is_false_positive(self) -> bool {
        matches!(self, MatchOutcome::FalsePositive { .. })
    }

    /// Histogram bucket of this outcome, if any.
    pub fn error_kind(self) -> Option<FpErrorKind> {
        match self {
            MatchOutcome::TruePositive => Some(FpErrorKind::TruePositive),
            MatchOutcome::FalsePositive { cause } => cause,
            MatchOutcome::Ignored => None,
        }
    }
}

/// Flatten per-image detections of one class and sort them by descending
/// score. Equal scores keep image order, then input order.
///
/// `offset` is added to every coordinate.
pub fn flatten_detections(per_image: &[Vec<Detection>], offset: f64) -> Vec<ScoredDetection> {
    let mut flattened: Vec<ScoredDetection> = per_image
        .iter()
        .enumerate()
        .flat_map(|(image_index, dets)| {
            dets.iter().map(move |det| ScoredDetection {
                image_index,
                bbox: det.bbox.shifted(offset),
                score: det.score,
            })
        })
        .collect();

    flattened.sort_by(|a, b| b.score.total_cmp(&a.score));
    flattened
}

/// Attribute a false positive that missed its own class to a cause.
///
/// `ovmax` is the best `IoU` against the detection's own class in its image.
pub fn classify_false_positive(
    ovmax: f64,
    detection: &ScoredDetection,
    ground_truth: &GroundTruth,
    confusion: &ConfusionEntry,
) -> Result<FpErrorKind> {
    if ovmax >= LOCALIZATION_MIN_IOU {
        return Ok(FpErrorKind::Localization);
    }

    let (_, sim_ovmax) = max_overlap_with_classes(
        &confusion.similar,
        detection.image_index,
        ground_truth,
        &detection.bbox,
    )?;
    let (_, otr_ovmax) = max_overlap_with_classes(
        &confusion.other,
        detection.image_index,
        ground_truth,
        &detection.bbox,
    )?;

    Ok(if sim_ovmax >= otr_ovmax && sim_ovmax > CONFUSION_MIN_IOU {
        FpErrorKind::Similar
    } else if otr_ovmax >= sim_ovmax && otr_ovmax > CONFUSION_MIN_IOU {
        FpErrorKind::Other
    } else {
        FpErrorKind::Background
    })
}

/// Walk detections in the given order and mark each as TP, FP or ignored.
///
/// `detections` must already be sorted by descending score: a box claimed by
/// an earlier detection turns later matches on it into duplicates. Causes
/// are attributed only when `confusion` is given.
///
/// # Errors
///
/// Returns an error if a detection refers to an image missing from the
/// ground truth of `class_name` (or of a class in `confusion`).
pub fn match_detections(
    class_name: &str,
    detections: &[ScoredDetection],
    ground_truth: &GroundTruth,
    flags: &mut DetectedFlags,
    overlap_threshold: f64,
    confusion: Option<&ConfusionEntry>,
) -> Result<Vec<MatchOutcome>> {
    let mut outcomes = Vec::with_capacity(detections.len());

    for detection in detections {
        let record = ground_truth.record(class_name, detection.image_index)?;
        let (ovmax, jmax) = max_overlap(&detection.bbox, &record.boxes);

        let outcome = match jmax {
            Some(j) if ovmax > overlap_threshold => {
                if record.difficult.get(j).copied().unwrap_or(false) {
                    MatchOutcome::Ignored
                } else if flags.is_detected(detection.image_index, j) {
                    MatchOutcome::FalsePositive {
                        cause: confusion.map(|_| FpErrorKind::Duplicate),
                    }
                } else {
                    flags.mark(detection.image_index, j);
                    MatchOutcome::TruePositive
                }
            }
            _ => {
                let cause = match confusion {
                    Some(entry) => Some(classify_false_positive(ovmax, detection, ground_truth, entry)?),
                    None => None,
                };
                MatchOutcome::FalsePositive { cause }
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Evaluate all detections of one class against its ground truth.
///
/// Detections are flattened across images, sorted by confidence, matched,
/// then turned into a precision-recall curve and AP. The false-positive
/// histogram is produced only when `confusions` is given and holds at least
/// one entry; an empty map means no analysis. A class without
/// detections yields an empty result without reading the ground truth.
pub fn evaluate_class(
    class_name: &str,
    per_image: &[Vec<Detection>],
    ground_truth: &GroundTruth,
    confusions: Option<&ConfusionMap>,
    config: &EvaluationConfig,
) -> Result<ClassEvaluation> {
    let detections = flatten_detections(per_image, config.detection_offset());
    if detections.is_empty() {
        return Ok(ClassEvaluation::default());
    }

    let records = ground_truth.records(class_name)?;
    let mut flags = DetectedFlags::for_records(records);

    let empty_entry = ConfusionEntry::default();
    let confusion = confusions.filter(|map| !map.is_empty()).map(|map| {
        map.get(class_name).unwrap_or_else(|| {
            warn!(class = class_name, "Class missing from confusion map, treating it as unconfusable");
            &empty_entry
        })
    });

    let outcomes = match_detections(
        class_name,
        &detections,
        ground_truth,
        &mut flags,
        config.overlap_threshold,
        confusion,
    )?;

    let true_positives: Vec<bool> = outcomes.iter().map(|o| o.is_true_positive()).collect();
    let false_positives: Vec<bool> = outcomes.iter().map(|o| o.is_false_positive()).collect();
    let curve = build_precision_recall_curve(
        &true_positives,
        &false_positives,
        ground_truth.num_boxes(class_name),
    );
    let ap = calculate_ap(&curve.recall, &curve.precision, config.use_07_metric);

    let errors = confusion.map(|_| {
        outcomes
            .iter()
            .filter_map(|o| o.error_kind())
            .collect::<FpErrorHistogram>()
    });

    debug!(
        class = class_name,
        detections = detections.len(),
        matched = flags.count(),
        ap,
        "Evaluated class"
    );

    Ok(ClassEvaluation { curve, ap, errors })
}
