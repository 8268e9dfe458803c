/// Non-Maximum Suppression (`NMS`) implementation
///
/// This module provides greedy hard `NMS` and the soft variant that decays
/// overlapping scores instead of discarding them. Suppression runs per
/// `(class, image)` pair; see [`apply_nms_to_detection_set`].

use crate::error::Result;
use crate::metrics::iou::calculate_iou;
use crate::threshold::{passes_confidence, validate_threshold};
use crate::types::{Detection, DetectionSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suppression parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NmsConfig {
    /// `IoU` above which a lower-scored detection is suppressed (or decayed).
    pub iou_threshold: f64,
    /// Decay scores by `(1 - IoU)` instead of discarding.
    pub soft: bool,
    /// Minimum score. In soft mode suppression stops once the best remaining
    /// score falls below it; after suppression, detections whose original
    /// score is not above it are dropped.
    pub conf_threshold: f64,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            soft: false,
            conf_threshold: 0.0,
        }
    }
}

impl NmsConfig {
    /// Hard suppression at the given `IoU` threshold.
    #[must_use]
    pub fn hard(iou_threshold: f64) -> Self {
        Self {
            iou_threshold,
            ..Self::default()
        }
    }

    /// Soft suppression at the given `IoU` and confidence thresholds.
    #[must_use]
    pub fn soft(iou_threshold: f64, conf_threshold: f64) -> Self {
        Self {
            iou_threshold,
            soft: true,
            conf_threshold,
        }
    }

    /// Check both thresholds lie in [0.0, 1.0].
    pub fn validate(&self) -> Result<()> {
        validate_threshold("NMS IoU", self.iou_threshold)?;
        validate_threshold("NMS confidence", self.conf_threshold)
    }
}

/// Output of [`apply_nms_to_detection_set`].
#[derive(Debug, Clone, PartialEq)]
pub struct NmsOutput {
    /// Surviving detections, indexed by `[class][image]`.
    pub detections: DetectionSet,
    /// Indices into the input slot of every kept detection.
    pub keep_indices: Vec<Vec<Vec<usize>>>,
}

/// Order indices by descending score; equal scores keep input order.
fn sort_by_score(order: &mut [usize], scores: &[f64]) {
    order.sort_by(|&a, &b| {
        scores[b].total_cmp(&scores[a]).then(a.cmp(&b))
    });
}

/// Apply Non-Maximum Suppression to the detections of one `(class, image)`.
///
/// Repeatedly keeps the highest-scored remaining detection. In hard mode
/// every remaining detection whose `IoU` with it exceeds the threshold is
/// dropped. In soft mode their scores are multiplied by `(1 - IoU)`, the
/// remainder is re-sorted, and the loop stops early once the best remaining
/// score is below `conf_threshold`.
///
/// # Arguments
///
/// * `detections` - Detections with bboxes and scores
/// * `config` - Suppression parameters
///
/// # Returns
///
/// Indices of the kept detections, in the order they were selected
///
/// # Errors
///
/// Returns error if a threshold is not in range [0.0, 1.0]
///
/// # Examples
///
/// ```
/// # use voc_eval::nms::{non_maximum_suppression, NmsConfig};
/// # use voc_eval::types::{BoundingBox, Detection};
/// let detections = vec![
///     Detection::new(BoundingBox::new(10.0, 10.0, 50.0, 50.0), 0.9),
///     Detection::new(BoundingBox::new(15.0, 15.0, 55.0, 55.0), 0.8),
///     Detection::new(BoundingBox::new(100.0, 100.0, 150.0, 150.0), 0.95),
/// ];
///
/// let keep = non_maximum_suppression(&detections, &NmsConfig::hard(0.5)).unwrap();
/// assert_eq!(keep, vec![2, 0]);
/// ```
pub fn non_maximum_suppression(detections: &[Detection], config: &NmsConfig) -> Result<Vec<usize>> {
    config.validate()?;

    let mut scores: Vec<f64> = detections.iter().map(|det| det.score).collect();
    let mut order: Vec<usize> = (0..detections.len()).collect();
    sort_by_score(&mut order, &scores);

    let mut keep = Vec::with_capacity(detections.len());

    while let Some(&top) = order.first() {
        keep.push(top);
        let rest = &order[1..];
        let top_bbox = &detections[top].bbox;

        if config.soft {
            let mut remaining = rest.to_vec();
            for &idx in &remaining {
                let iou = calculate_iou(top_bbox, &detections[idx].bbox);
                if iou > config.iou_threshold {
                    scores[idx] *= 1.0 - iou;
                }
            }
            sort_by_score(&mut remaining, &scores);

            if let Some(&next) = remaining.first() {
                if scores[next] < config.conf_threshold {
                    break;
                }
            }
            order = remaining;
        } else {
            order = rest
                .iter()
                .copied()
                .filter(|&idx| calculate_iou(top_bbox, &detections[idx].bbox) <= config.iou_threshold)
                .collect();
        }
    }

    Ok(keep)
}

/// Run suppression independently on every `(class, image)` pair.
///
/// A slot with a single detection is kept as is. When `conf_threshold` is
/// positive, kept detections whose score does not exceed it are removed
/// afterwards. Kept detections carry their original scores.
pub fn apply_nms_to_detection_set(set: &DetectionSet, config: &NmsConfig) -> Result<NmsOutput> {
    config.validate()?;

    let num_images = set.num_images();
    let mut detections = DetectionSet::new(set.num_classes(), num_images);
    let mut keep_indices = vec![vec![Vec::new(); num_images]; set.num_classes()];

    for class_index in 0..set.num_classes() {
        for image_index in 0..num_images {
            let dets = set.get(class_index, image_index);
            if dets.is_empty() {
                continue;
            }

            let mut keep = if dets.len() == 1 {
                vec![0]
            } else {
                non_maximum_suppression(dets, config)?
            };
            keep.retain(|&idx| passes_confidence(dets[idx].score, config.conf_threshold));

            for &idx in &keep {
                detections.push(class_index, image_index, dets[idx])?;
            }
            keep_indices[class_index][image_index] = keep;
        }
    }

    debug!(
        before = set.len(),
        after = detections.len(),
        soft = config.soft,
        "Applied non-maximum suppression"
    );

    Ok(NmsOutput {
        detections,
        keep_indices,
    })
}
