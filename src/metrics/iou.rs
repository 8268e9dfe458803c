//! Intersection over Union (IoU) calculation.

use crate::error::Result;
use crate::types::{BoundingBox, GroundTruth};

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// Uses the inclusive pixel convention, so the intersection of two boxes
/// sharing a single column still has a width of 1.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Example
///
/// ```
/// use voc_eval::metrics::iou::calculate_iou;
/// use voc_eval::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.0, 0.0, 9.0, 9.0);
/// let bbox2 = BoundingBox::new(5.0, 5.0, 14.0, 14.0);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!((iou - 25.0 / 175.0).abs() < 1e-10);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let x_left = bbox1.x1.max(bbox2.x1);
    let y_top = bbox1.y1.max(bbox2.y1);
    let x_right = bbox1.x2.min(bbox2.x2);
    let y_bottom = bbox1.y2.min(bbox2.y2);

    let intersection_width = (x_right - x_left + 1.0).max(0.0);
    let intersection_height = (y_bottom - y_top + 1.0).max(0.0);
    let intersection_area = intersection_width * intersection_height;

    let union_area = bbox1.area() + bbox2.area() - intersection_area;

    // Degenerate boxes
    if union_area <= 0.0 {
        return 0.0;
    }

    intersection_area / union_area
}

/// Best IoU of `bbox` against a list of boxes and the index achieving it.
///
/// Returns `(f64::NEG_INFINITY, None)` when `boxes` is empty. Ties keep the
/// lowest index.
pub fn max_overlap(bbox: &BoundingBox, boxes: &[BoundingBox]) -> (f64, Option<usize>) {
    boxes
        .iter()
        .enumerate()
        .fold((f64::NEG_INFINITY, None), |(best, best_idx), (idx, other)| {
            let iou = calculate_iou(bbox, other);
            if best_idx.is_none() || iou > best {
                (iou, Some(idx))
            } else {
                (best, best_idx)
            }
        })
}

/// Best IoU of `bbox` against the ground truth of `class_name` in one image.
///
/// # Errors
///
/// Returns [`MissingGroundTruth`](crate::VocEvalError::MissingGroundTruth)
/// if the class or image is absent from `ground_truth`.
pub fn max_overlap_with_class(
    class_name: &str,
    image_index: usize,
    ground_truth: &GroundTruth,
    bbox: &BoundingBox,
) -> Result<(f64, Option<usize>)> {
    let record = ground_truth.record(class_name, image_index)?;
    Ok(max_overlap(bbox, &record.boxes))
}

/// Best IoU of `bbox` across the ground truth of several classes.
///
/// Returns the winning class along with its IoU. An empty candidate list
/// yields `(None, 0.0)`, meaning no comparison was possible. A candidate
/// class without boxes in this image contributes negative infinity.
pub fn max_overlap_with_classes<'a, I>(
    classes: I,
    image_index: usize,
    ground_truth: &GroundTruth,
    bbox: &BoundingBox,
) -> Result<(Option<&'a str>, f64)>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for class_name in classes {
        let (iou, _) = max_overlap_with_class(class_name, image_index, ground_truth, bbox)?;
        match best {
            Some((_, best_iou)) if iou <= best_iou => {}
            _ => best = Some((class_name.as_str(), iou)),
        }
    }

    Ok(match best {
        Some((class_name, iou)) => (Some(class_name), iou),
        None => (None, 0.0),
    })
}
