//! Average Precision (AP) and mean Average Precision (mAP) calculation.

use crate::metrics::precision_recall::{max_precision_at_recall, precision_envelope};

/// Calculate Average Precision (AP) from a precision-recall curve.
///
/// With `use_07_metric` the VOC2007 11-point interpolation is used: the
/// maximum precision at recall ≥ t is averaged over t = 0.0, 0.1, ..., 1.0.
/// Otherwise the area under the precision envelope is integrated exactly,
/// summing `Δrecall * precision` wherever recall changes.
///
/// # Arguments
///
/// * `recalls` - Recall values in detection order
/// * `precisions` - Precision values, index-aligned with `recalls`
/// * `use_07_metric` - Select the 11-point method
///
/// # Returns
///
/// Returns the Average Precision value (0.0 to 1.0).
///
/// # Example
///
/// ```
/// use voc_eval::metrics::ap::calculate_ap;
///
/// let ap = calculate_ap(&[0.5, 1.0], &[1.0, 0.5], false);
/// assert!((ap - 0.75).abs() < 1e-10);
/// ```
pub fn calculate_ap(recalls: &[f64], precisions: &[f64], use_07_metric: bool) -> f64 {
    if use_07_metric {
        eleven_point_ap(recalls, precisions)
    } else {
        continuous_ap(recalls, precisions)
    }
}

fn eleven_point_ap(recalls: &[f64], precisions: &[f64]) -> f64 {
    // Same levels as stepping 0.1 from 0.0, including its rounding
    let total: f64 = (0..=10)
        .map(|i| max_precision_at_recall(precisions, recalls, i as f64 * 0.1))
        .sum();
    total / 11.0
}

fn continuous_ap(recalls: &[f64], precisions: &[f64]) -> f64 {
    let n = recalls.len().min(precisions.len());

    let mut mrec = Vec::with_capacity(n + 2);
    mrec.push(0.0);
    mrec.extend_from_slice(&recalls[..n]);
    mrec.push(1.0);

    let mut mpre = Vec::with_capacity(n + 2);
    mpre.push(0.0);
    mpre.extend_from_slice(&precisions[..n]);
    mpre.push(0.0);

    precision_envelope(&mut mpre);

    (0..mrec.len() - 1)
        .filter(|&i| mrec[i + 1] != mrec[i])
        .map(|i| (mrec[i + 1] - mrec[i]) * mpre[i + 1])
        .sum()
}

/// Calculate mean Average Precision (mAP) across multiple classes.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::ap::calculate_map;
///
/// let class_aps = vec![0.8, 0.9, 0.75, 0.85];
/// let map = calculate_map(&class_aps);
/// assert!((map - 0.825).abs() < 1e-10);
/// ```
pub fn calculate_map(class_aps: &[f64]) -> f64 {
    if class_aps.is_empty() {
        return 0.0;
    }

    class_aps.iter().sum::<f64>() / class_aps.len() as f64
}
