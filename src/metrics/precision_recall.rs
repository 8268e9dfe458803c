//! Precision and Recall calculation.

use crate::types::PrecisionRecallCurve;

/// Build the precision-recall curve from per-detection outcomes.
///
/// # Arguments
///
/// * `true_positives` - Whether each detection is a true positive (sorted by confidence)
/// * `false_positives` - Whether each detection is a false positive, same order.
///   A detection can be neither, e.g. when it matched a difficult box.
/// * `num_ground_truth` - Total number of ground truth boxes, difficult ones included
///
/// # Returns
///
/// Cumulative recall and precision, one point per detection. Precision
/// divides by at least `f64::EPSILON`; recall is all zero when there is no
/// ground truth.
///
/// # Example
///
/// ```
/// use voc_eval::metrics::precision_recall::build_precision_recall_curve;
///
/// let curve = build_precision_recall_curve(&[true, false, true], &[false, true, false], 4);
/// assert_eq!(curve.recall, vec![0.25, 0.25, 0.5]);
/// assert!((curve.precision[2] - 2.0 / 3.0).abs() < 1e-10);
/// ```
pub fn build_precision_recall_curve(
    true_positives: &[bool],
    false_positives: &[bool],
    num_ground_truth: usize,
) -> PrecisionRecallCurve {
    let mut curve = PrecisionRecallCurve {
        recall: Vec::with_capacity(true_positives.len()),
        precision: Vec::with_capacity(true_positives.len()),
    };

    let mut tp = 0usize;
    let mut fp = 0usize;

    for (&is_tp, &is_fp) in true_positives.iter().zip(false_positives) {
        tp += usize::from(is_tp);
        fp += usize::from(is_fp);

        let precision = tp as f64 / ((tp + fp) as f64).max(f64::EPSILON);
        let recall = if num_ground_truth > 0 {
            tp as f64 / num_ground_truth as f64
        } else {
            0.0
        };

        curve.precision.push(precision);
        curve.recall.push(recall);
    }

    curve
}

/// Highest precision among points with recall at least `recall_level`.
///
/// Returns 0.0 when no point reaches that recall.
pub fn max_precision_at_recall(precision: &[f64], recall: &[f64], recall_level: f64) -> f64 {
    precision
        .iter()
        .zip(recall.iter())
        .filter(|(_, &r)| r >= recall_level)
        .map(|(&p, _)| p)
        .fold(0.0f64, |a, b| a.max(b))
}

/// Make precision monotonically non-increasing by propagating the maximum
/// from the right.
pub fn precision_envelope(precision: &mut [f64]) {
    for i in (1..precision.len()).rev() {
        precision[i - 1] = precision[i - 1].max(precision[i]);
    }
}
