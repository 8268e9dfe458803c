//! Main evaluation orchestrator for VOC-style detection metrics.

use crate::config::EvaluationConfig;
use crate::confusion::ConfusionMap;
use crate::error::{Result, VocEvalError};
use crate::matching::evaluate_class;
use crate::nms::apply_nms_to_detection_set;
use crate::types::{
    ClassEvaluation, DetectionSet, EvaluationResult, GroundTruth, BACKGROUND_CLASS,
};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::info;

/// Evaluate detections against ground truth.
///
/// **Independent per-class evaluation**: NMS (if enabled) runs per
/// `(class, image)` pair, then every class except the background is matched
/// and scored on its own, in parallel when `config.parallel` is set.
///
/// # Arguments
///
/// * `detections` - Detections indexed by `[class][image]`, class order as in `classes`
/// * `ground_truth` - Ground truth keyed by class name, then image index
/// * `classes` - Class names; [`BACKGROUND_CLASS`] is skipped
/// * `confusions` - Enables false-positive cause analysis when given
/// * `config` - Thresholds and switches for the run
///
/// # Returns
///
/// Per-class AP and, if any class produced one, per-class error histograms.
///
/// # Errors
///
/// Returns an error on invalid thresholds, on a non-finite detection value,
/// when `detections` does not have one entry per class, or when a detection
/// refers to missing ground truth.
pub fn evaluate_detections<S: AsRef<str> + Sync>(
    detections: &DetectionSet,
    ground_truth: &GroundTruth,
    classes: &[S],
    confusions: Option<&ConfusionMap>,
    config: &EvaluationConfig,
) -> Result<EvaluationResult> {
    let evaluations = evaluate_classes(detections, ground_truth, classes, confusions, config)?;

    let mut result = EvaluationResult::default();
    let mut fp_errors = BTreeMap::new();
    for (class_name, evaluation) in evaluations {
        if let Some(errors) = evaluation.errors {
            fp_errors.insert(class_name.clone(), errors);
        }
        result.ap_by_class.insert(class_name, evaluation.ap);
    }
    if !fp_errors.is_empty() {
        result.fp_errors = Some(fp_errors);
    }

    info!(
        classes = result.ap_by_class.len(),
        mean_ap = result.mean_ap(),
        "Evaluation finished"
    );

    Ok(result)
}

/// Same as [`evaluate_detections`], but keeps the full per-class results,
/// precision-recall curves included.
pub fn evaluate_classes<S: AsRef<str> + Sync>(
    detections: &DetectionSet,
    ground_truth: &GroundTruth,
    classes: &[S],
    confusions: Option<&ConfusionMap>,
    config: &EvaluationConfig,
) -> Result<BTreeMap<String, ClassEvaluation>> {
    config.validate()?;
    detections.validate()?;

    if detections.num_classes() != classes.len() {
        return Err(VocEvalError::ClassMismatch(format!(
            "Detections cover {} classes, class list has {}",
            detections.num_classes(),
            classes.len()
        )));
    }

    let detections: Cow<'_, DetectionSet> = if config.apply_nms {
        info!(rois = detections.len(), "Number of detections before non-maximum suppression");
        let output = apply_nms_to_detection_set(detections, &config.nms)?;
        info!(rois = output.detections.len(), "Number of detections after non-maximum suppression");
        Cow::Owned(output.detections)
    } else {
        info!("Skipping non-maximum suppression");
        Cow::Borrowed(detections)
    };

    let scored: Vec<(usize, &str)> = classes
        .iter()
        .map(AsRef::<str>::as_ref)
        .enumerate()
        .filter(|&(_, name)| name != BACKGROUND_CLASS)
        .collect();

    let run = |&(class_index, class_name): &(usize, &str)| -> Result<(String, ClassEvaluation)> {
        let evaluation = evaluate_class(
            class_name,
            detections.class(class_index),
            ground_truth,
            confusions,
            config,
        )?;
        Ok((class_name.to_string(), evaluation))
    };

    let evaluations: Vec<(String, ClassEvaluation)> = if config.parallel {
        scored.par_iter().map(run).collect::<Result<_>>()?
    } else {
        scored.iter().map(run).collect::<Result<_>>()?
    };

    Ok(evaluations.into_iter().collect())
}
