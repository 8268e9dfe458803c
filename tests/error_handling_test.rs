//! Error handling and validation tests.

use voc_eval::confusion::ConfusionMap;
use voc_eval::error::VocEvalError;
use voc_eval::evaluator::evaluate_detections;
use voc_eval::nms::{apply_nms_to_detection_set, non_maximum_suppression, NmsConfig};
use voc_eval::types::{
    BoundingBox, Detection, DetectionSet, GroundTruth, GroundTruthRecord, BACKGROUND_CLASS,
};
use voc_eval::EvaluationConfig;

fn create_detection(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> Detection {
    Detection::new(BoundingBox::new(x1, y1, x2, y2), score)
}

fn classes() -> Vec<String> {
    vec![
        BACKGROUND_CLASS.to_string(),
        "bird".to_string(),
        "plane".to_string(),
    ]
}

fn ground_truth() -> GroundTruth {
    let mut gt = GroundTruth::new();
    gt.insert(
        "bird",
        vec![GroundTruthRecord::from_boxes(vec![BoundingBox::new(0.0, 0.0, 9.0, 9.0)])],
    );
    gt
}

// ============================================================================
// INPUT PARSING ERROR TESTS
// ============================================================================

#[test]
fn test_detection_row_too_short() {
    let result = Detection::from_row(&[1.0, 2.0, 3.0, 4.0]);
    assert!(result.is_err(), "Should fail without a score column");

    if let Err(VocEvalError::InvalidDetection(msg)) = result {
        assert!(msg.contains("5 columns"));
    } else {
        panic!("Expected InvalidDetection error");
    }
}

#[test]
fn test_detection_row_non_finite() {
    assert!(matches!(
        Detection::from_row(&[f64::NAN, 0.0, 1.0, 1.0, 0.5]),
        Err(VocEvalError::InvalidBoundingBox(_))
    ));
    assert!(matches!(
        Detection::from_row(&[0.0, 0.0, 1.0, 1.0, f64::INFINITY]),
        Err(VocEvalError::InvalidDetection(_))
    ));
}

#[test]
fn test_from_rows_propagates_bad_row() {
    let rows = vec![vec![vec![vec![0.0, 0.0, 1.0, 1.0, 0.9], vec![0.0, 0.0]]]];
    assert!(DetectionSet::from_rows(&rows).is_err());
}

#[test]
fn test_ground_truth_flag_mismatch() {
    let result = GroundTruthRecord::new(vec![BoundingBox::new(0.0, 0.0, 1.0, 1.0); 2], vec![false]);
    assert!(matches!(result, Err(VocEvalError::InvalidGroundTruth(_))));
}

#[test]
fn test_missing_confusion_file() {
    let result = ConfusionMap::load_from_file(&classes(), "/nonexistent/path/confusions.txt");
    assert!(matches!(result, Err(VocEvalError::IoError(_))));
}

// ============================================================================
// THRESHOLD ERROR TESTS
// ============================================================================

#[test]
fn test_invalid_confidence_threshold() {
    let mut set = DetectionSet::new(1, 1);
    set.push(0, 0, create_detection(0.0, 0.0, 1.0, 1.0, 0.5)).unwrap();

    let with_conf = |conf_threshold| NmsConfig {
        conf_threshold,
        ..NmsConfig::default()
    };
    assert!(apply_nms_to_detection_set(&set, &with_conf(-0.1)).is_err());
    assert!(apply_nms_to_detection_set(&set, &with_conf(1.1)).is_err());
    assert!(apply_nms_to_detection_set(&set, &with_conf(0.0)).is_ok());
    assert!(apply_nms_to_detection_set(&set, &with_conf(1.0)).is_ok());
}

#[test]
fn test_invalid_nms_thresholds() {
    let detections = vec![create_detection(0.0, 0.0, 1.0, 1.0, 0.5)];

    let result = non_maximum_suppression(&detections, &NmsConfig::hard(1.5));
    assert!(matches!(result, Err(VocEvalError::InvalidThreshold(_))));

    let result = non_maximum_suppression(&detections, &NmsConfig::soft(0.3, -1.0));
    assert!(matches!(result, Err(VocEvalError::InvalidThreshold(_))));
}

#[test]
fn test_invalid_overlap_threshold() {
    let result = evaluate_detections(
        &DetectionSet::new(3, 1),
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default().with_overlap_threshold(2.0),
    );
    assert!(matches!(result, Err(VocEvalError::InvalidThreshold(_))));
}

// ============================================================================
// EVALUATION ERROR TESTS
// ============================================================================

#[test]
fn test_class_count_mismatch() {
    let result = evaluate_detections(
        &DetectionSet::new(2, 1),
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default(),
    );

    if let Err(VocEvalError::ClassMismatch(msg)) = result {
        assert!(msg.contains("2 classes"));
    } else {
        panic!("Expected ClassMismatch error");
    }
}

#[test]
fn test_detection_for_class_without_ground_truth() {
    let mut detections = DetectionSet::new(3, 1);
    detections.push(2, 0, create_detection(0.0, 0.0, 9.0, 9.0, 0.9)).unwrap();

    let result = evaluate_detections(
        &detections,
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default(),
    );
    assert!(matches!(result, Err(VocEvalError::MissingGroundTruth(_))));
}

#[test]
fn test_detection_in_image_without_ground_truth() {
    let mut detections = DetectionSet::new(3, 2);
    detections.push(1, 1, create_detection(0.0, 0.0, 9.0, 9.0, 0.9)).unwrap();

    let result = evaluate_detections(
        &detections,
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default(),
    );
    assert!(matches!(result, Err(VocEvalError::MissingGroundTruth(_))));
}

#[test]
fn test_confusion_class_without_ground_truth() {
    // A miss on "bird" consults "plane", which has no ground truth
    let mut detections = DetectionSet::new(3, 1);
    detections.push(1, 0, create_detection(100.0, 100.0, 120.0, 120.0, 0.9)).unwrap();
    let confusions = ConfusionMap::parse(&classes(), "bird:plane");

    let result = evaluate_detections(
        &detections,
        &ground_truth(),
        &classes(),
        Some(&confusions),
        &EvaluationConfig::default(),
    );
    assert!(matches!(result, Err(VocEvalError::MissingGroundTruth(_))));

    // Without confusion analysis the same input evaluates fine
    let result = evaluate_detections(
        &detections,
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default(),
    );
    assert!(result.is_ok());
}

#[test]
fn test_non_finite_score_rejected() {
    let mut detections = DetectionSet::new(3, 1);
    detections.push(1, 0, create_detection(0.0, 0.0, 9.0, 9.0, f64::NAN)).unwrap();

    let result = evaluate_detections(
        &detections,
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default().without_nms(),
    );
    if let Err(VocEvalError::InvalidDetection(msg)) = result {
        assert!(msg.contains("Class 1, image 0"));
    } else {
        panic!("Expected InvalidDetection error");
    }
}

#[test]
fn test_non_finite_coordinates_rejected() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut detections = DetectionSet::new(3, 1);
        detections.push(1, 0, create_detection(0.0, 0.0, 9.0, 9.0, 0.9)).unwrap();
        detections.push(1, 0, create_detection(bad, 0.0, 9.0, 9.0, 0.8)).unwrap();

        let result = evaluate_detections(
            &detections,
            &ground_truth(),
            &classes(),
            None,
            &EvaluationConfig::default(),
        );
        assert!(
            matches!(result, Err(VocEvalError::InvalidDetection(_))),
            "coordinate {bad} should be rejected"
        );
    }
}

#[test]
fn test_non_finite_from_nested_rejected() {
    let nested = vec![
        vec![vec![]],
        vec![vec![create_detection(0.0, 0.0, 9.0, 9.0, f64::NAN)]],
        vec![vec![]],
    ];
    let detections = DetectionSet::from_nested(nested).unwrap();
    let result = evaluate_detections(
        &detections,
        &ground_truth(),
        &classes(),
        None,
        &EvaluationConfig::default(),
    );
    assert!(matches!(result, Err(VocEvalError::InvalidDetection(_))));
}

#[test]
fn test_push_out_of_range() {
    let mut detections = DetectionSet::new(3, 1);
    let det = create_detection(0.0, 0.0, 1.0, 1.0, 0.5);
    assert!(detections.push(3, 0, det).is_err());
    assert!(detections.push(0, 1, det).is_err());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ground_truth().record("bird", 4).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("bird"));
    assert!(message.contains('4'));
}
