//! Basic evaluation example demonstrating core functionality.

use voc_eval::{
    evaluator::evaluate_classes, metrics::iou::calculate_iou, nms::non_maximum_suppression,
    BoundingBox, ConfusionMap, Detection, DetectionSet, EvaluationConfig, FpErrorKind,
    GroundTruth, GroundTruthRecord, NmsConfig, BACKGROUND_CLASS,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== VOC Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::new(10.0, 10.0, 49.0, 49.0);
    let bbox2 = BoundingBox::new(30.0, 30.0, 69.0, 69.0);
    let iou = calculate_iou(&bbox1, &bbox2);
    println!("   IoU between overlapping boxes: {:.4}", iou);
    println!();

    // Example 2: Non-maximum suppression
    println!("2. Non-Maximum Suppression");
    let candidates = vec![
        Detection::new(BoundingBox::new(100.0, 100.0, 199.0, 149.0), 0.95),
        Detection::new(BoundingBox::new(104.0, 98.0, 201.0, 152.0), 0.80),
        Detection::new(BoundingBox::new(350.0, 200.0, 449.0, 319.0), 0.60),
    ];
    let hard = non_maximum_suppression(&candidates, &NmsConfig::hard(0.3))?;
    let soft = non_maximum_suppression(&candidates, &NmsConfig::soft(0.3, 0.001))?;
    println!("   Hard NMS keeps indices {:?}", hard);
    println!("   Soft NMS keeps indices {:?}", soft);
    println!();

    // Example 3: Ground truth and detector output
    println!("3. Building Ground Truth and Detections");
    let classes: Vec<String> = [BACKGROUND_CLASS, "person", "horse", "car"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut ground_truth = GroundTruth::new();
    ground_truth.insert(
        "person",
        vec![GroundTruthRecord::new(
            vec![
                BoundingBox::new(101.0, 101.0, 200.0, 250.0),
                BoundingBox::new(401.0, 51.0, 420.0, 90.0),
            ],
            vec![false, true],
        )?],
    );
    ground_truth.insert(
        "horse",
        vec![GroundTruthRecord::from_boxes(vec![BoundingBox::new(
            251.0, 151.0, 380.0, 260.0,
        )])],
    );
    ground_truth.insert(
        "car",
        vec![GroundTruthRecord::from_boxes(vec![BoundingBox::new(
            11.0, 301.0, 160.0, 380.0,
        )])],
    );

    // Rows are [x1, y1, x2, y2, score], 0-based like most detectors
    let rows = vec![
        vec![vec![]],
        vec![vec![
            vec![100.0, 100.0, 199.0, 249.0, 0.93],
            vec![102.0, 99.0, 198.0, 251.0, 0.71],
            vec![250.0, 150.0, 379.0, 259.0, 0.55],
            vec![600.0, 10.0, 640.0, 60.0, 0.40],
        ]],
        vec![vec![vec![250.0, 150.0, 379.0, 259.0, 0.88]]],
        vec![vec![vec![10.0, 300.0, 80.0, 379.0, 0.77]]],
    ];
    let detections = DetectionSet::from_rows(&rows)?;
    println!("   {} classes, {} image(s), {} detections", classes.len(), detections.num_images(), detections.len());
    println!();

    // Example 4: Evaluation with false-positive analysis
    println!("4. Running Full Evaluation");
    let confusions = ConfusionMap::parse(&classes, "person:horse\n");
    let config = EvaluationConfig::voc2007().with_nms(NmsConfig::hard(0.3));
    let evaluations = evaluate_classes(
        &detections,
        &ground_truth,
        &classes,
        Some(&confusions),
        &config,
    )?;

    println!("   Per-Class AP (11-point):");
    let mut total = 0.0;
    for (class_name, evaluation) in &evaluations {
        println!("   ├─ {}: {:.4}", class_name, evaluation.ap);
        total += evaluation.ap;
    }
    println!("   └─ mAP: {:.4}", total / evaluations.len() as f64);
    println!();

    // Example 5: Where do the false positives come from?
    println!("5. False-Positive Analysis");
    for (class_name, evaluation) in &evaluations {
        let Some(errors) = evaluation.errors else {
            println!("   {}: no detections", class_name);
            continue;
        };
        println!("   {}: {}", class_name, errors.summary_string());
        for kind in FpErrorKind::ALL {
            let count = errors.get(kind);
            if count > 0 {
                println!("      {:<13} {}", kind.label(), count);
            }
        }
    }
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
