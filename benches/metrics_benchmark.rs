use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voc_eval::evaluator::evaluate_detections;
use voc_eval::metrics::precision_recall::build_precision_recall_curve;
use voc_eval::metrics::{calculate_ap, calculate_iou};
use voc_eval::nms::{non_maximum_suppression, NmsConfig};
use voc_eval::types::{
    BoundingBox, Detection, DetectionSet, GroundTruth, GroundTruthRecord, BACKGROUND_CLASS,
};
use voc_eval::{ConfusionMap, EvaluationConfig};

fn bench_iou_calculation(c: &mut Criterion) {
    let bbox1 = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
    let bbox2 = BoundingBox::new(30.0, 30.0, 80.0, 80.0);

    c.bench_function("iou_single", |b| {
        b.iter(|| {
            calculate_iou(black_box(&bbox1), black_box(&bbox2))
        });
    });
}

fn bench_iou_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("iou_matrix");

    for size in [10, 50, 100, 500].iter() {
        let boxes: Vec<BoundingBox> = (0..*size)
            .map(|i| {
                let offset = (i as f64) * 2.0;
                BoundingBox::new(offset, offset, offset + 50.0, offset + 50.0)
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for i in 0..boxes.len() {
                    for j in 0..boxes.len() {
                        black_box(calculate_iou(&boxes[i], &boxes[j]));
                    }
                }
            });
        });
    }
    group.finish();
}

fn spread_detections(num_boxes: usize) -> Vec<Detection> {
    (0..num_boxes)
        .map(|i| {
            let offset = (i as f64) * 10.0;
            Detection::new(
                BoundingBox::new(offset, offset, offset + 50.0, offset + 50.0),
                0.9 - (i as f64) * 0.001,
            )
        })
        .collect()
}

fn bench_nms(c: &mut Criterion) {
    let mut group = c.benchmark_group("nms");
    let config = NmsConfig::hard(0.5);

    for num_boxes in [10, 50, 100, 500].iter() {
        let detections = spread_detections(*num_boxes);

        group.bench_with_input(BenchmarkId::from_parameter(num_boxes), num_boxes, |b, _| {
            b.iter(|| {
                non_maximum_suppression(black_box(&detections), black_box(&config))
            });
        });
    }
    group.finish();
}

fn bench_soft_nms(c: &mut Criterion) {
    let mut group = c.benchmark_group("soft_nms");
    let config = NmsConfig::soft(0.3, 0.001);

    for num_boxes in [10, 50, 100, 500].iter() {
        let detections = spread_detections(*num_boxes);

        group.bench_with_input(BenchmarkId::from_parameter(num_boxes), num_boxes, |b, _| {
            b.iter(|| {
                non_maximum_suppression(black_box(&detections), black_box(&config))
            });
        });
    }
    group.finish();
}

fn bench_nms_overlapping(c: &mut Criterion) {
    // Heavily overlapping boxes
    let detections: Vec<Detection> = (0..100)
        .map(|i| {
            Detection::new(
                BoundingBox::new(10.0 + (i as f64), 10.0 + (i as f64), 60.0, 60.0),
                0.9 - (i as f64) * 0.005,
            )
        })
        .collect();
    let config = NmsConfig::hard(0.5);

    c.bench_function("nms_overlapping_100", |b| {
        b.iter(|| {
            non_maximum_suppression(black_box(&detections), black_box(&config))
        });
    });
}

fn bench_ap_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ap_calculation");

    for num_detections in [10, 50, 100, 500].iter() {
        let tp: Vec<bool> = (0..*num_detections).map(|i| i % 3 != 0).collect();
        let fp: Vec<bool> = tp.iter().map(|t| !t).collect();
        let curve = build_precision_recall_curve(&tp, &fp, *num_detections);

        group.bench_with_input(BenchmarkId::new("area", num_detections), num_detections, |b, _| {
            b.iter(|| {
                calculate_ap(black_box(&curve.recall), black_box(&curve.precision), false)
            });
        });
        group.bench_with_input(BenchmarkId::new("11_point", num_detections), num_detections, |b, _| {
            b.iter(|| {
                calculate_ap(black_box(&curve.recall), black_box(&curve.precision), true)
            });
        });
    }
    group.finish();
}

fn bench_full_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_evaluation");
    let num_images = 50;

    for num_classes in [5, 20].iter() {
        let mut classes = vec![BACKGROUND_CLASS.to_string()];
        classes.extend((0..*num_classes).map(|c| format!("class_{}", c)));

        let mut gt = GroundTruth::new();
        let mut detections = DetectionSet::new(classes.len(), num_images);
        for (class_index, class_name) in classes.iter().enumerate().skip(1) {
            let mut records = Vec::with_capacity(num_images);
            for image_index in 0..num_images {
                let boxes: Vec<BoundingBox> = (0..5)
                    .map(|k| {
                        let x = (k * 60 + class_index * 7) as f64;
                        BoundingBox::new(x, x, x + 40.0, x + 40.0)
                    })
                    .collect();
                for (k, bbox) in boxes.iter().enumerate() {
                    let score = 0.9 - (k as f64) * 0.1;
                    detections
                        .push(class_index, image_index, Detection::new(bbox.shifted(-1.0), score))
                        .unwrap();
                    detections
                        .push(class_index, image_index, Detection::new(bbox.shifted(3.0), score / 2.0))
                        .unwrap();
                }
                records.push(GroundTruthRecord::from_boxes(boxes));
            }
            gt.insert(class_name.clone(), records);
        }
        let confusions = ConfusionMap::parse(&classes, "class_0:class_1\nclass_2:class_3\n");
        let config = EvaluationConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(num_classes), num_classes, |b, _| {
            b.iter(|| {
                evaluate_detections(
                    black_box(&detections),
                    black_box(&gt),
                    &classes,
                    Some(&confusions),
                    &config,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_iou_calculation,
    bench_iou_matrix,
    bench_nms,
    bench_soft_nms,
    bench_nms_overlapping,
    bench_ap_calculation,
    bench_full_evaluation,
);
criterion_main!(benches);
