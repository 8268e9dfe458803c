//! Metrics calculation modules for VOC evaluation.

pub mod iou;
pub mod ap;
pub mod precision_recall;

pub use iou::{calculate_iou, max_overlap_with_class, max_overlap_with_classes};
pub use ap::{calculate_ap, calculate_map};
pub use precision_recall::build_precision_recall_curve;
