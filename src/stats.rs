/// False-positive error statistics
///
/// Every false positive is attributed to one cause. True positives are
/// counted alongside so the buckets add up to all scored detections.

use serde::{Deserialize, Serialize};

/// Cause of a detection outcome, in histogram bucket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FpErrorKind {
    /// Overlaps a box of its own class, but too loosely.
    Localization,
    /// Landed on a box of a similar class.
    Similar,
    /// Landed on a box of an unrelated class.
    Other,
    /// Overlaps nothing meaningful.
    Background,
    /// Hit a box already claimed by a higher-scored detection.
    Duplicate,
    /// Not an error.
    TruePositive,
}

impl FpErrorKind {
    /// All kinds in bucket order.
    pub const ALL: [FpErrorKind; 6] = [
        FpErrorKind::Localization,
        FpErrorKind::Similar,
        FpErrorKind::Other,
        FpErrorKind::Background,
        FpErrorKind::Duplicate,
        FpErrorKind::TruePositive,
    ];

    /// Bucket index in [`FpErrorHistogram::counts`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FpErrorKind::Localization => "Localization",
            FpErrorKind::Similar => "Similar",
            FpErrorKind::Other => "Others",
            FpErrorKind::Background => "Background",
            FpErrorKind::Duplicate => "Duplicated",
            FpErrorKind::TruePositive => "True positive",
        }
    }
}

/// Six-bucket histogram:
/// `[localization, similar, other, background, duplicate, true-positive]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpErrorHistogram {
    pub counts: [usize; 6],
}

impl FpErrorHistogram {
    /// Create a histogram with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome
    pub fn record(&mut self, kind: FpErrorKind) {
        self.counts[kind.index()] += 1;
    }

    pub fn get(&self, kind: FpErrorKind) -> usize {
        self.counts[kind.index()]
    }

    /// Sum of all buckets
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn true_positives(&self) -> usize {
        self.get(FpErrorKind::TruePositive)
    }

    /// Sum of the five error buckets
    pub fn false_positives(&self) -> usize {
        self.total() - self.true_positives()
    }

    /// Share of true positives among all counted detections.
    pub fn tp_ratio(&self) -> f64 {
        ratio(self.true_positives(), self.total())
    }

    /// Share of false positives among all counted detections.
    pub fn fp_ratio(&self) -> f64 {
        ratio(self.false_positives(), self.total())
    }

    /// Share of each error cause among false positives, in bucket order.
    /// All zero when there are no false positives.
    pub fn error_ratios(&self) -> [f64; 5] {
        let total_fp = self.false_positives();
        let mut ratios = [0.0; 5];
        for (ratio_slot, &count) in ratios.iter_mut().zip(&self.counts[..5]) {
            *ratio_slot = ratio(count, total_fp);
        }
        ratios
    }

    /// Add another histogram bucket-wise.
    pub fn merge(&mut self, other: &FpErrorHistogram) {
        for (count, &extra) in self.counts.iter_mut().zip(&other.counts) {
            *count += extra;
        }
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "FpErrorHistogram {{ total: {}, tp: {}, fp: {}, localization: {}, similar: {}, other: {}, background: {}, duplicate: {} }}",
            self.total(),
            self.true_positives(),
            self.false_positives(),
            self.counts[0],
            self.counts[1],
            self.counts[2],
            self.counts[3],
            self.counts[4],
        )
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl FromIterator<FpErrorKind> for FpErrorHistogram {
    fn from_iter<I: IntoIterator<Item = FpErrorKind>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for kind in iter {
            histogram.record(kind);
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_histogram_is_zero() {
        let histogram = FpErrorHistogram::new();
        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.tp_ratio(), 0.0);
        assert_eq!(histogram.error_ratios(), [0.0; 5]);
    }

    #[test]
    fn test_bucket_order() {
        for (i, kind) in FpErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_record_and_ratios() {
        let histogram: FpErrorHistogram = [
            FpErrorKind::TruePositive,
            FpErrorKind::TruePositive,
            FpErrorKind::Duplicate,
            FpErrorKind::Background,
            FpErrorKind::Background,
            FpErrorKind::Background,
        ]
        .into_iter()
        .collect();

        assert_eq!(histogram.counts, [0, 0, 0, 3, 1, 2]);
        assert_eq!(histogram.false_positives(), 4);
        assert!((histogram.tp_ratio() - 2.0 / 6.0).abs() < 1e-10);
        assert!((histogram.fp_ratio() - 4.0 / 6.0).abs() < 1e-10);
        let ratios = histogram.error_ratios();
        assert!((ratios[3] - 0.75).abs() < 1e-10);
        assert!((ratios[4] - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_merge() {
        let mut a = FpErrorHistogram { counts: [1, 0, 0, 0, 0, 2] };
        let b = FpErrorHistogram { counts: [0, 1, 0, 0, 0, 3] };
        a.merge(&b);
        assert_eq!(a.counts, [1, 1, 0, 0, 0, 5]);
    }

    #[test]
    fn test_summary_string() {
        let histogram = FpErrorHistogram { counts: [1, 2, 3, 4, 5, 6] };
        let summary = histogram.summary_string();
        assert!(summary.contains("total: 21"));
        assert!(summary.contains("tp: 6"));
    }
}
