//! Precision/recall and ROC sweeps over binary scores.
//!
//! Both curves are built from the cumulative true/false positive counts at
//! every distinct score, taken in descending score order.

use super::config::{Metric, SearchStrategy};

/// One operating point of a threshold sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurvePoint {
    PrecisionRecall {
        threshold: f64,
        f1_score: f64,
        precision: f64,
        recall: f64,
    },
    Roc {
        threshold: f64,
        gmean: f64,
        fpr: f64,
        tpr: f64,
    },
}

impl CurvePoint {
    /// Build a precision/recall point, deriving F1.
    pub fn precision_recall(threshold: f64, precision: f64, recall: f64) -> Self {
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self::PrecisionRecall {
            threshold,
            f1_score,
            precision,
            recall,
        }
    }

    /// Build an ROC point, deriving the geometric mean of TPR and TNR.
    pub fn roc(threshold: f64, fpr: f64, tpr: f64) -> Self {
        Self::Roc {
            threshold,
            gmean: (tpr * (1.0 - fpr)).sqrt(),
            fpr,
            tpr,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            Self::PrecisionRecall { threshold, .. } | Self::Roc { threshold, .. } => threshold,
        }
    }

    pub fn strategy(&self) -> SearchStrategy {
        match self {
            Self::PrecisionRecall { .. } => SearchStrategy::PrecisionRecall,
            Self::Roc { .. } => SearchStrategy::Roc,
        }
    }

    /// Read a metric by name. `None` when this kind of point does not carry it.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match (*self, metric) {
            (_, Metric::Threshold) => Some(self.threshold()),
            (Self::PrecisionRecall { f1_score, .. }, Metric::F1Score) => Some(f1_score),
            (Self::PrecisionRecall { precision, .. }, Metric::Precision) => Some(precision),
            (Self::PrecisionRecall { recall, .. }, Metric::Recall) => Some(recall),
            (Self::Roc { gmean, .. }, Metric::Gmean) => Some(gmean),
            (Self::Roc { fpr, .. }, Metric::Fpr) => Some(fpr),
            (Self::Roc { tpr, .. }, Metric::Tpr) => Some(tpr),
            _ => None,
        }
    }
}

/// Cumulative counts at each distinct score, highest score first.
struct ClfCounts {
    fps: Vec<usize>,
    tps: Vec<usize>,
    thresholds: Vec<f64>,
}

fn binary_clf_counts(labels: &[bool], scores: &[f64]) -> ClfCounts {
    debug_assert_eq!(labels.len(), scores.len());

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut counts = ClfCounts {
        fps: Vec::new(),
        tps: Vec::new(),
        thresholds: Vec::new(),
    };

    let mut tp = 0usize;
    for (pos, &idx) in order.iter().enumerate() {
        if labels[idx] {
            tp += 1;
        }
        let boundary = order
            .get(pos + 1)
            .is_none_or(|&next| scores[next] != scores[idx]);
        if boundary {
            counts.tps.push(tp);
            counts.fps.push(pos + 1 - tp);
            counts.thresholds.push(scores[idx]);
        }
    }

    counts
}

/// Precision/recall curve in ascending threshold order, one point per
/// distinct score.
///
/// Recall is 1.0 at every point when there are no positives.
pub fn precision_recall_curve(labels: &[bool], scores: &[f64]) -> Vec<CurvePoint> {
    let counts = binary_clf_counts(labels, scores);
    let total_pos = counts.tps.last().copied().unwrap_or(0);

    (0..counts.thresholds.len())
        .rev()
        .map(|i| {
            let tp = counts.tps[i] as f64;
            let predicted = (counts.tps[i] + counts.fps[i]) as f64;
            let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
            let recall = if total_pos > 0 {
                tp / total_pos as f64
            } else {
                1.0
            };
            CurvePoint::precision_recall(counts.thresholds[i], precision, recall)
        })
        .collect()
}

/// ROC curve in descending threshold order.
///
/// Collinear intermediate points are dropped. The curve starts at (0, 0)
/// with a threshold one above the highest score. A rate whose denominator is
/// zero (no positives or no negatives) is NaN.
pub fn roc_curve(labels: &[bool], scores: &[f64]) -> Vec<CurvePoint> {
    let counts = binary_clf_counts(labels, scores);
    let n = counts.thresholds.len();
    if n == 0 {
        return Vec::new();
    }

    let bends = |v: &[usize], i: usize| v[i + 1] as i64 - 2 * v[i] as i64 + v[i - 1] as i64 != 0;
    let kept: Vec<usize> = if n > 2 {
        (0..n)
            .filter(|&i| i == 0 || i == n - 1 || bends(&counts.fps, i) || bends(&counts.tps, i))
            .collect()
    } else {
        (0..n).collect()
    };

    let total_neg = counts.fps[n - 1];
    let total_pos = counts.tps[n - 1];
    let rate = |count: usize, total: usize| {
        if total > 0 {
            count as f64 / total as f64
        } else {
            f64::NAN
        }
    };

    let mut points = Vec::with_capacity(kept.len() + 1);
    points.push(CurvePoint::roc(
        counts.thresholds[0] + 1.0,
        rate(0, total_neg),
        rate(0, total_pos),
    ));
    points.extend(kept.into_iter().map(|i| {
        CurvePoint::roc(
            counts.thresholds[i],
            rate(counts.fps[i], total_neg),
            rate(counts.tps[i], total_pos),
        )
    }));
    points
}

/// Build the curve for `strategy`.
pub fn compute_curve(strategy: SearchStrategy, labels: &[bool], scores: &[f64]) -> Vec<CurvePoint> {
    match strategy {
        SearchStrategy::PrecisionRecall => precision_recall_curve(labels, scores),
        SearchStrategy::Roc => roc_curve(labels, scores),
    }
}
