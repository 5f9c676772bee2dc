//! Per-label constrained threshold search.

use super::config::{Metric, SearchConfig, SearchStrategy, round_score};
use super::curve::{CurvePoint, compute_curve};
use super::error::{Result, ThresholdError};
use super::report::{ThresholdEntry, ThresholdReport};
use labelgate_eval::{EvaluationRecord, LabelList};
use tracing::{debug, info, warn};


/// Pick the point maximizing `optimized` among points whose `constraint`
/// value is at least `min_score`.
///
/// Ties resolve to the first maximum in curve order. Points with a NaN
/// constraint or optimized value are never selected, even when every
/// eligible point is NaN: a label whose rates are undefined (no positives or
/// no negatives) then falls back to the zero entry instead of an arbitrary
/// first point. Returns `None` when no point is eligible.
pub fn get_optimized_threshold(
    curve: &[CurvePoint],
    optimized: Metric,
    constraint: Metric,
    min_score: f64,
) -> Result<Option<CurvePoint>> {
    let mut best: Option<(f64, CurvePoint)> = None;

    for point in curve {
        let floor = metric_value(point, constraint)?;
        if floor.is_nan() || floor < min_score {
            continue;
        }
        let value = metric_value(point, optimized)?;
        if value.is_nan() {
            continue;
        }
        if best.is_none_or(|(current, _)| value > current) {
            best = Some((value, *point));
        }
    }

    Ok(best.map(|(_, point)| point))
}

fn metric_value(point: &CurvePoint, metric: Metric) -> Result<f64> {
    point
        .get(metric)
        .ok_or_else(|| ThresholdError::UnsupportedMetric {
            metric,
            strategy: point.strategy(),
        })
}

/// Searches one decision threshold per label.
pub struct ThresholdSearcher {
    config: SearchConfig,
}

impl ThresholdSearcher {
    /// Create a searcher with default configuration (p/r, precision s.t. recall >= 0.2).
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Check that both configured metrics exist on the strategy's curve.
    pub fn validate(&self) -> Result<()> {
        let strategy = self.config.strategy;
        for metric in [self.config.optimized_metric, self.config.constraint_metric] {
            if !strategy.supports(metric) {
                return Err(ThresholdError::UnsupportedMetric { metric, strategy });
            }
        }
        Ok(())
    }

    /// Build the search curve for the label at `index`.
    ///
    /// Scores are rounded to four digits. For p/r, points with zero precision
    /// or zero recall are dropped.
    pub fn label_curve(
        &self,
        label: &str,
        index: usize,
        records: &[EvaluationRecord],
    ) -> Result<Vec<CurvePoint>> {
        let mut truth = Vec::with_capacity(records.len());
        let mut scores = Vec::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            let prob = record.probs.get(index).copied().ok_or_else(|| {
                ThresholdError::MissingProbability {
                    label: label.to_string(),
                    index,
                    record: idx,
                }
            })?;
            if !prob.is_finite() {
                return Err(ThresholdError::InvalidProbability {
                    label: label.to_string(),
                    value: prob,
                    record: idx,
                });
            }
            truth.push(record.label == label);
            scores.push(round_score(prob));
        }

        if !records.is_empty() && !truth.contains(&true) {
            warn!(label = label, "Label has no positive examples");
        }

        let mut curve = compute_curve(self.config.strategy, &truth, &scores);
        if self.config.strategy == SearchStrategy::PrecisionRecall {
            curve.retain(|point| {
                point.get(Metric::Precision).is_some_and(|p| p > 0.0)
                    && point.get(Metric::Recall).is_some_and(|r| r > 0.0)
            });
        }

        Ok(curve)
    }

    /// Search the threshold for a single label.
    pub fn search_label(
        &self,
        label: &str,
        index: usize,
        records: &[EvaluationRecord],
    ) -> Result<ThresholdEntry> {
        let curve = self.label_curve(label, index, records)?;
        let selected = get_optimized_threshold(
            &curve,
            self.config.optimized_metric,
            self.config.constraint_metric,
            self.config.min_score,
        )?;

        match selected {
            Some(point) => {
                let entry = ThresholdEntry::from_point(&point);
                info!(
                    label = label,
                    points = curve.len(),
                    threshold = entry.threshold,
                    optimized = %self.config.optimized_metric,
                    value = point.get(self.config.optimized_metric).map(round_score),
                    "Selected threshold"
                );
                Ok(entry)
            }
            None => {
                debug!(
                    label = label,
                    points = curve.len(),
                    constraint = %self.config.constraint_metric,
                    min_score = self.config.min_score,
                    "No point satisfies the constraint, using zero threshold"
                );
                Ok(ThresholdEntry::zero(self.config.strategy))
            }
        }
    }

    /// Search thresholds for every label, in label-list order.
    pub fn search(
        &self,
        records: &[EvaluationRecord],
        labels: &LabelList,
    ) -> Result<ThresholdReport> {
        self.validate()?;

        info!(
            strategy = %self.config.strategy,
            optimized = %self.config.optimized_metric,
            constraint = %self.config.constraint_metric,
            min_score = self.config.min_score,
            labels = labels.len(),
            records = records.len(),
            "Searching optimal thresholds"
        );

        let mut report = ThresholdReport::new();
        for (index, label) in labels.iter().enumerate() {
            let entry = self.search_label(label, index, records)?;
            report.insert(label.to_string(), entry);
        }

        Ok(report)
    }
}

impl Default for ThresholdSearcher {
    fn default() -> Self {
        Self::new()
    }
}
