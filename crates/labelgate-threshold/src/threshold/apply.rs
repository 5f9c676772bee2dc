//! Confidence gating: demote predictions whose score falls below their
//! label's threshold.

use super::config::ApplyConfig;
use super::error::{Result, ThresholdError};
use super::report::ThresholdReport;
use labelgate_eval::{CalibratedRecord, EvaluationRecord, LabelList};
use std::collections::HashMap;
use tracing::{debug, info};

/// Output of a full application pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// Calibrated records, one per input record, in input order.
    pub records: Vec<CalibratedRecord>,
    /// Input label list with the default label appended when missing.
    pub labels: LabelList,
    /// Number of predictions replaced by the default label.
    pub demoted: usize,
}

/// Rewrites predictions using per-label thresholds.
pub struct ThresholdApplier {
    config: ApplyConfig,
}

impl ThresholdApplier {
    /// Create an applier that demotes to `default.skip`.
    pub fn new() -> Self {
        Self::with_config(ApplyConfig::default())
    }

    pub fn with_config(config: ApplyConfig) -> Self {
        Self { config }
    }

    pub fn default_label(&self) -> &str {
        &self.config.default_label
    }

    /// Calibrate every record, preserving order.
    ///
    /// A record is demoted when `score < threshold[pred]`. The comparison is
    /// strict, so a zero threshold never demotes a non-negative score.
    pub fn apply(
        &self,
        records: &[EvaluationRecord],
        report: &ThresholdReport,
    ) -> Result<Vec<CalibratedRecord>> {
        let thresholds: HashMap<&str, f64> = report
            .iter()
            .map(|(label, entry)| (label, entry.threshold))
            .collect();

        records
            .iter()
            .enumerate()
            .map(|(idx, record)| -> Result<CalibratedRecord> {
                let threshold = thresholds.get(record.pred.as_str()).copied().ok_or_else(|| {
                    ThresholdError::MissingThreshold {
                        label: record.pred.clone(),
                        record: idx,
                    }
                })?;
                let score = record
                    .score
                    .ok_or(ThresholdError::MissingScore { record: idx })?;

                if score < threshold {
                    debug!(
                        record = idx,
                        pred = %record.pred,
                        score = score,
                        threshold = threshold,
                        "Demoted prediction"
                    );
                    Ok(CalibratedRecord::from_record(
                        record,
                        self.config.default_label.as_str(),
                    ))
                } else {
                    Ok(CalibratedRecord::from_record(record, record.pred.as_str()))
                }
            })
            .collect()
    }

    /// `labels` with the default label appended unless already present.
    pub fn optimal_labels(&self, labels: &LabelList) -> LabelList {
        labels.with_label(&self.config.default_label)
    }

    /// Calibrate records and extend the label list in one pass.
    pub fn run(
        &self,
        records: &[EvaluationRecord],
        labels: &LabelList,
        report: &ThresholdReport,
    ) -> Result<ApplyOutcome> {
        let calibrated = self.apply(records, report)?;
        let demoted = calibrated
            .iter()
            .zip(records)
            .filter(|(out, src)| out.pred != src.pred)
            .count();

        info!(
            records = calibrated.len(),
            demoted = demoted,
            default_label = %self.config.default_label,
            "Applied thresholds"
        );

        Ok(ApplyOutcome {
            records: calibrated,
            labels: self.optimal_labels(labels),
            demoted,
        })
    }
}

impl Default for ThresholdApplier {
    fn default() -> Self {
        Self::new()
    }
}
