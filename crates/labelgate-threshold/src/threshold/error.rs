//! Errors raised by threshold search and application.

use super::config::{Metric, SearchStrategy};
use labelgate_eval::EvalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThresholdError {
    /// The requested metric is not carried by this strategy's curve points.
    #[error("Metric '{metric}' is not available for the {strategy} search strategy")]
    UnsupportedMetric {
        metric: Metric,
        strategy: SearchStrategy,
    },

    #[error("Record {record} has no probability at index {index} for label '{label}'")]
    MissingProbability {
        label: String,
        index: usize,
        record: usize,
    },

    #[error("Record {record} has a non-finite probability {value} for label '{label}'")]
    InvalidProbability {
        label: String,
        value: f64,
        record: usize,
    },

    /// The predicted label has no entry in the threshold report.
    #[error("No threshold for predicted label '{label}' (record {record})")]
    MissingThreshold { label: String, record: usize },

    #[error("Record {record} has no confidence score")]
    MissingScore { record: usize },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type Result<T> = std::result::Result<T, ThresholdError>;
