//! Per-label decision thresholds for multi-class classifiers.
//!
//! The searcher sweeps a precision/recall or ROC curve for each label and
//! keeps the operating point that maximizes one metric while another stays
//! above a floor. The applier then demotes predictions whose confidence is
//! below their label's threshold to a default label.

mod apply;
mod config;
mod curve;
mod error;
mod report;
mod search;

pub use apply::{ApplyOutcome, ThresholdApplier};
pub use config::{
    ApplyConfig, DEFAULT_LABEL, DEFAULT_MIN_SCORE, Metric, SearchConfig, SearchStrategy,
    round_score,
};
pub use curve::{CurvePoint, compute_curve, precision_recall_curve, roc_curve};
pub use error::{Result, ThresholdError};
pub use report::{EntryMetrics, ThresholdEntry, ThresholdReport, format_threshold_summary};
pub use search::{ThresholdSearcher, get_optimized_threshold};
