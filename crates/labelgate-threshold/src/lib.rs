pub mod threshold;

pub use threshold::{
    ApplyConfig, ApplyOutcome, CurvePoint, EntryMetrics, Metric, SearchConfig, SearchStrategy,
    ThresholdApplier, ThresholdEntry, ThresholdError, ThresholdReport, ThresholdSearcher,
    format_threshold_summary, get_optimized_threshold,
};
