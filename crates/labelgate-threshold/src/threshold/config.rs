//! Configuration types for threshold search and application.

/// Default floor for the constraint metric.
pub const DEFAULT_MIN_SCORE: f64 = 0.2;

/// Label assigned when a prediction's confidence is below its threshold.
pub const DEFAULT_LABEL: &str = "default.skip";

/// Number of decimal digits kept for scores and reported metrics.
pub const ROUND_DIGITS: usize = 4;

/// Curve used to search for thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Precision/recall curve; points carry f1_score, precision and recall.
    #[default]
    PrecisionRecall,
    /// ROC curve; points carry gmean, fpr and tpr.
    Roc,
}

impl SearchStrategy {
    /// Metric fields carried by points of this strategy's curve, in report order.
    pub fn metrics(&self) -> &'static [Metric] {
        match self {
            Self::PrecisionRecall => &[Metric::F1Score, Metric::Precision, Metric::Recall],
            Self::Roc => &[Metric::Gmean, Metric::Fpr, Metric::Tpr],
        }
    }

    /// Check whether `metric` can be read from this strategy's curve points.
    pub fn supports(&self, metric: Metric) -> bool {
        metric == Metric::Threshold || self.metrics().contains(&metric)
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrecisionRecall => write!(f, "p/r"),
            Self::Roc => write!(f, "roc"),
        }
    }
}

impl std::str::FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p/r" => Ok(Self::PrecisionRecall),
            "roc" => Ok(Self::Roc),
            _ => Err(format!("Unknown search strategy: {} (expected roc or p/r)", s)),
        }
    }
}

/// Named value on a curve point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Threshold,
    F1Score,
    Precision,
    Recall,
    Gmean,
    Fpr,
    Tpr,
}

impl Metric {
    /// Key used for this metric in threshold reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::F1Score => "f1_score",
            Self::Precision => "precision",
            Self::Recall => "recall",
            Self::Gmean => "gmean",
            Self::Fpr => "fpr",
            Self::Tpr => "tpr",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threshold" => Ok(Self::Threshold),
            "f1_score" => Ok(Self::F1Score),
            "precision" => Ok(Self::Precision),
            "recall" => Ok(Self::Recall),
            "gmean" => Ok(Self::Gmean),
            "fpr" => Ok(Self::Fpr),
            "tpr" => Ok(Self::Tpr),
            _ => Err(format!("Unknown metric: {}", s)),
        }
    }
}

/// Configuration for the per-label threshold search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub strategy: SearchStrategy,
    /// Metric maximized among eligible points.
    pub optimized_metric: Metric,
    /// Metric that must reach `min_score` for a point to be eligible.
    pub constraint_metric: Metric,
    pub min_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::PrecisionRecall,
            optimized_metric: Metric::Precision,
            constraint_metric: Metric::Recall,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Configuration for confidence gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyConfig {
    pub default_label: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
        }
    }
}

/// Round to `ROUND_DIGITS` decimal digits.
///
/// Rounds the exact binary value rather than a scaled product, so `0.00035`
/// (stored just below the half) becomes `0.0003`.
pub fn round_score(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", ROUND_DIGITS, value)
        .parse()
        .unwrap_or(value)
}
