//! Shared arguments, file names and helpers for CLI commands

use anyhow::{Context, Result};
use clap::Args;
use labelgate_eval::{ClassificationReport, ConfusionMatrix, EvaluationRecord, LabelList, Labeled, io};
use labelgate_threshold::threshold::{
    ApplyConfig, DEFAULT_LABEL, DEFAULT_MIN_SCORE, Metric, SearchConfig, SearchStrategy,
};
use std::path::{Path, PathBuf};

/// Threshold report written by the search
pub const THRESHOLD_FILE: &str = "threshold_optimal.json";

/// Calibrated predictions, one JSON object per line
pub const RESULTS_FILE: &str = "optimal_results.json";

/// Label list extended with the default label
pub const LABELS_FILE: &str = "optimal_labels.txt";

pub const REPORT_FILE: &str = "classification_report.txt";
pub const MATRIX_FILE: &str = "confusion_matrix.csv";

/// Evaluation inputs shared by every command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Evaluation records (newline-delimited JSON)
    #[arg(long)]
    pub eval_file: PathBuf,

    /// Label list, one label per line
    #[arg(long)]
    pub label_file: PathBuf,
}

impl InputArgs {
    /// Read the evaluation records and the label list.
    pub fn load(&self) -> Result<(Vec<EvaluationRecord>, LabelList)> {
        let records = io::read_records(&self.eval_file)
            .with_context(|| format!("Failed to load evaluation file {:?}", self.eval_file))?;
        let labels = io::read_labels(&self.label_file)
            .with_context(|| format!("Failed to load label file {:?}", self.label_file))?;
        Ok((records, labels))
    }
}

/// Threshold search options.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Curve to search: roc or p/r
    #[arg(long, default_value_t = SearchStrategy::PrecisionRecall)]
    pub search_strategy: SearchStrategy,

    /// Metric to maximize
    #[arg(long, default_value_t = Metric::Precision)]
    pub optimized_metric: Metric,

    /// Metric that must reach --min-score
    #[arg(long, default_value_t = Metric::Recall)]
    pub constraint_metric: Metric,

    /// Floor for the constraint metric
    #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
    pub min_score: f64,
}

impl SearchArgs {
    pub fn config(&self) -> SearchConfig {
        SearchConfig {
            strategy: self.search_strategy,
            optimized_metric: self.optimized_metric,
            constraint_metric: self.constraint_metric,
            min_score: self.min_score,
        }
    }
}

/// Threshold application options.
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Label assigned to predictions below their threshold
    #[arg(long, default_value = DEFAULT_LABEL)]
    pub default_label: String,
}

impl ApplyArgs {
    pub fn config(&self) -> ApplyConfig {
        ApplyConfig {
            default_label: self.default_label.clone(),
        }
    }
}

/// Creates `dir` when missing and returns it.
pub fn prepare_output_dir(dir: &Path) -> Result<PathBuf> {
    io::ensure_dir(dir).with_context(|| format!("Failed to create output directory {:?}", dir))?;
    Ok(dir.to_path_buf())
}

/// Evaluation summaries computed in memory, ready to be written.
pub struct EvaluationOutput {
    pub report: ClassificationReport,
    pub matrix: ConfusionMatrix,
}

impl EvaluationOutput {
    pub fn compute<R: Labeled>(records: &[R], labels: &LabelList) -> Result<Self> {
        let matrix = ConfusionMatrix::from_records(records, labels)
            .context("Failed to build confusion matrix")?;
        let report = ClassificationReport::from_matrix(&matrix);
        Ok(Self { report, matrix })
    }

    /// Writes the report and matrix files into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> Result<()> {
        io::write_text(&output_dir.join(REPORT_FILE), &self.report.to_string())?;
        io::write_text(&output_dir.join(MATRIX_FILE), &self.matrix.to_csv())?;
        Ok(())
    }
}
