//! End-to-end calibration: search thresholds, apply them and evaluate the
//! calibrated predictions in one output directory.

use anyhow::{Context, Result};
use clap::Args;
use labelgate_eval::io;
use labelgate_threshold::threshold::{ThresholdApplier, ThresholdSearcher, format_threshold_summary};
use std::path::PathBuf;
use tracing::info;

use super::common::{
    ApplyArgs, EvaluationOutput, InputArgs, LABELS_FILE, RESULTS_FILE, SearchArgs,
    THRESHOLD_FILE, prepare_output_dir,
};

#[derive(Args, Debug, Clone)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(flatten)]
    pub apply: ApplyArgs,

    /// Directory receiving every calibration artefact
    #[arg(long)]
    pub output_dir: PathBuf,
}

/// Run the full calibration pipeline.
pub fn calibrate(args: &CalibrateArgs) -> Result<()> {
    let searcher = ThresholdSearcher::with_config(args.search.config());
    searcher.validate()?;

    let (records, labels) = args.input.load()?;

    let report = searcher
        .search(&records, &labels)
        .context("Threshold search failed")?;
    let applier = ThresholdApplier::with_config(args.apply.config());
    let outcome = applier
        .run(&records, &labels, &report)
        .context("Failed to apply thresholds")?;
    let evaluation = EvaluationOutput::compute(&outcome.records, &outcome.labels)?;

    let output_dir = prepare_output_dir(&args.output_dir)?;
    report.save(&output_dir.join(THRESHOLD_FILE))?;
    io::write_ndjson(&output_dir.join(RESULTS_FILE), &outcome.records)?;
    io::write_labels(&output_dir.join(LABELS_FILE), &outcome.labels)?;
    evaluation.write(&output_dir)?;

    info!(
        output_dir = %output_dir.display(),
        labels = report.len(),
        demoted = outcome.demoted,
        accuracy = evaluation.report.accuracy,
        "Calibration complete"
    );

    println!("labelgate Calibration");
    println!("=====================");
    println!("Eval file: {:?}", args.input.eval_file);
    println!("Strategy: {}", searcher.config().strategy);
    println!(
        "Objective: max {} with {} >= {}",
        searcher.config().optimized_metric,
        searcher.config().constraint_metric,
        searcher.config().min_score
    );
    println!();
    println!("{}", format_threshold_summary(&report));
    println!();
    println!(
        "Demoted {} of {} predictions to '{}'",
        outcome.demoted,
        outcome.records.len(),
        applier.default_label()
    );
    println!();
    println!("{}", evaluation.report);
    println!("Output: {:?}", output_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::fixtures::write_inputs;
    use crate::commands::common::{MATRIX_FILE, REPORT_FILE};
    use labelgate_eval::CalibratedRecord;
    use labelgate_threshold::threshold::{Metric, SearchStrategy, ThresholdReport};
    use tempfile::tempdir;

    fn args(dir: &std::path::Path) -> CalibrateArgs {
        CalibrateArgs {
            input: write_inputs(dir),
            search: SearchArgs {
                search_strategy: SearchStrategy::PrecisionRecall,
                optimized_metric: Metric::Precision,
                constraint_metric: Metric::Recall,
                min_score: 0.2,
            },
            apply: ApplyArgs {
                default_label: "default.skip".to_string(),
            },
            output_dir: dir.join("calibrated"),
        }
    }

    #[test]
    fn test_calibrate_writes_every_artefact() {
        let dir = tempdir().unwrap();
        let args = args(dir.path());

        calibrate(&args).unwrap();

        let out = &args.output_dir;
        for file in [THRESHOLD_FILE, RESULTS_FILE, LABELS_FILE, REPORT_FILE, MATRIX_FILE] {
            assert!(out.join(file).exists(), "missing {}", file);
        }

        let report = ThresholdReport::load(&out.join(THRESHOLD_FILE)).unwrap();
        assert_eq!(report.threshold("A"), Some(0.8));

        let results: Vec<CalibratedRecord> = io::read_ndjson(&out.join(RESULTS_FILE)).unwrap();
        let demoted = results.iter().filter(|r| r.pred == "default.skip").count();
        assert_eq!(demoted, 2);

        let matrix = std::fs::read_to_string(out.join(MATRIX_FILE)).unwrap();
        assert_eq!(matrix.lines().next(), Some("label,A,B,default.skip"));
    }

    #[test]
    fn test_roc_calibration() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path());
        args.search = SearchArgs {
            search_strategy: SearchStrategy::Roc,
            optimized_metric: Metric::Gmean,
            constraint_metric: Metric::Tpr,
            min_score: 0.2,
        };

        calibrate(&args).unwrap();

        let report = ThresholdReport::load(&args.output_dir.join(THRESHOLD_FILE)).unwrap();
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_mismatched_metric_fails_before_reading() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path());
        args.search.search_strategy = SearchStrategy::Roc;
        std::fs::remove_file(&args.input.eval_file).unwrap();

        let err = calibrate(&args).unwrap_err();
        assert!(err.to_string().contains("not available"));
    }
}
