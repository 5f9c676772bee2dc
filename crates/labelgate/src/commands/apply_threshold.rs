//! Apply per-label thresholds to an evaluation set.

use anyhow::{Context, Result};
use clap::Args;
use labelgate_eval::io;
use labelgate_threshold::threshold::{ThresholdApplier, ThresholdReport};
use std::path::PathBuf;
use tracing::info;

use super::common::{ApplyArgs, InputArgs, LABELS_FILE, RESULTS_FILE, prepare_output_dir};

#[derive(Args, Debug, Clone)]
pub struct ApplyThresholdArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Threshold report produced by find-threshold
    #[arg(long)]
    pub threshold_file: PathBuf,

    #[command(flatten)]
    pub apply: ApplyArgs,

    /// Directory receiving optimal_results.json and optimal_labels.txt
    #[arg(long)]
    pub output_dir: PathBuf,
}

/// Demote low-confidence predictions and write the calibrated outputs.
pub fn apply_threshold(args: &ApplyThresholdArgs) -> Result<()> {
    let (records, labels) = args.input.load()?;
    let report = ThresholdReport::load(&args.threshold_file)
        .with_context(|| format!("Failed to load threshold file {:?}", args.threshold_file))?;

    let applier = ThresholdApplier::with_config(args.apply.config());
    let outcome = applier
        .run(&records, &labels, &report)
        .context("Failed to apply thresholds")?;

    let output_dir = prepare_output_dir(&args.output_dir)?;
    io::write_ndjson(&output_dir.join(RESULTS_FILE), &outcome.records)?;
    io::write_labels(&output_dir.join(LABELS_FILE), &outcome.labels)?;

    info!(output_dir = %output_dir.display(), "Wrote calibrated results");
    println!(
        "Applied thresholds to {} records: {} demoted to '{}'",
        outcome.records.len(),
        outcome.demoted,
        applier.default_label()
    );

    Ok(())
}
