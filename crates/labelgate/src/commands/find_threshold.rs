//! Search per-label decision thresholds on an evaluation set.

use anyhow::{Context, Result};
use clap::Args;
use labelgate_threshold::threshold::{ThresholdSearcher, format_threshold_summary};
use std::path::PathBuf;
use tracing::info;

use super::common::{InputArgs, SearchArgs, THRESHOLD_FILE, prepare_output_dir};

#[derive(Args, Debug, Clone)]
pub struct FindThresholdArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Directory receiving threshold_optimal.json
    #[arg(long)]
    pub output_dir: PathBuf,
}

/// Run the threshold search and write the report.
pub fn find_threshold(args: &FindThresholdArgs) -> Result<()> {
    let searcher = ThresholdSearcher::with_config(args.search.config());
    searcher.validate()?;

    let (records, labels) = args.input.load()?;
    let report = searcher
        .search(&records, &labels)
        .context("Threshold search failed")?;

    let output_dir = prepare_output_dir(&args.output_dir)?;
    let path = output_dir.join(THRESHOLD_FILE);
    report.save(&path)?;

    info!(path = %path.display(), labels = report.len(), "Wrote threshold report");
    println!("{}", format_threshold_summary(&report));

    Ok(())
}
