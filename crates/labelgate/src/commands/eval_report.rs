//! Confusion matrix and classification report for an evaluation set.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::common::{EvaluationOutput, InputArgs, prepare_output_dir};

#[derive(Args, Debug, Clone)]
pub struct EvalReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory receiving classification_report.txt and confusion_matrix.csv
    #[arg(long)]
    pub output_dir: PathBuf,
}

pub fn eval_report(args: &EvalReportArgs) -> Result<()> {
    let (records, labels) = args.input.load()?;
    let output = EvaluationOutput::compute(&records, &labels)?;

    let output_dir = prepare_output_dir(&args.output_dir)?;
    output.write(&output_dir)?;

    info!(
        output_dir = %output_dir.display(),
        records = records.len(),
        accuracy = output.report.accuracy,
        "Wrote evaluation report"
    );
    println!("{}", output.report);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::fixtures::write_inputs;
    use crate::commands::common::{MATRIX_FILE, REPORT_FILE};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_eval_report_writes_files() {
        let dir = tempdir().unwrap();
        let args = EvalReportArgs {
            input: write_inputs(dir.path()),
            output_dir: dir.path().join("report"),
        };

        eval_report(&args).unwrap();

        let report = fs::read_to_string(args.output_dir.join(REPORT_FILE)).unwrap();
        assert!(report.contains("precision"));
        assert!(report.contains("accuracy"));

        let matrix = fs::read_to_string(args.output_dir.join(MATRIX_FILE)).unwrap();
        let rows: Vec<&str> = matrix.lines().collect();
        assert_eq!(rows[0], "label,A,B");
        assert_eq!(rows[1], "A,3,0");
        assert_eq!(rows[2], "B,1,2");
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let dir = tempdir().unwrap();
        let input = write_inputs(dir.path());
        fs::write(&input.label_file, "A\n").unwrap();
        let args = EvalReportArgs {
            input,
            output_dir: dir.path().join("report"),
        };

        assert!(eval_report(&args).is_err());
        assert!(!args.output_dir.exists());
    }
}
