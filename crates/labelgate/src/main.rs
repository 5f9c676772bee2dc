use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ApplyThresholdArgs, CalibrateArgs, EvalReportArgs, FindThresholdArgs};

#[derive(Parser)]
#[command(name = "labelgate")]
#[command(author, version, about = "Per-label decision thresholds for text classifiers")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the optimal decision threshold for every label
    FindThreshold(FindThresholdArgs),

    /// Demote low-confidence predictions using per-label thresholds
    ApplyThreshold(ApplyThresholdArgs),

    /// Write a confusion matrix and classification report
    EvalReport(EvalReportArgs),

    /// Search, apply and evaluate thresholds in one run
    Calibrate(CalibrateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    match cli.command {
        Commands::FindThreshold(args) => commands::find_threshold(&args),
        Commands::ApplyThreshold(args) => commands::apply_threshold(&args),
        Commands::EvalReport(args) => commands::eval_report(&args),
        Commands::Calibrate(args) => commands::calibrate(&args),
    }
}
