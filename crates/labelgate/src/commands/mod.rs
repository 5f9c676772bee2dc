//! CLI command implementations for labelgate

mod apply_threshold;
mod calibrate;
mod common;
mod eval_report;
mod find_threshold;

pub use apply_threshold::{ApplyThresholdArgs, apply_threshold};
pub use calibrate::{CalibrateArgs, calibrate};
pub use eval_report::{EvalReportArgs, eval_report};
pub use find_threshold::{FindThresholdArgs, find_threshold};
