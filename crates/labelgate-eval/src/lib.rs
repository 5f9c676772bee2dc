pub mod error;
pub mod io;
pub mod labels;
pub mod record;
pub mod report;

pub use error::{EvalError, Result};
pub use labels::LabelList;
pub use record::{CalibratedRecord, EvaluationRecord, Labeled};
pub use report::{ClassMetrics, ClassificationReport, ConfusionMatrix};
