//! Evaluation records produced by a model run and their calibrated counterparts.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One prediction from an evaluation run.
///
/// `probs` is aligned with the label list: `probs[i]` is the model's
/// probability for the label at position `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Input text that was classified.
    pub text: String,
    /// Predicted label.
    pub pred: String,
    /// Ground-truth label.
    pub label: String,
    /// Confidence of `pred`. Required when applying thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Per-label probabilities. Required when searching thresholds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probs: Vec<f64>,
    /// Optional record identifier, passed through verbatim.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    /// Optional group identifier, passed through verbatim.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<Value>,
}

/// A prediction after confidence gating. `pred` may have been replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedRecord {
    pub text: String,
    pub pred: String,
    pub label: String,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<Value>,
}

impl CalibratedRecord {
    /// Derive a calibrated record from its source with the given prediction.
    pub fn from_record(record: &EvaluationRecord, pred: impl Into<String>) -> Self {
        Self {
            text: record.text.clone(),
            pred: pred.into(),
            label: record.label.clone(),
            id: record.id.clone(),
            group_id: record.group_id.clone(),
        }
    }
}

/// A record carrying a prediction next to its ground truth.
pub trait Labeled {
    fn pred(&self) -> &str;
    fn label(&self) -> &str;
}

impl Labeled for EvaluationRecord {
    fn pred(&self) -> &str {
        &self.pred
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for CalibratedRecord {
    fn pred(&self) -> &str {
        &self.pred
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// A key that is present keeps its value even when it is `null`; only an
// absent key maps to `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
