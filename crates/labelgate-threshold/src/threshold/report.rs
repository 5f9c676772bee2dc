//! Per-label threshold report persisted between search and application.

use super::config::{SearchStrategy, round_score};
use super::curve::CurvePoint;
use crate::threshold::error::Result;
use labelgate_eval::io;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Metric fields stored next to a label's threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryMetrics {
    PrecisionRecall {
        f1_score: f64,
        precision: f64,
        recall: f64,
    },
    Roc {
        gmean: f64,
        fpr: f64,
        tpr: f64,
    },
    /// Fields of an externally produced report that match neither strategy.
    Other(Map<String, Value>),
}

/// Decision threshold for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub threshold: f64,
    #[serde(flatten)]
    pub metrics: EntryMetrics,
}

impl ThresholdEntry {
    /// Entry used when no curve point satisfies the constraint: threshold and
    /// every metric are 0.0.
    pub fn zero(strategy: SearchStrategy) -> Self {
        let metrics = match strategy {
            SearchStrategy::PrecisionRecall => EntryMetrics::PrecisionRecall {
                f1_score: 0.0,
                precision: 0.0,
                recall: 0.0,
            },
            SearchStrategy::Roc => EntryMetrics::Roc {
                gmean: 0.0,
                fpr: 0.0,
                tpr: 0.0,
            },
        };
        Self {
            threshold: 0.0,
            metrics,
        }
    }

    /// Entry for a selected curve point, rounded to four digits.
    pub fn from_point(point: &CurvePoint) -> Self {
        match *point {
            CurvePoint::PrecisionRecall {
                threshold,
                f1_score,
                precision,
                recall,
            } => Self {
                threshold: round_score(threshold),
                metrics: EntryMetrics::PrecisionRecall {
                    f1_score: round_score(f1_score),
                    precision: round_score(precision),
                    recall: round_score(recall),
                },
            },
            CurvePoint::Roc {
                threshold,
                gmean,
                fpr,
                tpr,
            } => Self {
                threshold: round_score(threshold),
                metrics: EntryMetrics::Roc {
                    gmean: round_score(gmean),
                    fpr: round_score(fpr),
                    tpr: round_score(tpr),
                },
            },
        }
    }

    /// Metric fields as `(name, value)` pairs, in report order.
    pub fn metric_fields(&self) -> Vec<(String, Option<f64>)> {
        match &self.metrics {
            EntryMetrics::PrecisionRecall {
                f1_score,
                precision,
                recall,
            } => vec![
                ("f1_score".to_string(), Some(*f1_score)),
                ("precision".to_string(), Some(*precision)),
                ("recall".to_string(), Some(*recall)),
            ],
            EntryMetrics::Roc { gmean, fpr, tpr } => vec![
                ("gmean".to_string(), Some(*gmean)),
                ("fpr".to_string(), Some(*fpr)),
                ("tpr".to_string(), Some(*tpr)),
            ],
            EntryMetrics::Other(fields) => fields
                .iter()
                .map(|(name, value)| (name.clone(), value.as_f64()))
                .collect(),
        }
    }
}

/// Label → threshold mapping that keeps insertion order on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdReport {
    entries: Vec<(String, ThresholdEntry)>,
}

impl ThresholdReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `label`. Replacing keeps the original position.
    pub fn insert(&mut self, label: String, entry: ThresholdEntry) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((label, entry)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&ThresholdEntry> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, entry)| entry)
    }

    /// Threshold for `label`, if the report has one.
    pub fn threshold(&self, label: &str) -> Option<f64> {
        self.get(label).map(|entry| entry.threshold)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThresholdEntry)> {
        self.entries.iter().map(|(l, e)| (l.as_str(), e))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a report from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(io::read_json(path)?)
    }

    /// Write the report as indented JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(io::write_json_pretty(path, self)?)
    }
}

impl Serialize for ThresholdReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, entry) in &self.entries {
            map.serialize_entry(label, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ThresholdReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = ThresholdReport;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping labels to threshold entries")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut report = ThresholdReport::new();
                while let Some((label, entry)) = access.next_entry::<String, ThresholdEntry>()? {
                    report.insert(label, entry);
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

impl FromIterator<(String, ThresholdEntry)> for ThresholdReport {
    fn from_iter<I: IntoIterator<Item = (String, ThresholdEntry)>>(iter: I) -> Self {
        let mut report = Self::new();
        for (label, entry) in iter {
            report.insert(label, entry);
        }
        report
    }
}

/// Format a threshold report for display.
pub fn format_threshold_summary(report: &ThresholdReport) -> String {
    let mut lines = Vec::new();

    lines.push("Threshold Summary".to_string());
    lines.push("=".repeat(40));

    if report.is_empty() {
        lines.push("  (no labels)".to_string());
        return lines.join("\n");
    }

    let width = report.labels().map(|l| l.chars().count()).max().unwrap_or(0);
    for (label, entry) in report.iter() {
        let metrics: Vec<String> = entry
            .metric_fields()
            .into_iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{}={:.4}", name, v),
                None => format!("{}=-", name),
            })
            .collect();
        lines.push(format!(
            "  {:<width$}  threshold={:.4}  {}",
            label,
            entry.threshold,
            metrics.join(", ")
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn pr_entry(threshold: f64) -> ThresholdEntry {
        ThresholdEntry {
            threshold,
            metrics: EntryMetrics::PrecisionRecall {
                f1_score: 0.6,
                precision: 0.7,
                recall: 0.5,
            },
        }
    }

    #[test]
    fn test_zero_entry() {
        let entry = ThresholdEntry::zero(SearchStrategy::Roc);
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"threshold": 0.0, "gmean": 0.0, "fpr": 0.0, "tpr": 0.0})
        );
    }

    #[test]
    fn test_from_point_rounds() {
        let point = CurvePoint::precision_recall(0.123456, 2.0 / 3.0, 0.5);
        let entry = ThresholdEntry::from_point(&point);

        assert_eq!(entry.threshold, 0.1235);
        assert_eq!(
            entry.metrics,
            EntryMetrics::PrecisionRecall {
                f1_score: 0.5714,
                precision: 0.6667,
                recall: 0.5,
            }
        );
    }

    #[test]
    fn test_report_serializes_in_insertion_order() {
        let mut report = ThresholdReport::new();
        report.insert("zeta".to_string(), pr_entry(0.4));
        report.insert("alpha".to_string(), ThresholdEntry::zero(SearchStrategy::PrecisionRecall));

        let encoded = serde_json::to_string(&report).unwrap();
        assert_eq!(
            encoded,
            r#"{"zeta":{"threshold":0.4,"f1_score":0.6,"precision":0.7,"recall":0.5},"alpha":{"threshold":0.0,"f1_score":0.0,"precision":0.0,"recall":0.0}}"#
        );

        let decoded: ThresholdReport = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, report);
        assert_eq!(decoded.labels().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_report_accepts_external_entries() {
        let raw = r#"{"A": {"threshold": 0.5}, "B": {"threshold": 1, "auc": 0.9}}"#;
        let report: ThresholdReport = serde_json::from_str(raw).unwrap();

        assert_eq!(report.threshold("A"), Some(0.5));
        assert_eq!(report.threshold("B"), Some(1.0));
        assert!(matches!(report.get("A").unwrap().metrics, EntryMetrics::Other(ref m) if m.is_empty()));
        assert!(report.threshold("C").is_none());
    }

    #[test]
    fn test_report_rejects_entry_without_threshold() {
        let raw = r#"{"A": {"precision": 0.5}}"#;
        assert!(serde_json::from_str::<ThresholdReport>(raw).is_err());
    }

    #[test]
    fn test_duplicate_keys_keep_last_value() {
        let raw = r#"{"A": {"threshold": 0.1}, "A": {"threshold": 0.7}}"#;
        let report: ThresholdReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.threshold("A"), Some(0.7));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("threshold_optimal.json");
        let report: ThresholdReport = vec![
            ("A".to_string(), pr_entry(0.5469)),
            ("B".to_string(), ThresholdEntry::zero(SearchStrategy::PrecisionRecall)),
        ]
        .into_iter()
        .collect();

        report.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n    \"A\": {\n        \"threshold\": 0.5469,"));
        assert_eq!(ThresholdReport::load(&path).unwrap(), report);
    }

    #[test]
    fn test_format_threshold_summary() {
        let mut report = ThresholdReport::new();
        report.insert("sports".to_string(), pr_entry(0.5469));

        let summary = format_threshold_summary(&report);
        assert!(summary.contains("Threshold Summary"));
        assert!(summary.contains("sports"));
        assert!(summary.contains("threshold=0.5469"));
        assert!(summary.contains("precision=0.7000"));

        let empty = format_threshold_summary(&ThresholdReport::new());
        assert!(empty.contains("(no labels)"));
    }
}
