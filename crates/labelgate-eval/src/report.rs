//! Multi-class evaluation summaries: confusion matrix and per-label
//! classification report.

use crate::error::{EvalError, Result};
use crate::labels::LabelList;
use crate::record::Labeled;
use std::fmt;

/// Number of decimal digits printed in the classification report.
const REPORT_DIGITS: usize = 4;

/// Row-major confusion matrix over a label list.
///
/// Entry `(i, j)` counts records whose ground truth is label `i` and whose
/// prediction is label `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    /// Count `(label, pred)` pairs. Both must be members of `labels`.
    pub fn from_records<R: Labeled>(records: &[R], labels: &LabelList) -> Result<Self> {
        let n = labels.len();
        let mut counts = vec![0usize; n * n];

        for (idx, record) in records.iter().enumerate() {
            let actual = lookup(labels, record.label(), idx)?;
            let predicted = lookup(labels, record.pred(), idx)?;
            counts[actual * n + predicted] += 1;
        }

        Ok(Self {
            labels: labels.as_slice().to_vec(),
            counts,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[inline]
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual * self.labels.len() + predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.get(class, class)
    }

    /// Column sum: everything predicted as `class`.
    pub fn predicted_count(&self, class: usize) -> usize {
        (0..self.labels.len()).map(|i| self.get(i, class)).sum()
    }

    /// Row sum: everything whose ground truth is `class`.
    pub fn support(&self, class: usize) -> usize {
        (0..self.labels.len()).map(|j| self.get(class, j)).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(
            (0..self.labels.len()).map(|c| self.get(c, c)).sum(),
            self.total(),
        )
    }

    /// Render as CSV: a header row of predicted labels, then one row per
    /// ground-truth label.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str("label");
        for label in &self.labels {
            out.push(',');
            out.push_str(&csv_field(label));
        }
        out.push('\n');

        for (i, label) in self.labels.iter().enumerate() {
            out.push_str(&csv_field(label));
            for j in 0..self.labels.len() {
                out.push(',');
                out.push_str(&self.get(i, j).to_string());
            }
            out.push('\n');
        }
        out
    }
}

/// Precision, recall, F1 and support for one label or one average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-label classification report with accuracy and averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub labels: Vec<String>,
    pub per_label: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build the report from a confusion matrix. Zero denominators yield 0.0.
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let per_label: Vec<ClassMetrics> = (0..matrix.labels().len())
            .map(|class| {
                let tp = matrix.true_positives(class);
                let precision = ratio(tp, matrix.predicted_count(class));
                let recall = ratio(tp, matrix.support(class));
                ClassMetrics {
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support: matrix.support(class),
                }
            })
            .collect();

        let total = matrix.total();
        let count = per_label.len();
        let mean = |f: fn(&ClassMetrics) -> f64| {
            if count == 0 {
                0.0
            } else {
                per_label.iter().map(f).sum::<f64>() / count as f64
            }
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_label.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };

        let macro_avg = ClassMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1_score: mean(|m| m.f1_score),
            support: total,
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1_score: weighted(|m| m.f1_score),
            support: total,
        };

        Self {
            labels: matrix.labels().to_vec(),
            per_label,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    /// Shorthand for building the matrix and the report from records.
    pub fn from_records<R: Labeled>(records: &[R], labels: &LabelList) -> Result<Self> {
        Ok(Self::from_matrix(&ConfusionMatrix::from_records(
            records, labels,
        )?))
    }

    pub fn get(&self, label: &str) -> Option<&ClassMetrics> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| &self.per_label[idx])
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WEIGHTED: &str = "weighted avg";
        let width = self
            .labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(WEIGHTED.len()))
            .max()
            .unwrap_or(WEIGHTED.len());
        let d = REPORT_DIGITS;

        write!(f, "{:>width$} ", "")?;
        for header in ["precision", "recall", "f1-score", "support"] {
            write!(f, " {header:>9}")?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for (label, metrics) in self.labels.iter().zip(&self.per_label) {
            write_row(f, width, label, metrics)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.d$} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, width, "macro avg", &self.macro_avg)?;
        write_row(f, width, WEIGHTED, &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, width: usize, name: &str, m: &ClassMetrics) -> fmt::Result {
    let d = REPORT_DIGITS;
    writeln!(
        f,
        "{name:>width$}  {:>9.d$} {:>9.d$} {:>9.d$} {:>9}",
        m.precision, m.recall, m.f1_score, m.support
    )
}

fn lookup(labels: &LabelList, label: &str, record: usize) -> Result<usize> {
    labels
        .index_of(label)
        .ok_or_else(|| EvalError::UnknownLabel {
            label: label.to_string(),
            record,
        })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CalibratedRecord, EvaluationRecord};

    fn record(pred: &str, label: &str) -> EvaluationRecord {
        EvaluationRecord {
            text: format!("{pred}/{label}"),
            pred: pred.to_string(),
            label: label.to_string(),
            score: None,
            probs: Vec::new(),
            id: None,
            group_id: None,
        }
    }

    fn sample() -> (Vec<EvaluationRecord>, LabelList) {
        let labels = LabelList::parse("cat\ndog\nbird\n").unwrap();
        let records = vec![
            record("cat", "cat"),
            record("cat", "cat"),
            record("dog", "cat"),
            record("dog", "dog"),
            record("cat", "dog"),
            record("bird", "bird"),
        ];
        (records, labels)
    }

    #[test]
    fn test_confusion_matrix_counts() {
        let (records, labels) = sample();
        let matrix = ConfusionMatrix::from_records(&records, &labels).unwrap();

        assert_eq!(matrix.total(), 6);
        assert_eq!(matrix.get(0, 0), 2);
        assert_eq!(matrix.get(0, 1), 1);
        assert_eq!(matrix.get(1, 0), 1);
        assert_eq!(matrix.get(2, 2), 1);
        assert_eq!(matrix.support(0), 3);
        assert_eq!(matrix.predicted_count(0), 3);
        assert!((matrix.accuracy() - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_prediction_is_rejected() {
        let labels = LabelList::parse("cat\ndog\n").unwrap();
        let records = vec![record("cat", "cat"), record("default.skip", "dog")];

        let err = ConfusionMatrix::from_records(&records, &labels).unwrap_err();
        assert!(matches!(
            err,
            EvalError::UnknownLabel { ref label, record: 1 } if label == "default.skip"
        ));
    }

    #[test]
    fn test_calibrated_records_are_counted() {
        let labels = LabelList::parse("cat\ndog\ndefault.skip\n").unwrap();
        let records = vec![
            CalibratedRecord::from_record(&record("cat", "cat"), "cat"),
            CalibratedRecord::from_record(&record("dog", "cat"), "default.skip"),
        ];

        let matrix = ConfusionMatrix::from_records(&records, &labels).unwrap();
        assert_eq!(matrix.get(0, 0), 1);
        assert_eq!(matrix.get(0, 2), 1);
        assert_eq!(matrix.predicted_count(2), 1);
    }

    #[test]
    fn test_report_metrics() {
        let (records, labels) = sample();
        let report = ClassificationReport::from_records(&records, &labels).unwrap();

        let cat = report.get("cat").unwrap();
        assert!((cat.precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((cat.recall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(cat.support, 3);

        let dog = report.get("dog").unwrap();
        assert!((dog.precision - 0.5).abs() < 1e-9);
        assert!((dog.recall - 0.5).abs() < 1e-9);

        let bird = report.get("bird").unwrap();
        assert!((bird.f1_score - 1.0).abs() < 1e-9);

        let expected_macro = (2.0 / 3.0 + 0.5 + 1.0) / 3.0;
        assert!((report.macro_avg.precision - expected_macro).abs() < 1e-9);
        let expected_weighted = (2.0 / 3.0 * 3.0 + 0.5 * 2.0 + 1.0) / 6.0;
        assert!((report.weighted_avg.recall - expected_weighted).abs() < 1e-9);
        assert_eq!(report.weighted_avg.support, 6);
    }

    #[test]
    fn test_zero_division_yields_zero() {
        let labels = LabelList::parse("a\nb\n").unwrap();
        let records = vec![record("a", "a")];
        let report = ClassificationReport::from_records(&records, &labels).unwrap();

        let b = report.get("b").unwrap();
        assert_eq!(b.precision, 0.0);
        assert_eq!(b.recall, 0.0);
        assert_eq!(b.f1_score, 0.0);
        assert_eq!(b.support, 0);
    }

    #[test]
    fn test_report_layout() {
        let (records, labels) = sample();
        let report = ClassificationReport::from_records(&records, &labels).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "              precision    recall  f1-score   support"
        );
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "         cat     0.6667    0.6667    0.6667         3"
        );
        assert_eq!(lines[5], "");
        assert_eq!(
            lines[6],
            "    accuracy                         0.6667         6"
        );
        assert!(lines[7].starts_with("   macro avg"));
        assert!(lines[8].starts_with("weighted avg"));
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_csv_layout() {
        let (records, labels) = sample();
        let matrix = ConfusionMatrix::from_records(&records, &labels).unwrap();

        assert_eq!(
            matrix.to_csv(),
            "label,cat,dog,bird\ncat,2,1,0\ndog,1,1,0\nbird,0,0,1\n"
        );
    }

    #[test]
    fn test_csv_quotes_special_labels() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }
}
