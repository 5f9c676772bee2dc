//! Ordered label lists.

use crate::error::{EvalError, Result};
use std::collections::HashMap;

/// Ordered, duplicate-free sequence of label names.
///
/// Position defines the alignment with `EvaluationRecord::probs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelList {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelList {
    /// Build a label list, rejecting duplicate names.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), idx).is_some() {
                return Err(EvalError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }
        Ok(Self { labels, index })
    }

    /// Parse one label per line. Empty lines are dropped.
    pub fn parse(content: &str) -> Result<Self> {
        let labels = content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of `label`, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Return a copy with `label` appended unless it is already a member.
    pub fn with_label(&self, label: &str) -> Self {
        let mut extended = self.clone();
        if !extended.contains(label) {
            extended.index.insert(label.to_string(), extended.labels.len());
            extended.labels.push(label.to_string());
        }
        extended
    }

    /// Render one label per line, each terminated by a newline.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for label in &self.labels {
            out.push_str(label);
            out.push('\n');
        }
        out
    }
}
