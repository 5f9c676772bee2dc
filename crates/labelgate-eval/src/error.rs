//! Errors raised while loading, decoding, or writing evaluation artefacts.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the evaluation data layer.
///
/// Every variant is fatal for the run that raised it.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A referenced input file does not exist.
    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A line of a newline-delimited JSON file could not be decoded.
    #[error("Malformed record at {path}:{line}: {source}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    /// A whole-file JSON document could not be decoded.
    #[error("Malformed JSON in {path}: {source}")]
    MalformedJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode JSON for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The label list names the same label twice.
    #[error("Duplicate label '{label}' in label list")]
    DuplicateLabel { label: String },

    /// A record refers to a label that the label list does not contain.
    #[error("Label '{label}' of record {record} is not in the label list")]
    UnknownLabel { label: String, record: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvalError>;
