//! File I/O for evaluation artefacts: newline-delimited JSON, label files, and
//! indented JSON documents.

use crate::error::{EvalError, Result};
use crate::labels::LabelList;
use crate::record::EvaluationRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Indentation used for pretty-printed JSON documents.
const JSON_INDENT: &[u8] = b"    ";

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            EvalError::InputNotFound {
                path: path.to_path_buf(),
            }
        } else {
            EvalError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> EvalError + '_ {
    move |source| EvalError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a newline-delimited JSON file. Empty lines are skipped; any other line
/// that fails to decode aborts the read.
pub fn read_ndjson<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = read_to_string(path)?;
    let mut items = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item = serde_json::from_str(line).map_err(|source| EvalError::MalformedRecord {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        items.push(item);
    }

    debug!(path = %path.display(), count = items.len(), "Read ndjson");
    Ok(items)
}

/// Read evaluation records from a newline-delimited JSON file.
pub fn read_records(path: &Path) -> Result<Vec<EvaluationRecord>> {
    read_ndjson(path)
}

/// Write items as newline-delimited JSON, one compact object per line.
pub fn write_ndjson<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file = fs::File::create(path).map_err(write_error(path))?;
    let mut writer = BufWriter::new(file);

    for item in items {
        serde_json::to_writer(&mut writer, item).map_err(|source| EvalError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(write_error(path))?;
    }

    writer.flush().map_err(write_error(path))?;
    debug!(path = %path.display(), count = items.len(), "Wrote ndjson");
    Ok(())
}

/// Read a label file, one label per line.
pub fn read_labels(path: &Path) -> Result<LabelList> {
    LabelList::parse(&read_to_string(path)?)
}

/// Write a label file, one label per line.
pub fn write_labels(path: &Path, labels: &LabelList) -> Result<()> {
    fs::write(path, labels.to_lines()).map_err(write_error(path))
}

/// Read a whole-file JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| EvalError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON document indented by four spaces.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|source| EvalError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, buf).map_err(write_error(path))
}

/// Write plain text.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(write_error(path))
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(write_error(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CalibratedRecord;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_read_records_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eval.json");
        fs::write(
            &path,
            concat!(
                r#"{"text":"a","pred":"x","label":"x","score":0.9,"probs":[0.9,0.1]}"#,
                "\n\n",
                r#"{"text":"b","pred":"y","label":"x","score":0.6,"probs":[0.4,0.6]}"#,
                "\n"
            ),
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "b");
    }

    #[test]
    fn test_read_records_reports_bad_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eval.json");
        fs::write(
            &path,
            "{\"text\":\"a\",\"pred\":\"x\",\"label\":\"x\"}\n{not json}\n",
        )
        .unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, EvalError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_labels(&dir.path().join("labels.txt")).unwrap_err();
        assert!(matches!(err, EvalError::InputNotFound { .. }));
    }

    #[test]
    fn test_write_ndjson_one_line_per_item() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let items = vec![
            CalibratedRecord {
                text: "a".to_string(),
                pred: "x".to_string(),
                label: "x".to_string(),
                id: None,
                group_id: None,
            },
            CalibratedRecord {
                text: "b".to_string(),
                pred: "default.skip".to_string(),
                label: "y".to_string(),
                id: Some(serde_json::json!("r2")),
                group_id: None,
            },
        ];

        write_ndjson(&path, &items).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"text":"a","pred":"x","label":"x"}"#);
        assert!(content.ends_with('\n'));

        let back: Vec<CalibratedRecord> = read_ndjson(&path).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn test_write_json_pretty_uses_four_spaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut value = BTreeMap::new();
        value.insert("threshold", 0.5);

        write_json_pretty(&path, &value).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"threshold\": 0.5\n}");
    }

    #[test]
    fn test_labels_roundtrip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        let labels = LabelList::parse("a\nb\n").unwrap();

        write_labels(&path, &labels).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
        assert_eq!(read_labels(&path).unwrap(), labels);
    }

    #[test]
    fn test_ensure_dir_creates_parents() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("runs").join("001");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
