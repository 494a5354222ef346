//! Loading of the sessions log (one JSON object per line).

use crate::error::{AnalyzerError, Result};
use crate::record::{Action, Record};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Load every well-formed record from a JSON-lines file, in file order.
///
/// A missing file means there is no history yet and yields an empty list.
/// Malformed lines are logged and skipped.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No session history at {:?}", path);
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(AnalyzerError::History {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    parse_records(BufReader::new(file)).map_err(|e| match e {
        AnalyzerError::Io(source) => AnalyzerError::History {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parse records from any buffered reader.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, chunk) in reader.split(b'\n').enumerate() {
        let bytes = chunk?;
        let line_no = index + 1;

        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!("Skipping malformed record on line {}: {}", line_no, e);
                skipped += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!("Skipping malformed record on line {}: {}", line_no, reason);
                skipped += 1;
            }
        }
    }

    tracing::debug!(
        loaded = records.len(),
        skipped = skipped,
        "Loaded session history"
    );
    Ok(records)
}

/// Decode one line. Only invalid JSON and non-objects are rejected; a known
/// field with an unexpected type is read as absent.
fn parse_line(line: &str) -> std::result::Result<Record, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let Value::Object(fields) = value else {
        return Err("expected a JSON object".into());
    };

    Ok(Record {
        action: fields
            .get("action")
            .and_then(Value::as_str)
            .map(Action::from)
            .unwrap_or_default(),
        session_id: fields.get("session_id").and_then(scalar_to_string),
        agent_type: fields.get("agent_type").and_then(scalar_to_string),
        cost_usd: fields.get("cost_usd").and_then(Value::as_f64),
    })
}

// Ids and labels written as numbers or booleans keep their JSON spelling.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
