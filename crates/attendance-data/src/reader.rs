//! Attendance file discovery and loading.
//!
//! Reads the JSON produced by the backend's attendance report endpoint and
//! converts each entry into an [`AttendanceRecord`]. Bad entries are skipped
//! with a warning so one broken tutor never blocks the whole report.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use attendance_core::error::{AttendanceError, Result};
use attendance_core::models::AttendanceRecord;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireTutor {
    #[serde(rename = "_id", alias = "id", default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Value,
}

#[derive(Debug, Deserialize)]
struct WireCenter {
    #[serde(rename = "_id", alias = "id", default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    tutor: WireTutor,
    #[serde(default)]
    center: Option<WireCenter>,
    #[serde(default)]
    attendance: Option<BTreeMap<String, Value>>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` / `.jsonl` files recursively under `data_path`, sorted by
/// path.
pub fn find_data_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_data_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load attendance records from a single file or a directory of files.
///
/// A missing path, an unreadable single file or a directory without data
/// files is an error. Inside a directory, files that cannot be read or
/// parsed are skipped with a warning.
pub fn load_records(data_path: &Path) -> Result<Vec<AttendanceRecord>> {
    if !data_path.exists() {
        return Err(AttendanceError::DataPathNotFound(data_path.to_path_buf()));
    }

    if data_path.is_file() {
        let records = load_file(data_path)?;
        debug!(
            "Loaded {} records from {}",
            records.len(),
            data_path.display()
        );
        return Ok(records);
    }

    let files = find_data_files(data_path);
    if files.is_empty() {
        return Err(AttendanceError::NoDataFiles(data_path.to_path_buf()));
    }

    let mut all_records: Vec<AttendanceRecord> = Vec::new();
    for file_path in &files {
        match load_file(file_path) {
            Ok(records) => all_records.extend(records),
            Err(e) => warn!("Skipping {}: {}", file_path.display(), e),
        }
    }

    debug!(
        "Loaded {} records from {} files",
        all_records.len(),
        files.len()
    );

    Ok(all_records)
}

/// Parse a JSON report document.
///
/// Accepts an array of entries, an object wrapping the array in `data`, or a
/// single entry object.
pub fn parse_report_json(content: &str) -> Result<Vec<AttendanceRecord>> {
    let doc: Value = serde_json::from_str(content)?;

    let items = match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(AttendanceError::Config(
                    "\"data\" must be an array of attendance entries".to_string(),
                ))
            }
            None => vec![Value::Object(map)],
        },
        _ => {
            return Err(AttendanceError::Config(
                "attendance report must be a JSON array or object".to_string(),
            ))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let record = map_to_record(item);
            if record.is_none() {
                warn!("Skipping malformed attendance entry #{}", i);
            }
            record
        })
        .collect())
}

/// Parse a JSONL report, one entry per line. Blank and malformed lines are
/// skipped.
pub fn parse_report_jsonl<R: BufRead>(reader: R) -> Vec<AttendanceRecord> {
    let mut records: Vec<AttendanceRecord> = Vec::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(l) => l,
            Err(_) => continue,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse JSON line {}: {}", line_no + 1, e);
                continue;
            }
        };

        match map_to_record(value) {
            Some(record) => records.push(record),
            None => warn!("Skipping malformed attendance entry on line {}", line_no + 1),
        }
    }

    records
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_data_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json") | Some("jsonl")
    )
}

fn load_file(file_path: &Path) -> Result<Vec<AttendanceRecord>> {
    let file = std::fs::File::open(file_path).map_err(|source| AttendanceError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    if file_path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
        return Ok(parse_report_jsonl(reader));
    }

    let content = std::io::read_to_string(reader).map_err(|source| AttendanceError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;
    parse_report_json(&content)
}

/// Convert one wire entry to a record. Returns `None` when the entry has no
/// usable tutor.
fn map_to_record(value: Value) -> Option<AttendanceRecord> {
    let entry: WireEntry = match serde_json::from_value(value) {
        Ok(e) => e,
        Err(e) => {
            debug!("Attendance entry does not match the report shape: {}", e);
            return None;
        }
    };

    let tutor_id = value_to_string(&entry.tutor.id)?;
    let tutor_name = entry.tutor.name.unwrap_or_default();

    let (center_id, center_name) = match entry.center {
        Some(c) => (
            value_to_string(&c.id).unwrap_or_default(),
            c.name.unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    let attendance_by_date = entry.attendance.map(|marks| {
        marks
            .into_iter()
            .filter_map(|(date, mark)| match mark {
                Value::Bool(present) => Some((date, present)),
                other => {
                    debug!(
                        "Tutor {}: non-boolean mark {} for {} treated as not marked",
                        tutor_id, other, date
                    );
                    None
                }
            })
            .collect()
    });

    Some(AttendanceRecord {
        tutor_phone: value_to_string(&entry.tutor.phone),
        tutor_id,
        tutor_name,
        center_id,
        center_name,
        attendance_by_date,
    })
}

/// Strings pass through, numbers are rendered, everything else is `None`.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
