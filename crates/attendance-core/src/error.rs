use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// All errors produced by the attendance crates.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// The start month of a report range lies after its end month.
    #[error("Invalid range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// A year/month pair does not name a real calendar month.
    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// The range starts after `today`, so no day is left to report on.
    #[error("Empty range: report starts on {from} but today is {today}")]
    EmptyRange { from: NaiveDate, today: NaiveDate },

    /// An attendance key could not be parsed as a calendar date.
    #[error("Malformed attendance key \"{key}\" for tutor {tutor_id}")]
    MalformedRecord { tutor_id: String, key: String },

    /// A month argument did not match `YYYY-MM`.
    #[error("Invalid month spec: {0}")]
    InvalidMonthSpec(String),

    /// A date argument did not match `YYYY-MM-DD`.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The configured data path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No `.json` / `.jsonl` files were found under the given directory.
    #[error("No attendance files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the attendance crates.
pub type Result<T> = std::result::Result<T, AttendanceError>;
