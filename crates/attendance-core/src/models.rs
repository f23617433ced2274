use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tutor's raw attendance for a reporting request, as supplied by the
/// data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Opaque tutor identifier.
    pub tutor_id: String,
    /// Tutor display name.
    pub tutor_name: String,
    /// Tutor phone number, when the backend has one.
    #[serde(default)]
    pub tutor_phone: Option<String>,
    /// Identifier of the center the tutor belongs to.
    #[serde(default)]
    pub center_id: String,
    /// Center display name.
    #[serde(default)]
    pub center_name: String,
    /// Explicit marks keyed by ISO date (`YYYY-MM-DD`). A missing key means
    /// "not marked"; a missing map is the same as an empty one.
    #[serde(default)]
    pub attendance_by_date: Option<BTreeMap<String, bool>>,
}

/// Inclusive calendar-month range of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from_year: i32,
    pub from_month: u32,
    pub to_year: i32,
    pub to_month: u32,
}

impl DateRange {
    pub fn new(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> Self {
        Self {
            from_year,
            from_month,
            to_year,
            to_month,
        }
    }

    /// A range covering exactly one calendar month.
    pub fn single_month(year: i32, month: u32) -> Self {
        Self::new(year, month, year, month)
    }

    /// Whether the range starts and ends in the same month.
    pub fn is_single_month(&self) -> bool {
        self.from_year == self.to_year && self.from_month == self.to_month
    }
}

/// Status of one calendar day for one tutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub is_sunday: bool,
    pub is_marked_present: bool,
    /// `is_sunday || is_marked_present`.
    pub effective_present: bool,
}

impl DaySummary {
    pub fn new(date: NaiveDate, is_sunday: bool, is_marked_present: bool) -> Self {
        Self {
            date,
            is_sunday,
            is_marked_present,
            effective_present: is_sunday || is_marked_present,
        }
    }
}

/// Display-ready attendance summary for one tutor over a clamped range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorSummary {
    pub tutor_id: String,
    pub tutor_name: String,
    pub tutor_phone: Option<String>,
    pub center_name: String,
    /// Calendar days in the clamped range, Sundays included.
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    /// Whole-number percentage, rounded half up.
    pub present_percentage: u32,
    /// One entry per day of the clamped range, ascending by date.
    pub daily_status: Vec<DaySummary>,
    /// Attendance keys that could not be parsed and were skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub malformed_keys: Vec<String>,
}

impl TutorSummary {
    /// Phone number for display, `"N/A"` when absent or blank.
    pub fn display_phone(&self) -> &str {
        match self.tutor_phone.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => "N/A",
        }
    }
}

/// Case-insensitive substring filters applied before summarising.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    #[serde(default)]
    pub tutor_name_query: String,
    #[serde(default)]
    pub center_name_query: String,
}

impl ReportFilters {
    pub fn new(tutor_name_query: impl Into<String>, center_name_query: impl Into<String>) -> Self {
        Self {
            tutor_name_query: tutor_name_query.into(),
            center_name_query: center_name_query.into(),
        }
    }

    /// `true` when `record` passes both filters. Queries are trimmed and an
    /// empty query matches everything.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        contains_ignore_case(&record.tutor_name, &self.tutor_name_query)
            && contains_ignore_case(&record.center_name, &self.center_name_query)
    }
}

fn contains_ignore_case(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}
