//! Per-tutor attendance aggregation over a clamped reporting range.
//!
//! Every report path (screen table, CSV, summary export) goes through
//! [`AttendanceAggregator`] so the numbers cannot drift apart.

use std::collections::BTreeMap;

use attendance_core::calendar::{is_sunday, parse_attendance_key, ClampedRange};
use attendance_core::error::{AttendanceError, Result};
use attendance_core::formatting::rounded_percentage;
use attendance_core::models::{
    AttendanceRecord, DateRange, DaySummary, ReportFilters, TutorSummary,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

// ── ReportTotals ──────────────────────────────────────────────────────────────

/// Day counts summed across all tutors in a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub tutor_count: u32,
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    /// Percentage over the summed day counts.
    pub present_percentage: u32,
}

// ── AttendanceAggregator ──────────────────────────────────────────────────────

/// Stateless helper that turns raw attendance marks into summaries.
pub struct AttendanceAggregator;

impl AttendanceAggregator {
    /// Summarise one tutor over `range`, with its end clamped to `today`.
    pub fn summarize_tutor(
        record: &AttendanceRecord,
        range: &DateRange,
        today: NaiveDate,
    ) -> Result<TutorSummary> {
        let clamped = ClampedRange::resolve(range, today)?;
        Ok(Self::summarize_clamped(record, &clamped))
    }

    /// Filter `records` by tutor/center name and summarise each survivor,
    /// preserving input order.
    ///
    /// The range is validated once up front, so a bad range fails the whole
    /// call even when no record survives the filters.
    pub fn summarize_all(
        records: &[AttendanceRecord],
        range: &DateRange,
        filters: &ReportFilters,
        today: NaiveDate,
    ) -> Result<Vec<TutorSummary>> {
        let clamped = ClampedRange::resolve(range, today)?;
        Ok(Self::summarize_all_clamped(records, &clamped, filters))
    }

    /// [`summarize_all`](Self::summarize_all) over an already-resolved range.
    ///
    /// Callers that also render per-day columns pass the same `range` here
    /// and to the grid, so headers and `daily_status` line up.
    pub fn summarize_all_clamped(
        records: &[AttendanceRecord],
        range: &ClampedRange,
        filters: &ReportFilters,
    ) -> Vec<TutorSummary> {
        let summaries: Vec<TutorSummary> = records
            .iter()
            .filter(|r| filters.matches(r))
            .map(|r| Self::summarize_clamped(r, range))
            .collect();

        debug!(
            "Summarised {} of {} tutors over {}..={}{}",
            summaries.len(),
            records.len(),
            range.from,
            range.to,
            if range.clamped { " (clamped)" } else { "" }
        );

        summaries
    }

    /// Summarise one tutor over an already-resolved range.
    pub fn summarize_clamped(record: &AttendanceRecord, range: &ClampedRange) -> TutorSummary {
        let (marks, malformed_keys) = collect_marks(record);

        let total_days = range.total_days();
        // Sundays are counted once through `sunday_count`, so marks on a
        // Sunday are ignored here.
        let marked_present_days = marks
            .iter()
            .filter(|(date, present)| **present && range.contains(**date) && !is_sunday(**date))
            .count() as u32;
        let sunday_count = range.sunday_count();

        let present_days = marked_present_days + sunday_count;
        let absent_days = total_days - present_days;

        let daily_status: Vec<DaySummary> = range
            .days()
            .map(|date| {
                let marked = marks.get(&date).copied().unwrap_or(false);
                DaySummary::new(date, is_sunday(date), marked)
            })
            .collect();

        TutorSummary {
            tutor_id: record.tutor_id.clone(),
            tutor_name: record.tutor_name.clone(),
            tutor_phone: record.tutor_phone.clone(),
            center_name: record.center_name.clone(),
            total_days,
            present_days,
            absent_days,
            present_percentage: rounded_percentage(present_days, total_days),
            daily_status,
            malformed_keys,
        }
    }

    /// Sum the day counts of all `summaries`.
    pub fn calculate_totals(summaries: &[TutorSummary]) -> ReportTotals {
        let mut totals = ReportTotals::default();
        for s in summaries {
            totals.tutor_count = totals.tutor_count.saturating_add(1);
            totals.total_days = totals.total_days.saturating_add(s.total_days);
            totals.present_days = totals.present_days.saturating_add(s.present_days);
            totals.absent_days = totals.absent_days.saturating_add(s.absent_days);
        }
        totals.present_percentage = rounded_percentage(totals.present_days, totals.total_days);
        totals
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

/// Normalise a record's attendance keys to dates.
///
/// Unparseable keys are logged and returned separately. When two keys name
/// the same date, a `true` mark wins.
fn collect_marks(record: &AttendanceRecord) -> (BTreeMap<NaiveDate, bool>, Vec<String>) {
    let mut marks: BTreeMap<NaiveDate, bool> = BTreeMap::new();
    let mut malformed: Vec<String> = Vec::new();

    let Some(by_date) = record.attendance_by_date.as_ref() else {
        return (marks, malformed);
    };

    for (key, present) in by_date {
        match parse_attendance_key(key) {
            Some(date) => {
                let slot = marks.entry(date).or_insert(false);
                *slot = *slot || *present;
            }
            None => {
                let err = AttendanceError::MalformedRecord {
                    tutor_id: record.tutor_id.clone(),
                    key: key.clone(),
                };
                warn!("Skipping attendance entry: {}", err);
                malformed.push(key.clone());
            }
        }
    }

    (marks, malformed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
