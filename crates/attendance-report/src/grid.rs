//! Tabular report layouts.
//!
//! A [`ReportGrid`] is a header row plus string rows; the CSV and text
//! renderers only ever see grids, so all three layouts share one source of
//! numbers.

use attendance_core::calendar::ClampedRange;
use attendance_core::formatting::format_percentage;
use attendance_core::models::TutorSummary;
use attendance_data::aggregator::ReportTotals;

/// Header plus rows of already-formatted cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Optional totals row rendered after the data rows.
    pub footer: Option<Vec<String>>,
}

impl ReportGrid {
    /// One row per tutor and one column per calendar day of `range`, framed
    /// by identity columns in front and summary columns at the end.
    pub fn day_by_day(summaries: &[TutorSummary], range: &ClampedRange) -> Self {
        let single_month = range.is_single_month();

        let mut headers: Vec<String> = ["Tutor Name", "Attendance %", "Phone", "Center"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        headers.extend(range.days().map(|d| {
            if single_month {
                d.format("Day %d").to_string()
            } else {
                d.format("%Y-%m-%d").to_string()
            }
        }));
        headers.extend(
            ["Total Days", "Present Days", "Absent Days", "Final Attendance %"]
                .iter()
                .map(|h| h.to_string()),
        );

        let rows = summaries
            .iter()
            .map(|s| {
                let mut row = vec![
                    s.tutor_name.clone(),
                    format_percentage(s.present_percentage),
                    s.display_phone().to_string(),
                    s.center_name.clone(),
                ];
                row.extend(s.daily_status.iter().map(|d| {
                    if d.effective_present {
                        "Present".to_string()
                    } else {
                        "Absent".to_string()
                    }
                }));
                row.push(s.total_days.to_string());
                row.push(s.present_days.to_string());
                row.push(s.absent_days.to_string());
                row.push(format_percentage(s.present_percentage));
                row
            })
            .collect();

        Self {
            headers,
            rows,
            footer: None,
        }
    }

    /// The compact five-column layout of the printable summary.
    pub fn summary(summaries: &[TutorSummary]) -> Self {
        let headers = [
            "Tutor Name",
            "Center",
            "Total Days",
            "Present Days",
            "Absent Days",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        let rows = summaries
            .iter()
            .map(|s| {
                vec![
                    s.tutor_name.clone(),
                    s.center_name.clone(),
                    s.total_days.to_string(),
                    s.present_days.to_string(),
                    s.absent_days.to_string(),
                ]
            })
            .collect();

        Self {
            headers,
            rows,
            footer: None,
        }
    }

    /// The on-screen table with a totals footer.
    pub fn screen(summaries: &[TutorSummary], totals: &ReportTotals) -> Self {
        let headers = [
            "Tutor", "Phone", "Center", "Present %", "Present", "Absent", "Total",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        let rows = summaries
            .iter()
            .map(|s| {
                vec![
                    s.tutor_name.clone(),
                    s.display_phone().to_string(),
                    s.center_name.clone(),
                    format_percentage(s.present_percentage),
                    s.present_days.to_string(),
                    s.absent_days.to_string(),
                    s.total_days.to_string(),
                ]
            })
            .collect();

        let footer = vec![
            format!("Total ({} tutors)", totals.tutor_count),
            String::new(),
            String::new(),
            format_percentage(totals.present_percentage),
            totals.present_days.to_string(),
            totals.absent_days.to_string(),
            totals.total_days.to_string(),
        ];

        Self {
            headers,
            rows,
            footer: Some(footer),
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::{AttendanceRecord, DateRange};
    use attendance_data::aggregator::AttendanceAggregator;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn alice() -> AttendanceRecord {
        AttendanceRecord {
            tutor_id: "t1".to_string(),
            tutor_name: "Alice".to_string(),
            tutor_phone: None,
            center_id: "c1".to_string(),
            center_name: "North".to_string(),
            attendance_by_date: Some(
                [("2024-06-03", true), ("2024-06-04", true), ("2024-06-09", true)]
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
            ),
        }
    }

    fn june(today: NaiveDate) -> (Vec<TutorSummary>, ClampedRange) {
        let range = DateRange::single_month(2024, 6);
        let clamped = ClampedRange::resolve(&range, today).unwrap();
        let summary = AttendanceAggregator::summarize_clamped(&alice(), &clamped);
        (vec![summary], clamped)
    }

    #[test]
    fn test_day_by_day_headers_single_month() {
        let (summaries, clamped) = june(date(2024, 6, 30));
        let grid = ReportGrid::day_by_day(&summaries, &clamped);

        assert_eq!(grid.column_count(), 4 + 30 + 4);
        assert_eq!(grid.headers[0], "Tutor Name");
        assert_eq!(grid.headers[4], "Day 01");
        assert_eq!(grid.headers[33], "Day 30");
        assert_eq!(grid.headers[37], "Final Attendance %");
    }

    #[test]
    fn test_day_by_day_row_matches_summary() {
        let (summaries, clamped) = june(date(2024, 6, 30));
        let grid = ReportGrid::day_by_day(&summaries, &clamped);
        let row = &grid.rows[0];

        assert_eq!(row.len(), grid.column_count());
        assert_eq!(row[1], "23%");
        assert_eq!(row[2], "N/A");
        // June 1 is a Saturday, June 2 a Sunday, June 3 marked.
        assert_eq!(row[4], "Absent");
        assert_eq!(row[5], "Present");
        assert_eq!(row[6], "Present");
        assert_eq!(&row[34..], &["30", "7", "23", "23%"]);
        let present_cells = row[4..34].iter().filter(|c| *c == "Present").count();
        assert_eq!(present_cells, 7);
    }

    #[test]
    fn test_day_by_day_clamped_columns_stop_at_today() {
        let (summaries, clamped) = june(date(2024, 6, 15));
        let grid = ReportGrid::day_by_day(&summaries, &clamped);
        assert_eq!(grid.column_count(), 4 + 15 + 4);
        assert_eq!(grid.rows[0].len(), grid.column_count());
    }

    #[test]
    fn test_day_by_day_multi_month_uses_full_dates() {
        let range = DateRange::new(2024, 5, 2024, 6);
        let clamped = ClampedRange::resolve(&range, date(2024, 12, 31)).unwrap();
        let grid = ReportGrid::day_by_day(&[], &clamped);
        assert_eq!(grid.headers[4], "2024-05-01");
        assert_eq!(grid.column_count(), 4 + 61 + 4);
        assert!(grid.rows.is_empty());
    }

    #[test]
    fn test_summary_layout() {
        let (summaries, _) = june(date(2024, 6, 30));
        let grid = ReportGrid::summary(&summaries);
        assert_eq!(grid.rows, vec![vec!["Alice", "North", "30", "7", "23"]]);
    }

    #[test]
    fn test_screen_layout_has_totals_footer() {
        let (summaries, _) = june(date(2024, 6, 30));
        let totals = AttendanceAggregator::calculate_totals(&summaries);
        let grid = ReportGrid::screen(&summaries, &totals);
        assert_eq!(grid.rows[0][3], "23%");
        let footer = grid.footer.unwrap();
        assert_eq!(footer[0], "Total (1 tutors)");
        assert_eq!(footer[4], "7");
    }
}
