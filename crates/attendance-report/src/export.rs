//! Report rendering entry point and export file naming.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use attendance_core::calendar::ClampedRange;
use attendance_core::error::{AttendanceError, Result};
use attendance_core::formatting::{format_month_short, format_range_label};
use attendance_core::models::{DateRange, TutorSummary};
use attendance_data::aggregator::AttendanceAggregator;

use crate::csv::grid_to_csv;
use crate::grid::ReportGrid;
use crate::table::render_grid;

// ── ReportFormat ──────────────────────────────────────────────────────────────

/// Output layouts the CLI can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Aligned on-screen table with a totals footer.
    Table,
    /// Day-by-day CSV.
    Csv,
    /// Title block plus the five-column printable summary.
    Summary,
    /// Summaries as pretty JSON.
    Json,
}

impl ReportFormat {
    /// File extension for exports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Table | ReportFormat::Summary => "txt",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "csv" => Ok(ReportFormat::Csv),
            "summary" => Ok(ReportFormat::Summary),
            "json" => Ok(ReportFormat::Json),
            other => Err(AttendanceError::Config(format!(
                "unknown report format: {}",
                other
            ))),
        }
    }
}

// ── ReportContext ─────────────────────────────────────────────────────────────

/// What a report covers, needed for titles and column headers.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub range: DateRange,
    pub clamped: ClampedRange,
    /// Center filter shown in the summary title, when one was applied.
    pub center_filter: Option<String>,
}

/// Render `summaries` in `format`.
pub fn render_report(
    format: ReportFormat,
    ctx: &ReportContext,
    summaries: &[TutorSummary],
) -> Result<String> {
    match format {
        ReportFormat::Table => {
            let totals = AttendanceAggregator::calculate_totals(summaries);
            let mut out = format!("{}\n\n", title_line(ctx));
            out.push_str(&render_grid(&ReportGrid::screen(summaries, &totals)));
            Ok(out)
        }
        ReportFormat::Csv => Ok(grid_to_csv(&ReportGrid::day_by_day(
            summaries,
            &ctx.clamped,
        ))),
        ReportFormat::Summary => {
            let mut out = String::from("Attendance Report\n");
            let label = if ctx.range.is_single_month() {
                "Month"
            } else {
                "Months"
            };
            out.push_str(&format!("{}: {}\n", label, format_range_label(&ctx.range)));
            if let Some(center) = ctx.center_filter.as_deref().filter(|c| !c.trim().is_empty()) {
                out.push_str(&format!("Center: {}\n", center.trim()));
            }
            out.push('\n');
            out.push_str(&render_grid(&ReportGrid::summary(summaries)));
            Ok(out)
        }
        ReportFormat::Json => Ok(serde_json::to_string_pretty(summaries)?),
    }
}

fn title_line(ctx: &ReportContext) -> String {
    let mut title = format!("Attendance for {}", format_range_label(&ctx.range));
    if ctx.clamped.clamped {
        title.push_str(&format!(" (through {})", ctx.clamped.to));
    }
    title
}

// ── File naming ───────────────────────────────────────────────────────────────

/// Default export file name, e.g. `Attendance_Report_Jun_2024.csv` or
/// `Attendance_Report_Jun_2024_to_Aug_2024.csv`.
pub fn default_file_name(range: &DateRange, format: ReportFormat) -> String {
    let from = format_month_short(range.from_year, range.from_month);
    let stem = if range.is_single_month() {
        format!("Attendance_Report_{}", from)
    } else {
        format!(
            "Attendance_Report_{}_to_{}",
            from,
            format_month_short(range.to_year, range.to_month)
        )
    };
    format!("{}.{}", stem, format.extension())
}

/// Where to write an export: `output` itself, or the default file name
/// inside it when `output` is an existing directory.
pub fn resolve_output_path(output: &Path, range: &DateRange, format: ReportFormat) -> PathBuf {
    if output.is_dir() {
        output.join(default_file_name(range, format))
    } else {
        output.to_path_buf()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
