mod bootstrap;

use std::io::Write;

use anyhow::{Context, Result};
use attendance_core::calendar::ClampedRange;
use attendance_core::settings::Settings;
use attendance_data::aggregator::AttendanceAggregator;
use attendance_data::reader::load_records;
use attendance_report::export::{render_report, resolve_output_path, ReportContext, ReportFormat};
use chrono::NaiveDate;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let _log_guard = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("tutor-attendance v{} starting", env!("CARGO_PKG_VERSION"));

    let today = settings.resolve_today()?;
    tracing::info!("Timezone: {}, today: {}", settings.timezone, today);

    let report = build_report(&settings, today)?;

    match settings.output.as_deref() {
        Some(output) => {
            let format: ReportFormat = settings.format.parse()?;
            let range = settings.date_range(today)?;
            let path = resolve_output_path(output, &range, format);
            std::fs::write(&path, report)
                .with_context(|| format!("writing report to {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Load, aggregate and render one report. Nothing is written on failure.
fn build_report(settings: &Settings, today: NaiveDate) -> Result<String> {
    let format: ReportFormat = settings.format.parse()?;
    let range = settings.date_range(today)?;
    let clamped = ClampedRange::resolve(&range, today)?;
    let filters = settings.filters();

    let data_path = settings.data_path()?;
    let records = load_records(data_path)
        .with_context(|| format!("loading attendance from {}", data_path.display()))?;
    tracing::info!("Loaded {} attendance records", records.len());

    let summaries = AttendanceAggregator::summarize_all_clamped(&records, &clamped, &filters);

    let skipped: usize = summaries.iter().map(|s| s.malformed_keys.len()).sum();
    if skipped > 0 {
        tracing::warn!("{} attendance entries had unreadable dates and were skipped", skipped);
    }

    let ctx = ReportContext {
        range,
        clamped,
        center_filter: Some(filters.center_name_query.clone())
            .filter(|c| !c.trim().is_empty()),
    };

    Ok(render_report(format, &ctx, &summaries)?)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
