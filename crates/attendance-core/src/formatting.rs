use chrono::NaiveDate;

use crate::models::DateRange;

/// Whole-number percentage `part / whole * 100`, rounded half up.
///
/// Returns `0` if `whole` is zero to avoid division by zero. Computed in
/// integer arithmetic so `7 / 30` always lands on the same value in every
/// report.
///
/// # Examples
///
/// ```
/// use attendance_core::formatting::rounded_percentage;
///
/// assert_eq!(rounded_percentage(7, 30), 23);
/// assert_eq!(rounded_percentage(1, 2), 50);
/// assert_eq!(rounded_percentage(1, 8), 13);
/// assert_eq!(rounded_percentage(0, 0), 0);
/// ```
pub fn rounded_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    ((200 * part + whole) / (2 * whole)) as u32
}

/// Render a percentage the way the exports show it.
///
/// ```
/// use attendance_core::formatting::format_percentage;
///
/// assert_eq!(format_percentage(23), "23%");
/// ```
pub fn format_percentage(value: u32) -> String {
    format!("{}%", value)
}

/// Long month label, e.g. `"June 2024"`.
pub fn format_month_long(year: i32, month: u32) -> String {
    month_date(year, month)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}

/// Short month label used in file names, e.g. `"Jun_2024"`.
pub fn format_month_short(year: i32, month: u32) -> String {
    month_date(year, month)
        .map(|d| d.format("%b_%Y").to_string())
        .unwrap_or_else(|| format!("{}_{:02}", year, month))
}

/// Human label for a report range.
///
/// ```
/// use attendance_core::formatting::format_range_label;
/// use attendance_core::models::DateRange;
///
/// assert_eq!(format_range_label(&DateRange::single_month(2024, 6)), "June 2024");
/// assert_eq!(
///     format_range_label(&DateRange::new(2024, 6, 2024, 8)),
///     "June 2024 - August 2024"
/// );
/// ```
pub fn format_range_label(range: &DateRange) -> String {
    let from = format_month_long(range.from_year, range.from_month);
    if range.is_single_month() {
        from
    } else {
        format!("{} - {}", from, format_month_long(range.to_year, range.to_month))
    }
}

fn month_date(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
